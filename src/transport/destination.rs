use crate::error::TransportError;

const USER_SUFFIX: &str = "@s.whatsapp.net";
const GROUP_SUFFIX: &str = "@g.us";

/// Turn a phone number, group id or explicit JID into the JID the gateway
/// expects.
///
/// - anything containing `@` is taken as an explicit JID and kept;
/// - `<digits>-<digits>` is a group id and gets `@g.us`;
/// - otherwise non-digits are stripped and the rest gets `@s.whatsapp.net`.
pub fn normalize_destination(raw: &str) -> Result<String, TransportError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TransportError::InvalidDestination("empty destination".into()));
    }

    if let Some((local, domain)) = trimmed.split_once('@') {
        if local.is_empty() || domain.is_empty() {
            return Err(TransportError::InvalidDestination(trimmed.to_string()));
        }
        return Ok(trimmed.to_string());
    }

    if is_group_id(trimmed) {
        return Ok(format!("{trimmed}{GROUP_SUFFIX}"));
    }

    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(TransportError::InvalidDestination(trimmed.to_string()));
    }
    Ok(format!("{digits}{USER_SUFFIX}"))
}

fn is_group_id(value: &str) -> bool {
    value.split_once('-').is_some_and(|(owner, stamp)| {
        !owner.is_empty()
            && !stamp.is_empty()
            && owner.bytes().all(|b| b.is_ascii_digit())
            && stamp.bytes().all(|b| b.is_ascii_digit())
    })
}
