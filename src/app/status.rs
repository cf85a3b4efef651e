use crate::config::Config;
use crate::llm::handshake::ordering;
use crate::llm::registry::ProviderRegistry;
use crate::llm::status_cache::HealthSnapshot;

pub fn render_status(
    config: &Config,
    registry: &ProviderRegistry,
    snapshot: Option<&HealthSnapshot>,
) -> String {
    let mut lines = vec![
        "◆ answer-relay status".to_string(),
        String::new(),
        format!("  version     {}", env!("CARGO_PKG_VERSION")),
        format!("  config      {}", config.config_path.display()),
        format!(
            "  retries     {} attempts, {}ms initial backoff, last provider {}",
            config.reliability.max_attempts,
            config.reliability.initial_backoff_ms,
            if config.reliability.retry_on_last_provider {
                "retried"
            } else {
                "single attempt"
            }
        ),
        format!(
            "  gateway     {}",
            config.gateway.base_url.as_deref().unwrap_or("(not configured)")
        ),
        String::new(),
        "  Providers".to_string(),
    ];

    if registry.is_empty() {
        lines.push("    (none)".to_string());
    }
    for slot in registry.slots() {
        let descriptor = slot.descriptor();
        let state = if slot.is_revoked() {
            "revoked"
        } else if slot.is_configured() {
            "configured"
        } else {
            "missing key"
        };
        let availability = snapshot.map_or(String::new(), |s| {
            if s.is_available(slot.name()) {
                "  ✓ available".to_string()
            } else {
                "  ✗ unavailable".to_string()
            }
        });
        lines.push(format!(
            "    {:<10} {:<9} {:<12} {}{availability}",
            slot.name(),
            descriptor.role,
            state,
            descriptor.models.join(" → "),
        ));
    }

    if let Some(snapshot) = snapshot {
        let order: Vec<&str> = ordering(registry, Some(snapshot))
            .into_iter()
            .map(|i| registry.slots()[i].name())
            .collect();
        lines.push(String::new());
        lines.push(format!(
            "  Handshake   {} at {}",
            if snapshot.any_available {
                "ok"
            } else {
                "no provider available"
            },
            snapshot.recorded_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        lines.push(format!("  Order       {}", order.join(" → ")));
    }

    lines.join("\n")
}
