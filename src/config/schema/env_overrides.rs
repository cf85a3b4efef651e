use super::Config;

/// Provider-name to API-key variable.
const KEY_VARS: [(&str, &str); 3] = [
    ("gemini", "GEMINI_API_KEY"),
    ("openai", "OPENAI_API_KEY"),
    ("groq", "GROQ_API_KEY"),
];

impl Config {
    pub fn apply_env_overrides(&mut self) {
        for (provider_name, var) in KEY_VARS {
            if let Ok(key) = std::env::var(var)
                && !key.trim().is_empty()
                && let Some(provider) = self
                    .providers
                    .iter_mut()
                    .find(|p| p.name.eq_ignore_ascii_case(provider_name))
            {
                provider.api_key = Some(key.trim().to_string());
            }
        }

        if let Ok(url) = std::env::var("ANSWER_RELAY_GATEWAY_URL")
            && !url.trim().is_empty()
        {
            self.gateway.base_url = Some(url.trim().to_string());
        }

        if let Ok(ttl_str) = std::env::var("ANSWER_RELAY_STATUS_TTL_SECS")
            && let Ok(ttl) = ttl_str.trim().parse::<u64>()
            && ttl > 0
        {
            self.health.status_ttl_secs = ttl;
        }
    }
}
