use super::Config;
use crate::error::ConfigError;
use std::collections::HashSet;

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reliability.max_attempts == 0 {
            return Err(ConfigError::Validation(
                "reliability.max_attempts must be at least 1".into(),
            ));
        }
        if self.health.status_ttl_secs == 0 {
            return Err(ConfigError::Validation(
                "health.status_ttl_secs must be greater than 0".into(),
            ));
        }
        if self.health.probe_timeout_ms == 0 || self.reliability.generation_timeout_secs == 0 {
            return Err(ConfigError::Validation("timeouts must be greater than 0".into()));
        }
        if !(0.0..=2.0).contains(&self.prompt.temperature) {
            return Err(ConfigError::Validation(format!(
                "prompt.temperature {} is outside 0.0..=2.0",
                self.prompt.temperature
            )));
        }

        let mut seen = HashSet::new();
        for provider in &self.providers {
            let name = provider.name.trim();
            if name.is_empty() {
                return Err(ConfigError::Validation("provider name is empty".into()));
            }
            if provider.models.iter().all(|m| m.trim().is_empty()) {
                return Err(ConfigError::Validation(format!(
                    "provider `{name}` lists no models"
                )));
            }
            if !seen.insert(name.to_ascii_lowercase()) {
                return Err(ConfigError::Validation(format!(
                    "provider `{name}` is configured twice"
                )));
            }
        }
        Ok(())
    }
}
