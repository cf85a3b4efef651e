pub mod schema;

pub use schema::{
    Config, GatewayConfig, HealthConfig, PromptConfig, ProviderConfig, ReliabilityConfig,
};
