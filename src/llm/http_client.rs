use reqwest::Client;
use std::time::Duration;

/// Shared client for provider traffic. The per-call deadline is enforced by
/// the invoker/probe with `tokio::time::timeout`; this is only a backstop.
pub fn build_provider_client() -> Client {
    build_provider_client_with_timeout(Duration::from_secs(120))
}

pub fn build_provider_client_with_timeout(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|_| Client::new())
}
