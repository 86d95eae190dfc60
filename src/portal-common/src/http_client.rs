//! HTTP client factory shared by Portal services.
//!
//! All clients carry the Portal User-Agent and `tcp_nodelay`. A request
//! timeout is only applied when one is configured; otherwise the call waits
//! on the transport.

use reqwest::Client;
use std::time::Duration;

/// User-Agent string for all HTTP requests
pub const USER_AGENT: &str = concat!("portal/", env!("CARGO_PKG_VERSION"));

/// Connection pool idle timeout so DNS is re-resolved periodically.
pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Creates an HTTP client builder with standard configuration.
pub fn create_client_builder() -> reqwest::ClientBuilder {
    Client::builder()
        .user_agent(USER_AGENT)
        .tcp_nodelay(true)
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .pool_max_idle_per_host(4)
}

/// Creates an HTTP client, optionally bounded by a request timeout.
pub fn create_client(timeout: Option<Duration>) -> Result<Client, String> {
    let mut builder = create_client_builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(|e| e.to_string())
}
