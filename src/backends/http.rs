//! Shared blocking HTTP client

use std::time::Duration;

pub const USER_AGENT: &str = concat!("aacboard/", env!("CARGO_PKG_VERSION"));

/// Build the client used for every outbound call.
///
/// The timeout bounds each request; an expired timeout surfaces as a
/// transport error to the caller.
pub fn build_client(timeout: Duration) -> reqwest::Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
}
