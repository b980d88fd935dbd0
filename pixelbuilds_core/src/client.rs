use crate::error::Result;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = concat!("pixelbuilds-exporter/", env!("CARGO_PKG_VERSION"));

/// Builds the shared outbound client. Without a timeout the transport
/// default applies and a hung request blocks the cycle.
pub fn build_http_client(user_agent: &str, timeout: Option<Duration>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(user_agent.to_string());

    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    Ok(builder.build()?)
}
