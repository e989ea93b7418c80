//! HTTP client construction and fetch helpers shared by the connectors.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use crate::ports::PortError;

/// User agent sent with every request.
pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; WasteCollectionSchedule/1.0; \
                              +https://github.com/mampfes/hacs_waste_collection_schedule)";

/// Build the HTTP client owned by one source.
///
/// # Errors
///
/// Returns [`PortError::Network`] if the TLS backend cannot be initialized.
pub fn build_client(timeout: Duration) -> Result<Client, PortError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(PortError::from)
}

/// Send the request and decode the body as untyped JSON.
///
/// # Errors
///
/// Returns [`PortError::Network`] on transport failures and non-success statuses.
pub async fn fetch_json(req: RequestBuilder) -> Result<Value, PortError> {
    req.send()
        .await
        .map_err(PortError::from)?
        .error_for_status()
        .map_err(PortError::from)?
        .json()
        .await
        .map_err(PortError::from)
}

/// Send the request and return the body as text.
///
/// # Errors
///
/// Returns [`PortError::Network`] on transport failures and non-success statuses.
pub async fn fetch_text(req: RequestBuilder) -> Result<String, PortError> {
    req.send()
        .await
        .map_err(PortError::from)?
        .error_for_status()
        .map_err(PortError::from)?
        .text()
        .await
        .map_err(PortError::from)
}
