//! Traits describing connector strategies and the shared error type.

use async_trait::async_trait;
use reqwest::Error as ReqwestError;
use serde_json::Error as JsonError;

use crate::config::ConfigError;
use crate::json::LookupError;
use crate::model::{AddressId, AddressInput, CollectionEvent};

#[derive(thiserror::Error, Debug)]
/// Errors that abort a `fetch()` call.
pub enum PortError {
    /// Network layer failed or the upstream answered with a non-success status.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// Source configuration cannot identify an address.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    /// An expected JSON location is missing from the response.
    #[error("Unexpected response: {0}")]
    Lookup(#[from] LookupError),
    /// Response body or embedded payload is not valid JSON.
    #[error("Invalid JSON: {0}")]
    Json(#[from] JsonError),
    /// A search returned no candidates.
    #[error("No {0} found")]
    NoResults(&'static str),
    /// A candidate was returned without the field we need.
    #[error("Missing field '{0}' in response")]
    MissingField(String),
    /// A response value has the wrong shape.
    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(String),
    /// The embedded payload marker was not found in the page.
    #[error("Marker '{0}' not found in page")]
    MarkerNotFound(String),
    /// No plugin is registered for the requested source.
    #[error("Unsupported source")]
    UnsupportedSource,
}

#[async_trait]
/// Strategy resolving a configured input to an address identifier.
pub trait AddressPort: Send + Sync {
    /// Resolve the input, issuing lookups when it is not a direct identifier.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when a lookup request fails or yields no usable result.
    async fn resolve(&self, input: &AddressInput) -> Result<AddressId, PortError>;
}

#[async_trait]
/// Strategy loading collection events for a resolved address.
pub trait SchedulePort: Send + Sync {
    /// Fetch and normalize collection events for an address.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the request fails or the response cannot be interpreted.
    async fn schedule(&self, address_id: &AddressId) -> Result<Vec<CollectionEvent>, PortError>;
}
