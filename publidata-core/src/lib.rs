//! Core types and service wiring for the Publidata waste schedule connectors.

/// Source configuration and validation of identifying inputs.
pub mod config;
/// Geocoder client shared by every connector.
pub mod geocoder;
/// HTTP client construction and JSON/text fetch helpers.
pub mod http;
/// Typed navigation into untyped JSON responses.
pub mod json;
/// Domain models and identifiers shared by all connectors.
pub mod model;
/// Conversion of raw upstream records into collection events.
pub mod normalize;
/// Registry and helpers for plugging connectors into the service.
pub mod plugin;
/// Traits describing the connector strategies.
pub mod ports;
/// High-level service facade used by clients.
pub mod service;

pub use config::*;
pub use model::*;
pub use plugin::*;
pub use ports::*;
pub use service::*;
