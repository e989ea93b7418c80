//! Per-source configuration and its validation into an [`AddressInput`].

use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Duration;

use serde::Deserialize;

use crate::json::JsonPath;
use crate::model::{AddressId, AddressInput, CityRef, InseeCode, SourceId, SourceKind, SourceMeta};

/// Timezone assumed for the served territory when none is configured.
pub const DEFAULT_TIMEZONE: &str = "Europe/Paris";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Invalid or insufficient configuration.
pub enum ConfigError {
    /// Nothing identifies an address.
    #[error("provide 'address_id', or 'q' together with 'citycode' or 'city_name'")]
    InsufficientInput,
    /// A city is known but there is no address query for the geocoder.
    #[error("'q' is required to geocode an address (e.g. '965 Rue')")]
    MissingQuery,
    /// The connector has no city search step.
    #[error("{kind} sources cannot resolve 'city_name', provide 'citycode'")]
    CityNameUnsupported {
        /// Connector that rejected the input.
        kind: SourceKind,
    },
    /// Two sources share the same id.
    #[error("duplicate source id '{0}'")]
    DuplicateSource(SourceId),
    /// The configuration file could not be parsed.
    #[error("invalid configuration file: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
/// Identifying inputs and overrides of one source instance.
pub struct SourceConfig {
    /// INSEE code of the municipality.
    pub citycode: Option<String>,
    /// Municipality name, resolved through the city search.
    pub city_name: Option<String>,
    /// Address identifier, skips every lookup when present.
    pub address_id: Option<String>,
    /// Free-text address query for the geocoder.
    pub q: Option<String>,
    /// INSEE codes the city search is restricted to.
    pub insee_whitelist: Option<Vec<String>>,
    /// Events endpoint override.
    pub events_url: Option<String>,
    /// Additional query parameters sent to the events endpoint.
    ///
    /// Any scalar TOML value is accepted (`size = 100`, `from = 2024-01-01`);
    /// see [`SourceConfig::events_query_params`].
    pub events_extra_params: BTreeMap<String, toml::Value>,
    /// Raw label to displayed label remapping.
    pub type_map: HashMap<String, String>,
    /// Location of the events array in the events response.
    pub events_path: Option<JsonPath>,
    /// Field holding an event's date.
    pub event_date_field: Option<String>,
    /// Field holding an event's waste type.
    pub event_type_field: Option<String>,
    /// Base URL of the calendar widget.
    pub widget_url: Option<String>,
    /// Timezone hint, informational only.
    pub timezone: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl SourceConfig {
    /// Validate the identifying inputs.
    ///
    /// `address_id` wins over a query, and `citycode` wins over `city_name`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InsufficientInput`] when no combination identifies an
    /// address, or [`ConfigError::MissingQuery`] when only the city is known.
    pub fn address_input(&self) -> Result<AddressInput, ConfigError> {
        // Address ids are opaque, blank only means unset.
        if let Some(address_id) = &self.address_id
            && !address_id.trim().is_empty()
        {
            return Ok(AddressInput::Direct(AddressId(address_id.clone())));
        }

        let city = if let Some(code) = non_empty(self.citycode.as_deref()) {
            CityRef::Code(InseeCode(code.to_owned()))
        } else if let Some(name) = non_empty(self.city_name.as_deref()) {
            CityRef::Name(name.to_owned())
        } else {
            return Err(ConfigError::InsufficientInput);
        };

        let query = non_empty(self.q.as_deref()).ok_or(ConfigError::MissingQuery)?;

        Ok(AddressInput::Query {
            city,
            query: query.to_owned(),
        })
    }

    /// Extra events parameters as query strings.
    ///
    /// Strings are sent as-is, other values in their TOML spelling.
    #[must_use]
    pub fn events_query_params(&self) -> BTreeMap<String, String> {
        self.events_extra_params
            .iter()
            .map(|(key, value)| (key.clone(), param_text(value)))
            .collect()
    }

    /// Configured timezone or [`DEFAULT_TIMEZONE`].
    #[must_use]
    pub fn timezone(&self) -> &str {
        non_empty(self.timezone.as_deref()).unwrap_or(DEFAULT_TIMEZONE)
    }

    /// Configured timeout or the connector's default.
    #[must_use]
    pub fn timeout_or(&self, default: Duration) -> Duration {
        self.timeout_secs.map_or(default, Duration::from_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
/// A named source as written in the configuration file.
pub struct SourceEntry {
    /// Unique identifier.
    pub id: SourceId,
    /// Display name, defaults to the id.
    #[serde(default)]
    pub name: Option<String>,
    /// Connector strategy.
    pub kind: SourceKind,
    /// Inputs and overrides.
    #[serde(flatten)]
    pub source: SourceConfig,
}

impl SourceEntry {
    /// Metadata for the plugin registry.
    #[must_use]
    pub fn meta(&self) -> SourceMeta {
        SourceMeta {
            id: self.id.clone(),
            name: self.name.clone().unwrap_or_else(|| self.id.0.clone()),
            kind: self.kind,
            timezone: self.source.timezone().to_owned(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
/// Root of the configuration file.
pub struct AppConfig {
    /// Configured sources, in display order.
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
}

impl AppConfig {
    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::DuplicateSource`] when two sources share an id.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;

        let mut seen = HashSet::new();
        for entry in &config.sources {
            if !seen.insert(&entry.id) {
                return Err(ConfigError::DuplicateSource(entry.id.clone()));
            }
        }

        Ok(config)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}

fn param_text(value: &toml::Value) -> String {
    match value {
        toml::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
