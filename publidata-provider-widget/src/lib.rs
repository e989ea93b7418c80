//! Publidata connector scraping the calendar widget.
//!
//! Addresses go through the shared geocoder (certified matches first); events
//! are read from the hydration payload of the widget's calendar page.

/// Hydration payload extraction from HTML.
pub mod payload;
/// Heuristic event search inside the payload.
pub mod scan;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use publidata_core::{
    config::{ConfigError, SourceConfig, SourceEntry},
    geocoder::{CandidatePolicy, Geocoder},
    http::fetch_text,
    model::{AddressId, AddressInput, CityRef, CollectionEvent, SourceKind},
    normalize::{LabelMap, aggregate_by_date},
    plugin::SourcePlugin,
    ports::{AddressPort, PortError, SchedulePort},
};

use crate::payload::extract_payload;
use crate::scan::scan_events;

/// Calendar widget of the Pévèle Carembault instance.
pub const DEFAULT_WIDGET_URL: &str = "https://next.publidata.io/instances/Ad7D6tp4LB";

/// Request timeout when the source does not override it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Address resolution through the geocoder only.
pub struct WidgetAddressPort {
    geocoder: Geocoder,
}

impl WidgetAddressPort {
    /// Create a new address port bound to the given HTTP client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            geocoder: Geocoder::new(client, CandidatePolicy::PreferCertified),
        }
    }
}

#[async_trait]
impl AddressPort for WidgetAddressPort {
    async fn resolve(&self, input: &AddressInput) -> Result<AddressId, PortError> {
        match input {
            AddressInput::Direct(address_id) => Ok(address_id.clone()),
            AddressInput::Query {
                city: CityRef::Code(citycode),
                query,
            } => self.geocoder.geocode(query, citycode).await,
            AddressInput::Query {
                city: CityRef::Name(_),
                ..
            } => Err(PortError::Config(ConfigError::CityNameUnsupported {
                kind: SourceKind::Widget,
            })),
        }
    }
}

/// Pickup schedule implementation reading the widget's calendar page.
pub struct WidgetSchedulePort {
    client: Client,
    calendar_url: String,
    labels: LabelMap,
}

impl WidgetSchedulePort {
    /// Create a schedule port from a source's overrides.
    #[must_use]
    pub fn new(client: Client, source: &SourceConfig) -> Self {
        let base = source
            .widget_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_WIDGET_URL)
            .trim_end_matches('/');

        Self {
            client,
            calendar_url: format!("{base}/calendar"),
            labels: LabelMap::new(source.type_map.clone()),
        }
    }
}

#[async_trait]
impl SchedulePort for WidgetSchedulePort {
    async fn schedule(&self, address_id: &AddressId) -> Result<Vec<CollectionEvent>, PortError> {
        debug!("requesting calendar page {} for address {address_id}", self.calendar_url);

        let req = self
            .client
            .get(&self.calendar_url)
            .query(&[("address_id", address_id.0.as_str())]);
        let html = fetch_text(req).await?;

        let payload = extract_payload(&html)?;
        let found = scan_events(&payload);
        debug!("found {} dated nodes in the calendar payload", found.len());

        Ok(aggregate_by_date(found, &self.labels))
    }
}

/// Build the plugin bundle for a widget source.
///
/// # Errors
///
/// Returns [`PortError::Config`] when the source cannot identify an address or
/// only names its city.
pub fn plugin(client: Client, entry: &SourceEntry) -> Result<SourcePlugin, PortError> {
    let input = entry.source.address_input()?;
    if let AddressInput::Query {
        city: CityRef::Name(_),
        ..
    } = input
    {
        return Err(PortError::Config(ConfigError::CityNameUnsupported {
            kind: SourceKind::Widget,
        }));
    }

    let address_port = Arc::new(WidgetAddressPort::new(client.clone()));
    let schedule_port = Arc::new(WidgetSchedulePort::new(client, &entry.source));

    Ok(SourcePlugin {
        meta: entry.meta(),
        input,
        address_port,
        schedule_port,
    })
}
