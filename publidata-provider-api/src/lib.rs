//! Publidata connector using the documented JSON endpoints:
//! city search, geocoder, then the waste collection events endpoint.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use serde_json::Value;

use publidata_core::{
    config::{SourceConfig, SourceEntry},
    geocoder::{CandidatePolicy, Geocoder},
    http::fetch_json,
    json::{JsonPath, as_identifier, dig},
    model::{AddressId, AddressInput, CityRef, CollectionEvent, InseeCode},
    normalize::{EventFields, LabelMap, normalize_raw_events},
    plugin::SourcePlugin,
    ports::{AddressPort, PortError, SchedulePort},
};

const CITY_SEARCH_URL: &str = "https://api.publidata.io/v2/search";

/// Events endpoint used when the source does not override it.
pub const DEFAULT_EVENTS_URL: &str = "https://api.publidata.io/v2/waste_collection/events";

/// Request timeout for this connector.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const CITY_SEARCH_SIZE: &str = "1000";
const CITY_SELECT_FIELDS: &[&str] = &["full_name", "postal_codes", "insee_code", "address_count"];
const CITY_ARRAY_PATH: &[&str] = &["items"];
const CITY_CODE_FIELD: &str = "insee_code";
const EVENTS_ARRAY_PATH: &[&str] = &["items"];

/// INSEE codes of the Pévèle Carembault territory.
pub const INSEE_WHITELIST_DEFAULT: &[&str] = &[
    "59004", "59022", "59029", "59034", "59042", "59071", "59080", "59096", "59105", "59123",
    "59124", "59129", "59145", "59150", "59158", "59168", "59197", "59258", "59266", "59304",
    "59330", "59364", "59398", "59408", "59411", "59419", "59427", "59435", "59449", "59452",
    "59462", "59466", "59551", "59586", "59592", "59600", "59630", "59638",
];

/// Address resolution through the city search and the geocoder.
pub struct ApiAddressPort {
    client: Client,
    geocoder: Geocoder,
    insee_whitelist: Vec<String>,
}

impl ApiAddressPort {
    /// Create a new address port bound to the given HTTP client.
    #[must_use]
    pub fn new(client: Client, insee_whitelist: Vec<String>) -> Self {
        Self {
            geocoder: Geocoder::new(client.clone(), CandidatePolicy::First),
            client,
            insee_whitelist,
        }
    }

    async fn resolve_citycode(&self, city: &CityRef) -> Result<InseeCode, PortError> {
        let name = match city {
            CityRef::Code(code) => return Ok(code.clone()),
            CityRef::Name(name) => name,
        };

        debug!("searching city '{name}' among {} INSEE codes", self.insee_whitelist.len());

        let req = self
            .client
            .get(CITY_SEARCH_URL)
            .query(&city_search_params(name, &self.insee_whitelist));
        let body = fetch_json(req).await?;
        let code = select_insee_code(&body)?;

        info!("city '{name}' resolved to INSEE code {code}");
        Ok(code)
    }
}

#[async_trait]
impl AddressPort for ApiAddressPort {
    async fn resolve(&self, input: &AddressInput) -> Result<AddressId, PortError> {
        match input {
            AddressInput::Direct(address_id) => Ok(address_id.clone()),
            AddressInput::Query { city, query } => {
                let citycode = self.resolve_citycode(city).await?;
                self.geocoder.geocode(query, &citycode).await
            }
        }
    }
}

/// Pickup schedule implementation reading the events endpoint.
pub struct ApiSchedulePort {
    client: Client,
    events_url: String,
    extra_params: BTreeMap<String, String>,
    events_path: JsonPath,
    fields: EventFields,
    labels: LabelMap,
}

impl ApiSchedulePort {
    /// Create a schedule port from a source's overrides.
    #[must_use]
    pub fn new(client: Client, source: &SourceConfig) -> Self {
        let defaults = EventFields::default();
        let events_url = source
            .events_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_EVENTS_URL)
            .trim_end_matches('/')
            .to_owned();

        Self {
            client,
            events_url,
            extra_params: source.events_query_params(),
            events_path: source
                .events_path
                .clone()
                .unwrap_or_else(|| JsonPath::keys(EVENTS_ARRAY_PATH)),
            fields: EventFields {
                date: source.event_date_field.clone().unwrap_or(defaults.date),
                waste_type: source
                    .event_type_field
                    .clone()
                    .unwrap_or(defaults.waste_type),
            },
            labels: LabelMap::new(source.type_map.clone()),
        }
    }
}

#[async_trait]
impl SchedulePort for ApiSchedulePort {
    async fn schedule(&self, address_id: &AddressId) -> Result<Vec<CollectionEvent>, PortError> {
        let params = events_params(address_id, &self.extra_params);
        debug!("requesting events from {} for address {address_id}", self.events_url);

        let body = fetch_json(self.client.get(&self.events_url).query(&params)).await?;
        let events = select_events(&body, &self.events_path)?;

        let normalized = normalize_raw_events(events, &self.fields, &self.labels);
        if normalized.len() < events.len() {
            debug!(
                "dropped {} of {} events without a usable date",
                events.len() - normalized.len(),
                events.len()
            );
        }

        Ok(normalized)
    }
}

/// Build the plugin bundle for an API source.
///
/// # Errors
///
/// Returns [`PortError::Config`] when the source cannot identify an address.
pub fn plugin(client: Client, entry: &SourceEntry) -> Result<SourcePlugin, PortError> {
    let input = entry.source.address_input()?;

    let whitelist = entry
        .source
        .insee_whitelist
        .clone()
        .filter(|codes| !codes.is_empty())
        .unwrap_or_else(|| {
            INSEE_WHITELIST_DEFAULT
                .iter()
                .map(|code| (*code).to_owned())
                .collect()
        });

    let address_port = Arc::new(ApiAddressPort::new(client.clone(), whitelist));
    let schedule_port = Arc::new(ApiSchedulePort::new(client, &entry.source));

    Ok(SourcePlugin {
        meta: entry.meta(),
        input,
        address_port,
        schedule_port,
    })
}

/// Query string of the city search; list parameters are repeated.
fn city_search_params<'query>(
    name: &'query str,
    insee_whitelist: &'query [String],
) -> Vec<(&'static str, &'query str)> {
    let mut params = vec![
        ("size", CITY_SEARCH_SIZE),
        ("types[]", "city"),
        ("q", name),
    ];
    params.extend(CITY_SELECT_FIELDS.iter().map(|field| ("select[]", *field)));
    params.extend(
        insee_whitelist
            .iter()
            .map(|code| ("insee_codes[]", code.as_str())),
    );
    params
}

/// First search item's INSEE code.
fn select_insee_code(body: &Value) -> Result<InseeCode, PortError> {
    let items = dig(body, &JsonPath::keys(CITY_ARRAY_PATH))?;
    let first = items
        .as_array()
        .and_then(|cities| cities.first())
        .ok_or(PortError::NoResults("city"))?;

    first
        .get(CITY_CODE_FIELD)
        .and_then(as_identifier)
        .map(InseeCode)
        .ok_or_else(|| PortError::MissingField(CITY_CODE_FIELD.to_owned()))
}

/// `address_id` plus the extra parameters, which take precedence.
fn events_params(
    address_id: &AddressId,
    extra_params: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut params = BTreeMap::from([("address_id".to_owned(), address_id.0.clone())]);
    params.extend(
        extra_params
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );
    params
}

fn select_events<'body>(body: &'body Value, path: &JsonPath) -> Result<&'body [Value], PortError> {
    dig(body, path)?
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| PortError::UnexpectedShape(format!("events at {path} is not a list")))
}
