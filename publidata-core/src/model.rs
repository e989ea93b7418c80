//! Domain data structures for sources, addresses, and collection events.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Identifier of a configured source instance.
pub struct SourceId(pub String);

impl fmt::Display for SourceId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Strategy used to obtain addresses and events from Publidata.
pub enum SourceKind {
    /// Documented JSON endpoints (city search, geocoder, events).
    Api,
    /// Hydration payload scraped from the calendar widget page.
    Widget,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slug = match self {
            SourceKind::Api => "api",
            SourceKind::Widget => "widget",
        };
        write!(formatter, "{slug}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Metadata describing a configured source and its human-friendly name.
pub struct SourceMeta {
    /// Unique identifier.
    pub id: SourceId,
    /// Display name.
    pub name: String,
    /// Connector strategy.
    pub kind: SourceKind,
    /// Timezone hint of the served territory, informational only.
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Administrative (INSEE) code of a municipality.
pub struct InseeCode(pub String);

impl fmt::Display for InseeCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Opaque identifier of a street address as returned by the geocoder.
pub struct AddressId(pub String);

impl fmt::Display for AddressId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Municipality reference used to scope a geocoder query.
pub enum CityRef {
    /// Administrative code known up front.
    Code(InseeCode),
    /// Free-text city name, resolved through the city search.
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Validated identifying input of a source.
pub enum AddressInput {
    /// Address identifier supplied directly, no lookup needed.
    Direct(AddressId),
    /// Free-text address query scoped to a municipality.
    Query {
        /// Municipality the query is scoped to.
        city: CityRef,
        /// Free-text address, e.g. `965 Rue`.
        query: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
/// A single waste pickup on a calendar day.
pub struct CollectionEvent {
    /// Date of the pickup.
    pub date: NaiveDate,
    /// Waste type label as shown to users.
    pub waste_type: String,
}

impl CollectionEvent {
    /// Build an event from a date and a label.
    #[must_use]
    pub fn new<S: Into<String>>(date: NaiveDate, waste_type: S) -> Self {
        Self {
            date,
            waste_type: waste_type.into(),
        }
    }
}
