//! Conversion of raw upstream records into [`CollectionEvent`]s.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use log::debug;
use serde_json::Value;

use crate::model::CollectionEvent;

/// Formats tried on the whole date string when the ISO prefix does not parse.
const FALLBACK_DATE_FORMATS: &[&str] = &["%d/%m/%Y"];

/// Length of an ISO calendar date, `YYYY-MM-DD`.
const ISO_DATE_LEN: usize = 10;

/// Parse an upstream date, ignoring any time component.
///
/// The first ten characters are read as an ISO calendar date with two-digit
/// month and day (`2024-3-5` is rejected); when that fails the whole (trimmed)
/// string is tried against the fallback formats.
#[must_use]
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let prefix = trimmed
        .char_indices()
        .nth(ISO_DATE_LEN)
        .and_then(|(end, _)| trimmed.get(..end))
        .unwrap_or(trimmed);

    let iso = Some(prefix)
        .filter(|candidate| is_iso_date_shape(candidate))
        .and_then(|candidate| candidate.parse::<NaiveDate>().ok());

    iso.or_else(|| {
        FALLBACK_DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
    })
}

fn is_iso_date_shape(text: &str) -> bool {
    text.len() == ISO_DATE_LEN
        && text.bytes().enumerate().all(|(position, byte)| match position {
            4 | 7 => byte == b'-',
            _ => byte.is_ascii_digit(),
        })
}

#[derive(Debug, Clone, Default)]
/// Remapping of raw upstream labels to displayed labels.
pub struct LabelMap(HashMap<String, String>);

impl LabelMap {
    /// Wrap a raw -> displayed table.
    #[must_use]
    pub fn new(table: HashMap<String, String>) -> Self {
        Self(table)
    }

    /// Mapped label, or the raw label when unmapped.
    #[must_use]
    pub fn apply(&self, raw: &str) -> String {
        self.0.get(raw).cloned().unwrap_or_else(|| raw.to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Field names of a raw event object.
pub struct EventFields {
    /// Field holding the date string.
    pub date: String,
    /// Field holding the waste type.
    pub waste_type: String,
}

impl Default for EventFields {
    fn default() -> Self {
        Self {
            date: "date".to_owned(),
            waste_type: "stream".to_owned(),
        }
    }
}

/// Normalize raw event objects, keeping their order.
///
/// Events without a parseable date are dropped.
#[must_use]
pub fn normalize_raw_events(
    events: &[Value],
    fields: &EventFields,
    labels: &LabelMap,
) -> Vec<CollectionEvent> {
    let mut out = Vec::with_capacity(events.len());

    for event in events {
        let raw_type = event
            .get(&fields.waste_type)
            .and_then(Value::as_str)
            .map_or("", str::trim);

        let Some(raw_date) = event.get(&fields.date).and_then(Value::as_str) else {
            debug!("dropping event without '{}': {event}", fields.date);
            continue;
        };
        let Some(date) = parse_event_date(raw_date) else {
            debug!("dropping event with unparseable date '{raw_date}'");
            continue;
        };

        out.push(CollectionEvent::new(date, labels.apply(raw_type)));
    }

    out
}

/// Group `(date, label)` pairs by calendar day into one event per day.
///
/// Labels of a day are deduplicated and joined alphabetically with `", "`; the
/// result is sorted by date. Pairs whose date does not parse are dropped.
#[must_use]
pub fn aggregate_by_date<I>(pairs: I, labels: &LabelMap) -> Vec<CollectionEvent>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut by_date = BTreeMap::<NaiveDate, BTreeSet<String>>::new();

    for (raw_date, label) in pairs {
        let Some(date) = parse_event_date(&raw_date) else {
            debug!("dropping scanned event with unparseable date '{raw_date}'");
            continue;
        };
        by_date.entry(date).or_default().insert(labels.apply(&label));
    }

    by_date
        .into_iter()
        .map(|(date, day_labels)| {
            let joined = day_labels.into_iter().collect::<Vec<_>>().join(", ");
            CollectionEvent::new(date, joined)
        })
        .collect()
}
