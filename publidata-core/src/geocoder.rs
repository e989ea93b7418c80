//! Client for the Publidata geocoder (`FeatureCollection` responses).

use log::{debug, info};
use reqwest::Client;
use serde_json::Value;

use crate::http::fetch_json;
use crate::json::{JsonPath, as_identifier, dig, is_truthy};
use crate::model::{AddressId, InseeCode};
use crate::ports::PortError;

/// Default geocoder endpoint.
pub const GEOCODER_URL: &str = "https://api.publidata.io/v2/geocoder";

const RESULT_LIMIT: &str = "10000";
const LOOKUP: &str = "publidata";
const FEATURES_PATH: &[&str] = &["features"];
const ADDRESS_ID_PATH: &[&str] = &["properties", "id"];
const CERTIFICATION_FIELDS: &[&str] = &["certification", "certified"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How to pick one feature out of the geocoder results.
pub enum CandidatePolicy {
    /// Always take the first feature.
    First,
    /// Take the first certified feature, or the first feature when none is certified.
    PreferCertified,
}

/// Geocoder bound to one source's HTTP client.
pub struct Geocoder {
    client: Client,
    url: String,
    policy: CandidatePolicy,
}

impl Geocoder {
    /// Create a geocoder against [`GEOCODER_URL`].
    #[must_use]
    pub fn new(client: Client, policy: CandidatePolicy) -> Self {
        Self {
            client,
            url: GEOCODER_URL.to_owned(),
            policy,
        }
    }

    /// Point the geocoder at another endpoint.
    #[must_use]
    pub fn with_url<S: Into<String>>(mut self, url: S) -> Self {
        self.url = url.into();
        self
    }

    /// Resolve a free-text address within a municipality.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the request fails, no feature matches, or the
    /// chosen feature has no identifier.
    pub async fn geocode(&self, query: &str, citycode: &InseeCode) -> Result<AddressId, PortError> {
        debug!("geocoding '{query}' in {citycode}");

        let req = self
            .client
            .get(&self.url)
            .query(&geocoder_params(query, citycode));

        let body = fetch_json(req).await?;
        let address_id = select_address_id(&body, self.policy)?;

        info!("resolved '{query}' in {citycode} to address {address_id}");
        Ok(address_id)
    }
}

/// Query pairs of one geocoder request.
fn geocoder_params<'query>(
    query: &'query str,
    citycode: &'query InseeCode,
) -> [(&'static str, &'query str); 4] {
    [
        ("q", query),
        ("limit", RESULT_LIMIT),
        ("lookup", LOOKUP),
        ("citycode", citycode.0.as_str()),
    ]
}

/// Pick a feature according to `policy` and extract its address identifier.
///
/// The identifier is read from `properties.id`, then from the feature's own `id`.
///
/// # Errors
///
/// Returns [`PortError::Lookup`] when the response has no `features`,
/// [`PortError::NoResults`] when it is empty, and [`PortError::MissingField`] when
/// the chosen feature carries no identifier.
pub fn select_address_id(body: &Value, policy: CandidatePolicy) -> Result<AddressId, PortError> {
    let Some(features) = dig(body, &JsonPath::keys(FEATURES_PATH))?.as_array() else {
        return Err(PortError::UnexpectedShape(
            "geocoder 'features' is not a list".to_owned(),
        ));
    };
    if features.is_empty() {
        return Err(PortError::NoResults("address"));
    }

    let certified = match policy {
        CandidatePolicy::First => None,
        CandidatePolicy::PreferCertified => features.iter().find(|feature| is_certified(feature)),
    };
    let Some(candidate) = certified.or_else(|| features.first()) else {
        return Err(PortError::NoResults("address"));
    };

    dig(candidate, &JsonPath::keys(ADDRESS_ID_PATH))
        .ok()
        .or_else(|| candidate.get("id"))
        .and_then(as_identifier)
        .map(AddressId)
        .ok_or_else(|| PortError::MissingField("properties.id".to_owned()))
}

fn is_certified(feature: &Value) -> bool {
    feature.get("properties").is_some_and(|properties| {
        CERTIFICATION_FIELDS
            .iter()
            .filter_map(|field| properties.get(*field))
            .any(is_truthy)
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_carries_query_limit_lookup_and_citycode() {
        let citycode = InseeCode("59080".to_owned());

        assert_eq!(
            geocoder_params("965 Rue", &citycode),
            [
                ("q", "965 Rue"),
                ("limit", "10000"),
                ("lookup", "publidata"),
                ("citycode", "59080"),
            ],
            "all four pairs, in order"
        );
    }

    fn collection() -> Value {
        json!({
            "type": "FeatureCollection",
            "features": [
                {"properties": {"id": "first", "label": "965 Rue du Moulin"}},
                {"properties": {"id": "second", "certification": true}},
                {"properties": {"id": "third", "certification": true}}
            ]
        })
    }

    #[test]
    fn first_policy_ignores_certification() {
        let id = select_address_id(&collection(), CandidatePolicy::First).expect("id");
        assert_eq!(id, AddressId("first".into()), "first feature wins");
    }

    #[test]
    fn prefer_certified_takes_first_certified() {
        let id = select_address_id(&collection(), CandidatePolicy::PreferCertified).expect("id");
        assert_eq!(id, AddressId("second".into()), "first certified feature wins");
    }

    #[test]
    fn prefer_certified_falls_back_to_first() {
        let body = json!({"features": [
            {"properties": {"id": "a", "certification": false}},
            {"properties": {"id": "b"}}
        ]});

        let id = select_address_id(&body, CandidatePolicy::PreferCertified).expect("id");

        assert_eq!(id, AddressId("a".into()), "no certified feature means first");
    }

    #[test]
    fn empty_features_fail() {
        let body = json!({"type": "FeatureCollection", "features": []});

        for policy in [CandidatePolicy::First, CandidatePolicy::PreferCertified] {
            let err = select_address_id(&body, policy).expect_err("no features");
            assert!(matches!(err, PortError::NoResults("address")), "got {err:?}");
        }
    }

    #[test]
    fn missing_features_key_is_a_lookup_error() {
        let err = select_address_id(&json!({"items": []}), CandidatePolicy::First)
            .expect_err("no features key");
        assert!(matches!(err, PortError::Lookup(_)), "got {err:?}");
    }

    #[test]
    fn falls_back_to_top_level_id() {
        let body = json!({"features": [{"id": 4242, "properties": {"label": "x"}}]});

        let id = select_address_id(&body, CandidatePolicy::First).expect("id");

        assert_eq!(id, AddressId("4242".into()), "numeric top-level id");
    }

    #[test]
    fn feature_without_any_id_fails() {
        let body = json!({"features": [{"properties": {"id": ""}}]});

        let err = select_address_id(&body, CandidatePolicy::First).expect_err("blank id");

        assert!(matches!(err, PortError::MissingField(_)), "got {err:?}");
    }
}
