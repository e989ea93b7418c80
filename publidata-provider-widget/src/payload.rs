//! Extraction of the JSON state embedded in the server-rendered calendar page.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde_json::Value;

use publidata_core::ports::PortError;

/// Element id of the script block holding the hydration payload.
pub const PAYLOAD_ELEMENT_ID: &str = "__NEXT_DATA__";

static PAYLOAD_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(&format!("script#{PAYLOAD_ELEMENT_ID}")).expect("valid payload selector")
});

/// Parse the hydration payload out of an HTML document.
///
/// # Errors
///
/// Returns [`PortError::MarkerNotFound`] when the page has no payload script,
/// which usually means the page layout changed or the address was rejected, and
/// [`PortError::Json`] when the script does not hold valid JSON.
pub fn extract_payload(html: &str) -> Result<Value, PortError> {
    let document = Html::parse_document(html);
    let script = document
        .select(&PAYLOAD_SELECTOR)
        .next()
        .ok_or_else(|| PortError::MarkerNotFound(PAYLOAD_ELEMENT_ID.to_owned()))?;

    let text = script.text().collect::<String>();
    serde_json::from_str(&text).map_err(PortError::from)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn extracts_embedded_json() {
        let html = r#"<!DOCTYPE html>
            <html><head><title>Calendrier</title></head>
            <body>
              <div id="__next"><p>Chargement…</p></div>
              <script id="__NEXT_DATA__" type="application/json">
                {"props": {"pageProps": {"events": [{"date": "2024-03-15", "label": "Verre"}]}}}
              </script>
            </body></html>"#;

        let payload = extract_payload(html).expect("payload present");

        assert_eq!(
            payload.pointer("/props/pageProps/events/0/label"),
            Some(&json!("Verre")),
            "payload is parsed as JSON"
        );
    }

    #[test]
    fn missing_marker_is_reported() {
        let html = "<html><body><script>window.foo = 1;</script></body></html>";

        let err = extract_payload(html).expect_err("no payload");

        assert!(
            matches!(&err, PortError::MarkerNotFound(id) if id == PAYLOAD_ELEMENT_ID),
            "got {err:?}"
        );
    }

    #[test]
    fn invalid_json_is_reported() {
        let html = r#"<script id="__NEXT_DATA__" type="application/json">{not json</script>"#;

        let err = extract_payload(html).expect_err("broken payload");

        assert!(matches!(err, PortError::Json(_)), "got {err:?}");
    }
}
