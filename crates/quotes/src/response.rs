//! Checked navigation of the latest-quotes response.
//!
//! Expected shape:
//! `{ "data": { "<id>": { "quote": { "USD": { "price": .., "market_cap": .., ... } } } } }`

use chrono::{DateTime, Utc};
use coinquote_core::{FetchError, Stats};
use serde_json::{Map, Value};

/// Decode a response body into a generic JSON value.
pub fn parse_body(body: &str) -> Result<Value, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Decode(format!("Invalid JSON body: {}", e)))
}

/// Pull the USD stats for `id` out of a decoded response.
///
/// The five price fields are required. `volume_24h` and `last_updated` are
/// taken when present and well-typed, otherwise left at their defaults.
pub fn extract_usd_stats(response: &Value, id: u32) -> Result<Stats, FetchError> {
    let id_key = id.to_string();

    let data = object_field(response.as_object(), "data", "data")?;
    let entry = object_field(Some(data), &id_key, &format!("data.{id_key}"))?;
    let quote = object_field(Some(entry), "quote", &format!("data.{id_key}.quote"))?;
    let usd_path = format!("data.{id_key}.quote.USD");
    let usd = object_field(Some(quote), "USD", &usd_path)?;

    Ok(Stats {
        price: number_field(usd, "price", &usd_path)?,
        market_cap: number_field(usd, "market_cap", &usd_path)?,
        percent_change_1h: number_field(usd, "percent_change_1h", &usd_path)?,
        percent_change_24h: number_field(usd, "percent_change_24h", &usd_path)?,
        percent_change_7d: number_field(usd, "percent_change_7d", &usd_path)?,
        volume_24h: usd
            .get("volume_24h")
            .and_then(Value::as_f64)
            .map(|v| v as i64)
            .unwrap_or_default(),
        last_updated: usd
            .get("last_updated")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc)),
    })
}

/// Best-effort error text from a failed response body.
///
/// The service reports failures as `{"status": {"error_message": ".."}}`;
/// anything else is passed through trimmed.
pub fn api_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("status")
                .and_then(|s| s.get("error_message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn object_field<'a>(
    parent: Option<&'a Map<String, Value>>,
    key: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, FetchError> {
    let value = parent
        .and_then(|p| p.get(key))
        .ok_or_else(|| FetchError::MalformedResponse(format!("missing {}", path)))?;
    value
        .as_object()
        .ok_or_else(|| FetchError::MalformedResponse(format!("{} is not an object", path)))
}

fn number_field(obj: &Map<String, Value>, key: &str, parent_path: &str) -> Result<f64, FetchError> {
    let value = obj.get(key).ok_or_else(|| {
        FetchError::MalformedResponse(format!("missing {}.{}", parent_path, key))
    })?;
    value.as_f64().ok_or_else(|| {
        FetchError::MalformedResponse(format!("{}.{} is not a number", parent_path, key))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_full_quote() {
        let body = json!({
            "data": {"1": {"quote": {"USD": {
                "price": 64000.5,
                "volume_24h": 31000000000.7,
                "market_cap": 1.26e12,
                "percent_change_1h": -0.12,
                "percent_change_24h": 1.5,
                "percent_change_7d": 4.25,
                "last_updated": "2024-05-01T12:00:00.000Z"
            }}}}
        });
        let stats = extract_usd_stats(&body, 1).unwrap();
        assert_eq!(stats.price, 64000.5);
        assert_eq!(stats.volume_24h, 31_000_000_000);
        assert_eq!(stats.market_cap, 1.26e12);
        assert_eq!(stats.percent_change_1h, -0.12);
        assert_eq!(stats.percent_change_7d, 4.25);
        assert_eq!(
            stats.last_updated.unwrap().to_rfc3339(),
            "2024-05-01T12:00:00+00:00"
        );
    }

    #[test]
    fn test_integer_price_accepted() {
        let body = json!({"data": {"7": {"quote": {"USD": {
            "price": 1, "market_cap": 2, "percent_change_1h": 0,
            "percent_change_24h": 0, "percent_change_7d": 0
        }}}}});
        let stats = extract_usd_stats(&body, 7).unwrap();
        assert_eq!(stats.price, 1.0);
        assert_eq!(stats.volume_24h, 0);
        assert!(stats.last_updated.is_none());
    }

    #[test]
    fn test_missing_usd_is_malformed() {
        let body = json!({"data": {"2": {"quote": {}}}});
        match extract_usd_stats(&body, 2) {
            Err(FetchError::MalformedResponse(msg)) => assert_eq!(msg, "missing data.2.quote.USD"),
            other => panic!("Expected MalformedResponse, got {other:?}"),
        }
    }

    #[test]
    fn test_wrong_id_is_malformed() {
        let body = json!({"data": {"1": {}}});
        assert!(matches!(
            extract_usd_stats(&body, 2),
            Err(FetchError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_string_price_is_malformed() {
        let body = json!({"data": {"2": {"quote": {"USD": {
            "price": "123.45", "market_cap": 1.0, "percent_change_1h": 0.0,
            "percent_change_24h": 0.0, "percent_change_7d": 0.0
        }}}}});
        match extract_usd_stats(&body, 2) {
            Err(FetchError::MalformedResponse(msg)) => assert!(msg.contains("price is not a number")),
            other => panic!("Expected MalformedResponse, got {other:?}"),
        }
    }

    #[test]
    fn test_null_change_is_malformed() {
        let body = json!({"data": {"2": {"quote": {"USD": {
            "price": 1.0, "market_cap": 1.0, "percent_change_1h": null,
            "percent_change_24h": 0.0, "percent_change_7d": 0.0
        }}}}});
        assert!(matches!(
            extract_usd_stats(&body, 2),
            Err(FetchError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_non_object_root_is_malformed() {
        assert!(matches!(
            extract_usd_stats(&json!([1, 2, 3]), 1),
            Err(FetchError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_body_rejects_garbage() {
        assert!(matches!(parse_body("<html>"), Err(FetchError::Decode(_))));
    }

    #[test]
    fn test_api_error_message() {
        let body = r#"{"status":{"error_code":1001,"error_message":"This API Key is invalid."}}"#;
        assert_eq!(api_error_message(body), "This API Key is invalid.");
        assert_eq!(api_error_message(" Bad Gateway \n"), "Bad Gateway");
    }
}
