//! Scalar extraction from Prometheus instant-query responses
//!
//! An instant query answers with
//! `{"status":"success","data":{"resultType":"vector","result":[{"metric":{..},"value":[<ts>,"<v>"]}]}}`.
//! Only the first series is read, and only its value string.

use crate::error::{MetricsError, Result};
use serde_json::Value;

/// Pull the string at `data.result[0].value[1]` out of a response body
pub fn extract_value(body: &str) -> Result<String> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| MetricsError::shape(format!("response is not valid JSON: {}", e)))?;

    let result = json
        .get("data")
        .and_then(|d| d.get("result"))
        .and_then(Value::as_array)
        .ok_or_else(|| MetricsError::shape("missing data.result array"))?;

    let first = result
        .first()
        .ok_or_else(|| MetricsError::shape("data.result is empty"))?;

    let value = first
        .get("value")
        .and_then(Value::as_array)
        .and_then(|pair| pair.get(1))
        .ok_or_else(|| MetricsError::shape("missing data.result[0].value[1]"))?;

    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| MetricsError::shape(format!("expected string sample value, got {}", value)))
}

pub fn parse_f64(value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|e| MetricsError::parse(value, "float", e.to_string()))
}

/// Parse a base-10 integer. Fractional strings such as `"4.0"` are rejected.
pub fn parse_i64(value: &str) -> Result<i64> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|e| MetricsError::parse(value, "integer", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector_body(value: &str) -> String {
        format!(
            r#"{{"status":"success","data":{{"resultType":"vector","result":[{{"metric":{{"instance":"node1"}},"value":[1700000000.123,"{}"]}}]}}}}"#,
            value
        )
    }

    #[test]
    fn test_extract_value() {
        assert_eq!(extract_value(&vector_body("0.42")).unwrap(), "0.42");
    }

    #[test]
    fn test_extract_reads_first_series_only() {
        let body = r#"{"data":{"result":[{"value":[1,"7"]},{"value":[1,"9"]}]}}"#;
        assert_eq!(extract_value(body).unwrap(), "7");
    }

    #[test]
    fn test_extract_empty_result() {
        let body = r#"{"status":"success","data":{"resultType":"vector","result":[]}}"#;
        assert!(matches!(extract_value(body), Err(MetricsError::Shape { .. })));
    }

    #[test]
    fn test_extract_missing_data() {
        let body = r#"{"status":"error","errorType":"bad_data","error":"parse error"}"#;
        assert!(matches!(extract_value(body), Err(MetricsError::Shape { .. })));
    }

    #[test]
    fn test_extract_non_string_value() {
        let body = r#"{"data":{"result":[{"value":[1700000000, 12]}]}}"#;
        assert!(matches!(extract_value(body), Err(MetricsError::Shape { .. })));
    }

    #[test]
    fn test_extract_invalid_json() {
        assert!(matches!(extract_value("<html>"), Err(MetricsError::Shape { .. })));
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_f64("0.25").unwrap(), 0.25);
        assert_eq!(parse_i64("16").unwrap(), 16);
        assert_eq!(parse_i64("8233394176").unwrap(), 8_233_394_176);
        assert!(parse_f64("NaN").unwrap().is_nan());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_i64("4.0"), Err(MetricsError::Parse { .. })));
        assert!(matches!(parse_f64("abc"), Err(MetricsError::Parse { .. })));
    }
}
