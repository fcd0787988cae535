// crates/core/src/envelope.rs
//! The uniform response envelope every route serializes.
//!
//! `{"success": bool, "message": str, "data": <payload|null>}`, with 200 on
//! success and 4xx/500 plus `success: false` on errors.

use serde::Serialize;

/// Wire envelope wrapping every API response body.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Success envelope with a payload.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl Envelope<()> {
    /// Success envelope with no payload (`data: null`).
    pub fn ok_empty(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }

    /// Failure envelope; `data` is always null on errors.
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope_serialization() {
        let env = Envelope::ok("job submitted", serde_json::json!({"job_name": "j-1"}));
        let json = serde_json::to_string(&env).unwrap();
        assert!(json.contains("\"success\":true"));
        assert!(json.contains("\"message\":\"job submitted\""));
        assert!(json.contains("\"job_name\":\"j-1\""));
    }

    #[test]
    fn test_fail_envelope_has_null_data() {
        let env = Envelope::fail("job j-1 not found");
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["success"], false);
        assert!(json["data"].is_null());
    }

    #[test]
    fn test_ok_empty() {
        let env = Envelope::ok_empty("pong");
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["success"], true);
        assert!(json["data"].is_null());
    }
}
