use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ApiError;

/// The payload stored under a key.
///
/// `timestamp` is milliseconds since the Unix epoch at which the message
/// was last saved. It is always assigned by the service, never taken
/// from the caller, and is left out of the JSON while still zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub value: String,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub timestamp: i64,
}

fn is_zero(ts: &i64) -> bool {
    *ts == 0
}

impl Message {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            timestamp: 0,
        }
    }

    /// Parse a request body into an unsaved message.
    ///
    /// Any client-supplied timestamp is discarded.
    pub fn from_request_body(body: &[u8]) -> Result<Self, ApiError> {
        let parsed: Message =
            serde_json::from_slice(body).map_err(|e| ApiError::InvalidMessage(e.to_string()))?;

        if parsed.value.is_empty() {
            return Err(ApiError::InvalidMessage("value is required".to_string()));
        }

        Ok(Message::new(parsed.value))
    }

    /// Set `timestamp` to the current wall-clock time.
    pub fn stamp(&mut self) {
        self.timestamp = Utc::now().timestamp_millis();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_value_and_drops_client_timestamp() {
        let m = Message::from_request_body(br#"{"value":"hello","timestamp":42}"#).unwrap();
        assert_eq!(m, Message::new("hello"));
    }

    #[test]
    fn missing_or_empty_value_is_rejected() {
        for body in [&br#"{}"#[..], br#"{"value":""}"#] {
            match Message::from_request_body(body) {
                Err(ApiError::InvalidMessage(msg)) => assert_eq!(msg, "value is required"),
                other => panic!("unexpected: {:?}", other),
            }
        }
    }

    #[test]
    fn malformed_json_reports_parser_error() {
        let err = Message::from_request_body(b"{not json").unwrap_err();
        assert!(matches!(err, ApiError::InvalidMessage(ref m) if m.contains("line 1")));
    }

    #[test]
    fn unsaved_message_omits_timestamp() {
        let json = serde_json::to_string(&Message::new("x")).unwrap();
        assert_eq!(json, r#"{"value":"x"}"#);
    }

    #[test]
    fn stamp_uses_milliseconds() {
        let mut m = Message::new("x");
        m.stamp();
        // Anything after 2001-09-09 in milliseconds has 13 digits.
        assert!(m.timestamp > 1_000_000_000_000);
    }
}
