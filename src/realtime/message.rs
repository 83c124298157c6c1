use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event types seen by listeners
pub mod events {
    pub const RESERVE_UPDATE: &str = "reserve_update";
    pub const PRICE_UPDATE: &str = "price_update";
    pub const ATTESTATION_UPDATE: &str = "attestation_update";
    /// Dispatched locally once the socket is open and authenticated
    pub const WS_OPEN: &str = "ws_open";
    /// Dispatched locally when an open socket closes
    pub const WS_CLOSE: &str = "ws_close";
}

/// Messages sent from client to server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Token travels in the body, never in the connection URL
    Authenticate { token: String },
    Subscribe { channels: Vec<String> },
}

impl ClientMessage {
    pub fn authenticate(token: impl Into<String>) -> Self {
        Self::Authenticate {
            token: token.into(),
        }
    }

    pub fn subscribe(channels: Vec<String>) -> Self {
        Self::Subscribe { channels }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Message received from the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: Value,
}

impl InboundMessage {
    pub fn new(event_type: impl Into<String>, data: Value) -> Self {
        Self {
            event_type: event_type.into(),
            data,
        }
    }

    /// Parse a text frame; `data` defaults to null when absent
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_authenticate_wire_format() {
        let json = ClientMessage::authenticate("tok-1").to_json().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value, json!({"type": "authenticate", "token": "tok-1"}));
    }

    #[test]
    fn test_subscribe_wire_format() {
        let msg = ClientMessage::subscribe(vec!["reserve_update".into(), "price_update".into()]);
        let value: Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({"type": "subscribe", "channels": ["reserve_update", "price_update"]})
        );
    }

    #[test]
    fn test_parse_inbound() {
        let msg = InboundMessage::parse(r#"{"type":"price_update","data":{"pair":"EURUSD","price":1.08}}"#)
            .unwrap();
        assert_eq!(msg.event_type, events::PRICE_UPDATE);
        assert_eq!(msg.data["pair"], "EURUSD");
    }

    #[test]
    fn test_parse_without_data_defaults_to_null() {
        let msg = InboundMessage::parse(r#"{"type":"attestation_update"}"#).unwrap();
        assert!(msg.data.is_null());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(InboundMessage::parse("not json").is_err());
        assert!(InboundMessage::parse(r#"{"data": 1}"#).is_err());
    }
}
