//! Message Codec (C4): JSON wire envelope with a `type` discriminator.
//!
//! Inbound frames are dispatched by peeking at `type` before committing to a
//! concrete struct — the wire format isn't a clean internally-tagged enum
//! (sibling fields vary per type, and the hub may send fields this agent
//! doesn't model), so dispatch mirrors the original source's
//! `data.get("type")` check rather than relying on serde's `#[serde(tag)]`.

use serde::Deserialize;

use super::depth::DepthSnapshot;
use super::order::SignedOrder;
use super::quote::{QuoteRequest, QuoteStatus, RejectReason};

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub config: Option<SessionConfigWire>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SessionConfigWire {
    pub depth_push_interval_ms: Option<u64>,
    pub quote_timeout_ms: Option<u64>,
    pub heartbeat_interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
struct HeartbeatPayload {
    #[serde(default)]
    ping: bool,
    #[serde(default)]
    pong: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct HeartbeatFrame {
    #[serde(default)]
    heartbeat: HeartbeatPayload,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorFrame {
    message: Option<String>,
}

/// A parsed inbound frame.
#[derive(Debug, Clone)]
pub enum Inbound {
    AuthResponse(AuthResponse),
    QuoteRequest(QuoteRequest),
    HeartbeatPing,
    HeartbeatPong,
    Error(Option<String>),
    /// Recognized type with a payload shape we don't act on, or a type the
    /// hub invented that this agent doesn't know. Logged and ignored.
    Unknown(String),
}

/// Parse one inbound text frame. Returns `Err` only on malformed JSON or a
/// known type whose fields don't match the expected shape — callers log and
/// keep reading rather than tearing down the session (§4.4, §7).
pub fn parse_inbound(text: &str) -> Result<Inbound, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let msg_type = value
        .get("type")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    match msg_type.as_str() {
        "auth_response" => Ok(Inbound::AuthResponse(serde_json::from_value(value)?)),
        "quote_request" => Ok(Inbound::QuoteRequest(serde_json::from_value(value)?)),
        "heartbeat" => {
            let frame: HeartbeatFrame = serde_json::from_value(value)?;
            if frame.heartbeat.ping {
                Ok(Inbound::HeartbeatPing)
            } else if frame.heartbeat.pong {
                Ok(Inbound::HeartbeatPong)
            } else {
                Ok(Inbound::Unknown("heartbeat".into()))
            }
        }
        "error" => {
            let frame: ErrorFrame = serde_json::from_value(value)?;
            Ok(Inbound::Error(frame.message))
        }
        other => Ok(Inbound::Unknown(other.to_string())),
    }
}

pub fn quote_response_frame(quote_id: &str, order: &SignedOrder) -> serde_json::Value {
    serde_json::json!({
        "type": "quote_response",
        "quote_id": quote_id,
        "status": QuoteStatus::Success,
        "order": order,
    })
}

pub fn quote_reject_frame(quote_id: &str, reason: RejectReason, message: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "quote_reject",
        "quote_id": quote_id,
        "reason": reason,
        "message": message,
    })
}

pub fn depth_update_frame(snapshot: &DepthSnapshot) -> serde_json::Value {
    let mut value = serde_json::to_value(snapshot).expect("DepthSnapshot always serializes");
    value
        .as_object_mut()
        .expect("DepthSnapshot serializes to an object")
        .insert("type".to_string(), serde_json::json!("depth_update"));
    value
}

pub fn heartbeat_ping_frame(now_ms: u64) -> serde_json::Value {
    serde_json::json!({
        "type": "heartbeat",
        "heartbeat": {"ping": true},
        "timestamp": now_ms,
    })
}

pub fn heartbeat_pong_frame(now_ms: u64) -> serde_json::Value {
    serde_json::json!({
        "type": "heartbeat",
        "heartbeat": {"pong": true},
        "timestamp": now_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::depth::PriceLevel;
    use alloy_primitives::Address;
    use std::str::FromStr;

    #[test]
    fn unknown_type_is_ignored_not_an_error() {
        let msg = parse_inbound(r#"{"type":"something_new","foo":1}"#).unwrap();
        assert!(matches!(msg, Inbound::Unknown(t) if t == "something_new"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse_inbound("not json").is_err());
    }

    #[test]
    fn auth_response_success_round_trips_config() {
        let json = r#"{
            "type": "auth_response",
            "success": true,
            "session_id": "sess-1",
            "config": {
                "depth_push_interval_ms": 250,
                "quote_timeout_ms": 2000,
                "heartbeat_interval_ms": 15000
            }
        }"#;
        match parse_inbound(json).unwrap() {
            Inbound::AuthResponse(resp) => {
                assert!(resp.success);
                assert_eq!(resp.session_id.as_deref(), Some("sess-1"));
                let cfg = resp.config.unwrap();
                assert_eq!(cfg.depth_push_interval_ms, Some(250));
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn heartbeat_ping_frame_round_trips() {
        let frame = heartbeat_ping_frame(123);
        let text = frame.to_string();
        assert!(matches!(parse_inbound(&text).unwrap(), Inbound::HeartbeatPing));
    }

    #[test]
    fn depth_update_frame_has_type_tag() {
        let snapshot = DepthSnapshot {
            chain_id: 56,
            pair_id: "a-b".into(),
            token_a: Address::from_str("0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c").unwrap(),
            token_b: Address::from_str("0x55d398326f99059fF775485246999027B3197955").unwrap(),
            bids: vec![PriceLevel::new(rust_decimal::Decimal::ONE, 1)],
            asks: vec![],
            sequence_id: 0,
            timestamp: 1000,
        };
        let frame = depth_update_frame(&snapshot);
        assert_eq!(frame["type"], "depth_update");
        assert_eq!(frame["sequence_id"], 0);
    }
}
