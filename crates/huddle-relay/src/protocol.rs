//! Wire protocol: one JSON text frame per event, discriminated by `type`.
//!
//! Signal payloads are kept as raw JSON text and never parsed beyond
//! confirming they are well-formed JSON.

use huddle_common::ConnectionId;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::RelayError;

/// Client → server event names.
pub mod events {
    pub const JOIN_CALL: &str = "join-call";
    pub const SIGNAL: &str = "signal";
    pub const CHAT_MESSAGE: &str = "chat-message";
}

/// A parsed client event.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    JoinCall {
        room_id: String,
        display_name: Option<String>,
    },
    Signal {
        target: ConnectionId,
        payload: Box<RawValue>,
    },
    ChatMessage {
        text: String,
        display_name: Option<String>,
    },
}

/// Flat frame shape shared by every client event.
///
/// Internally tagged enums buffer their content, which `RawValue` cannot be
/// read from, so frames are read into this struct and then checked per kind.
#[derive(Debug, Deserialize)]
struct Frame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(alias = "roomId")]
    room_id: Option<String>,
    #[serde(alias = "username", alias = "sender")]
    display_name: Option<String>,
    target: Option<ConnectionId>,
    payload: Option<Box<RawValue>>,
    text: Option<String>,
}

/// `join-call` arguments may also arrive wrapped in `payload`, either as the
/// bare room id or as an object of the same fields.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JoinPayload {
    Room(String),
    Fields {
        #[serde(alias = "roomId")]
        room_id: Option<String>,
        #[serde(alias = "username")]
        display_name: Option<String>,
    },
}

/// Parse one text frame into a [`ClientEvent`].
pub fn parse_client_event(text: &str) -> Result<ClientEvent, RelayError> {
    let frame: Frame =
        serde_json::from_str(text).map_err(|e| RelayError::Protocol(e.to_string()))?;

    match frame.kind.as_str() {
        events::JOIN_CALL => {
            let (room_id, display_name) = match frame.payload {
                Some(raw) => match serde_json::from_str(raw.get()) {
                    Ok(JoinPayload::Room(room_id)) => (Some(room_id), frame.display_name),
                    Ok(JoinPayload::Fields {
                        room_id,
                        display_name,
                    }) => (
                        room_id.or(frame.room_id),
                        display_name.or(frame.display_name),
                    ),
                    Err(_) => {
                        return Err(RelayError::Protocol(
                            "join-call payload must be a room id or an object".into(),
                        ))
                    }
                },
                None => (frame.room_id, frame.display_name),
            };
            let room_id = required(room_id, "room_id")?;
            if room_id.is_empty() {
                return Err(RelayError::Protocol("room_id must not be empty".into()));
            }
            Ok(ClientEvent::JoinCall {
                room_id,
                display_name: display_name.filter(|n| !n.is_empty()),
            })
        }
        events::SIGNAL => Ok(ClientEvent::Signal {
            target: required(frame.target, "target")?,
            payload: required(frame.payload, "payload")?,
        }),
        events::CHAT_MESSAGE => Ok(ClientEvent::ChatMessage {
            text: required(frame.text, "text")?,
            display_name: frame.display_name.filter(|n| !n.is_empty()),
        }),
        other => Err(RelayError::Protocol(format!("unknown event type `{other}`"))),
    }
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, RelayError> {
    value.ok_or_else(|| RelayError::Protocol(format!("missing field `{field}`")))
}

/// Server → client events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// First frame on every connection: the id the server assigned.
    #[serde(rename = "welcome")]
    Welcome { connection_id: ConnectionId },

    /// Join acknowledgement to the joiner, with members already present.
    #[serde(rename = "joined")]
    Joined {
        room_id: String,
        members: Vec<ConnectionId>,
    },

    /// To existing members: `connection_id` joined; `members` is the full list.
    #[serde(rename = "peer-joined")]
    PeerJoined {
        connection_id: ConnectionId,
        members: Vec<ConnectionId>,
    },

    #[serde(rename = "signal")]
    Signal {
        from: ConnectionId,
        payload: Box<RawValue>,
    },

    #[serde(rename = "chat-message")]
    ChatMessage {
        text: String,
        display_name: String,
        sender: ConnectionId,
    },

    #[serde(rename = "peer-left")]
    PeerLeft { connection_id: ConnectionId },

    #[serde(rename = "error")]
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_join_call() {
        let event =
            parse_client_event(r#"{"type":"join-call","room_id":"abc","display_name":"Alice"}"#)
                .unwrap();
        assert!(matches!(
            event,
            ClientEvent::JoinCall { ref room_id, display_name: Some(ref name) }
                if room_id == "abc" && name == "Alice"
        ));
    }

    #[test]
    fn join_call_accepts_legacy_field_names() {
        let event =
            parse_client_event(r#"{"type":"join-call","roomId":"abc","username":"Bob"}"#).unwrap();
        assert!(matches!(
            event,
            ClientEvent::JoinCall { ref room_id, display_name: Some(ref name) }
                if room_id == "abc" && name == "Bob"
        ));
    }

    #[test]
    fn join_call_without_name() {
        let event = parse_client_event(r#"{"type":"join-call","room_id":"abc"}"#).unwrap();
        assert!(matches!(event, ClientEvent::JoinCall { display_name: None, .. }));
    }

    #[test]
    fn join_call_rejects_empty_room() {
        let err = parse_client_event(r#"{"type":"join-call","room_id":""}"#).unwrap_err();
        assert!(matches!(err, RelayError::Protocol(_)));
    }

    #[test]
    fn signal_payload_is_kept_verbatim() {
        let frame = r#"{"type":"signal","target":"peer-1","payload":{"sdp": {"type":"offer","sdp":"v=0"},  "z":1}}"#;
        let event = parse_client_event(frame).unwrap();
        match event {
            ClientEvent::Signal { target, payload } => {
                assert_eq!(target.as_str(), "peer-1");
                assert_eq!(
                    payload.get(),
                    r#"{"sdp": {"type":"offer","sdp":"v=0"},  "z":1}"#
                );
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn signal_without_target_is_protocol_error() {
        let err = parse_client_event(r#"{"type":"signal","payload":"x"}"#).unwrap_err();
        assert!(err.to_string().contains("target"));
    }

    #[test]
    fn parses_chat_message_with_sender_alias() {
        let event =
            parse_client_event(r#"{"type":"chat-message","text":"hi","sender":"Alice"}"#).unwrap();
        assert!(matches!(
            event,
            ClientEvent::ChatMessage { ref text, display_name: Some(ref name) }
                if text == "hi" && name == "Alice"
        ));
    }

    #[test]
    fn chat_message_without_name() {
        let event = parse_client_event(r#"{"type":"chat-message","text":"hi"}"#).unwrap();
        assert!(matches!(event, ClientEvent::ChatMessage { display_name: None, .. }));
    }

    #[test]
    fn join_call_accepts_bare_room_payload() {
        let event = parse_client_event(r#"{"type":"join-call","payload":"standup"}"#).unwrap();
        assert!(matches!(
            event,
            ClientEvent::JoinCall { ref room_id, display_name: None } if room_id == "standup"
        ));
    }

    #[test]
    fn join_call_accepts_object_payload() {
        let event = parse_client_event(
            r#"{"type":"join-call","payload":{"roomId":"standup","username":"Bob"}}"#,
        )
        .unwrap();
        assert!(matches!(
            event,
            ClientEvent::JoinCall { ref room_id, display_name: Some(ref name) }
                if room_id == "standup" && name == "Bob"
        ));
    }

    #[test]
    fn join_call_rejects_numeric_payload() {
        let err = parse_client_event(r#"{"type":"join-call","payload":7}"#).unwrap_err();
        assert!(matches!(err, RelayError::Protocol(_)));
    }

    #[test]
    fn unknown_type_is_protocol_error() {
        let err = parse_client_event(r#"{"type":"mute"}"#).unwrap_err();
        assert!(err.to_string().contains("mute"));
    }

    #[test]
    fn garbage_is_protocol_error() {
        assert!(matches!(
            parse_client_event("not json"),
            Err(RelayError::Protocol(_))
        ));
    }

    #[test]
    fn server_event_tags() {
        let json = serde_json::to_string(&ServerEvent::PeerLeft {
            connection_id: ConnectionId::from("a"),
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"peer-left","connection_id":"a"}"#);

        let json = serde_json::to_string(&ServerEvent::PeerJoined {
            connection_id: ConnectionId::from("b"),
            members: vec![ConnectionId::from("a"), ConnectionId::from("b")],
        })
        .unwrap();
        assert_eq!(
            json,
            r#"{"type":"peer-joined","connection_id":"b","members":["a","b"]}"#
        );
    }

    #[test]
    fn outbound_signal_embeds_raw_payload() {
        let payload = RawValue::from_string(r#"{"ice":  "cand"}"#.to_string()).unwrap();
        let json = serde_json::to_string(&ServerEvent::Signal {
            from: ConnectionId::from("a"),
            payload,
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"signal","from":"a","payload":{"ice":  "cand"}}"#);
    }
}
