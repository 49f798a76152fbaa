//! Wire encoding and decoding.
//!
//! Every message is one JSON object whose discriminant field (`action` going
//! out, `response` coming in) comes first, followed by the payload fields in
//! a stable order. Payload fields are produced and consumed by the same serde
//! derives, so the per-field rename rules are symmetric by construction.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{OrthoError, Result};

use super::{Action, ActionKind, AnyAction, Response, ResponseKind};

/// Field carrying the discriminant of outbound messages.
pub const ACTION_FIELD: &str = "action";

/// Field carrying the discriminant of inbound messages.
pub const RESPONSE_FIELD: &str = "response";

/// Why an inbound message could not be decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeFailure {
    #[error("not valid JSON: {0}")]
    InvalidJson(String),

    #[error("not a JSON object")]
    NotAnObject,

    #[error("missing or non-string `{0}` field")]
    MissingDiscriminant(&'static str),

    #[error("unrecognised discriminant `{0}`")]
    UnknownDiscriminant(String),

    #[error("invalid `{kind}` fields: {reason}")]
    InvalidFields { kind: &'static str, reason: String },
}

/// An inbound message that failed to decode, with the text that caused it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot decode message: {failure}")]
pub struct DecodeError {
    raw: String,
    failure: DecodeFailure,
}

impl DecodeError {
    // ---
    pub fn new(raw: impl Into<String>, failure: DecodeFailure) -> Self {
        Self {
            raw: raw.into(),
            failure,
        }
    }

    /// The text exactly as it arrived.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn failure(&self) -> &DecodeFailure {
        &self.failure
    }
}

/// Discriminant plus payload, serialized with the discriminant first.
struct Frame<'a> {
    tag_field: &'static str,
    tag: &'static str,
    body: &'a Map<String, Value>,
}

impl Serialize for Frame<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        // ---
        let mut map = serializer.serialize_map(Some(self.body.len() + 1))?;
        map.serialize_entry(self.tag_field, self.tag)?;
        for (field, value) in self.body {
            map.serialize_entry(field, value)?;
        }
        map.end()
    }
}

fn write_frame(
    tag_field: &'static str,
    tag: &'static str,
    body: serde_json::Result<Value>,
) -> Result<String> {
    // ---
    let encoding_error = |reason: String| OrthoError::Encoding {
        action: tag,
        reason,
    };

    let body = match body.map_err(|err| encoding_error(err.to_string()))? {
        Value::Object(body) => body,
        other => {
            return Err(encoding_error(format!(
                "payload is not a JSON object: {other}"
            )))
        }
    };

    serde_json::to_string(&Frame {
        tag_field,
        tag,
        body: &body,
    })
    .map_err(|err| encoding_error(err.to_string()))
}

/// Split raw text into its discriminant and remaining payload fields.
fn read_frame(raw: &str, tag_field: &'static str) -> std::result::Result<(String, Value), DecodeError> {
    // ---
    let value: Value = serde_json::from_str(raw)
        .map_err(|err| DecodeError::new(raw, DecodeFailure::InvalidJson(err.to_string())))?;

    let mut body = match value {
        Value::Object(body) => body,
        _ => return Err(DecodeError::new(raw, DecodeFailure::NotAnObject)),
    };

    match body.remove(tag_field) {
        Some(Value::String(tag)) => Ok((tag, Value::Object(body))),
        _ => Err(DecodeError::new(
            raw,
            DecodeFailure::MissingDiscriminant(tag_field),
        )),
    }
}

/// Encode a typed action into its wire text.
///
/// # Errors
///
/// Returns [`OrthoError::Encoding`] only if the action's payload does not
/// serialize to a JSON object, which no action in this crate does.
pub fn encode<A: Action>(action: &A) -> Result<String> {
    // ---
    write_frame(ACTION_FIELD, A::KIND.as_str(), serde_json::to_value(action))
}

/// Encode any action into its wire text.
///
/// # Errors
///
/// See [`encode`].
pub fn encode_any(action: &AnyAction) -> Result<String> {
    // ---
    write_frame(ACTION_FIELD, action.kind().as_str(), action.body_value())
}

/// Encode a response into its wire text, as the device would send it.
///
/// # Errors
///
/// See [`encode`].
pub fn encode_response(response: &Response) -> Result<String> {
    // ---
    write_frame(RESPONSE_FIELD, response.kind().as_str(), response.body_value())
}

/// Decode inbound text into exactly one response variant.
///
/// # Errors
///
/// Returns a [`DecodeError`] carrying the raw text when the text is not a JSON
/// object, the `response` field is absent or unrecognised, or the payload does
/// not fit the matched variant.
pub fn decode(raw: &str) -> std::result::Result<Response, DecodeError> {
    // ---
    let (tag, body) = read_frame(raw, RESPONSE_FIELD)?;

    let kind = ResponseKind::from_wire(&tag)
        .ok_or_else(|| DecodeError::new(raw, DecodeFailure::UnknownDiscriminant(tag)))?;

    Response::from_body(kind, body).map_err(|err| {
        DecodeError::new(
            raw,
            DecodeFailure::InvalidFields {
                kind: kind.as_str(),
                reason: err.to_string(),
            },
        )
    })
}

/// Decode outbound text back into an action, as the device would read it.
///
/// # Errors
///
/// Same classification as [`decode`], applied to the `action` field.
pub fn decode_action(raw: &str) -> std::result::Result<AnyAction, DecodeError> {
    // ---
    let (tag, body) = read_frame(raw, ACTION_FIELD)?;

    let kind = ActionKind::from_wire(&tag)
        .ok_or_else(|| DecodeError::new(raw, DecodeFailure::UnknownDiscriminant(tag)))?;

    AnyAction::from_body(kind, body).map_err(|err| {
        DecodeError::new(
            raw,
            DecodeFailure::InvalidFields {
                kind: kind.as_str(),
                reason: err.to_string(),
            },
        )
    })
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::protocol::*;
    use std::time::Duration;
    use url::Url;

    const GLOBAL_JOINED: &str = r#"{
        "response": "global_joined",
        "latest_revision": "0.9.18",
        "mac": "544a1x279dxx",
        "orthocloud_base_url": "",
        "palette": {"bg_colors": [935022], "fg_colors": [1644825], "name": "colors"},
        "protocol_major_version": 0,
        "protocol_minor_version": 4,
        "services": [],
        "ssid": "some_SSID",
        "state": []
    }"#;

    fn every_action() -> Vec<AnyAction> {
        // ---
        vec![
            GlobalJoin::new(ProtocolVersion::CURRENT).into(),
            GroupJoin::new(3, "guest", true).into(),
            SpeakerPing::new(7).into(),
            ChangeVolume { amount: -5 }.into(),
            SetVolume::new(42).into(),
            SeekTrack {
                time: Duration::from_millis(61_250),
            }
            .into(),
            StartPlayback {}.into(),
            StopPlayback {}.into(),
            SkipTrackToNext {}.into(),
            SkipTrackToPrev {}.into(),
            SetBassBoost { enabled: true }.into(),
            SetTrebleBoost { enabled: false }.into(),
            SetMidBoost { enabled: true }.into(),
            PlayTestSound {
                mac: "544a16279d01".into(),
            }
            .into(),
            SetInputSource { source: 2 }.into(),
            SetClientColor { color_index: 4 }.into(),
            GetClientInfo {
                uid: "remote-1".into(),
            }
            .into(),
            PlaylistGetTracks {
                revision: 12,
                items: 20,
                start: 40,
            }
            .into(),
            PlaylistAddUrl {
                url: Url::parse("https://radio.example.com/live.mp3").unwrap(),
            }
            .into(),
            SetMuteState {
                mac: "544a16279d01".into(),
                muted: true,
            }
            .into(),
            SetChannel {
                channel: Channel::Left,
                mac: "544a16279d01".into(),
            }
            .into(),
            MoveToNewGroup {
                group_name: "Kitchen".into(),
                mac: "544a16279d01".into(),
            }
            .into(),
            MoveToExistingGroup {
                group_id: "g-2".into(),
                mac: "544a16279d01".into(),
            }
            .into(),
            SetGroupName {
                group_id: "g-2".into(),
                group_name: "Living room".into(),
            }
            .into(),
            FactoryReset {}.into(),
        ]
    }

    #[test]
    fn test_every_kind_covered() {
        // ---
        let kinds: Vec<ActionKind> = every_action().iter().map(AnyAction::kind).collect();
        assert_eq!(kinds, ActionKind::ALL);
    }

    #[test]
    fn test_round_trip_every_action() {
        // ---
        for action in every_action() {
            let raw = encode_any(&action).expect("encoding is total");
            let value: Value = serde_json::from_str(&raw).unwrap();
            assert_eq!(value[ACTION_FIELD], action.kind().as_str(), "{raw}");
            assert!(raw.starts_with(&format!(r#"{{"action":"{}""#, action.kind())));

            let back = decode_action(&raw).unwrap();
            assert_eq!(back, action, "{raw}");
        }
    }

    #[test]
    fn test_set_volume_wire_shape() {
        // ---
        let raw = encode(&SetVolume::new(42)).unwrap();
        assert_eq!(raw, r#"{"action":"group_set_volume","vol":42}"#);
    }

    #[test]
    fn test_global_join_wire_shape() {
        // ---
        let raw = encode(&GlobalJoin::new(ProtocolVersion { major: 0, minor: 4 })).unwrap();
        assert_eq!(
            raw,
            r#"{"action":"global_join","protocol_major_version":0,"protocol_minor_version":4}"#
        );
    }

    #[test]
    fn test_unit_actions_carry_only_discriminant() {
        // ---
        assert_eq!(encode(&StartPlayback {}).unwrap(), r#"{"action":"playback_start"}"#);
        assert_eq!(encode(&FactoryReset {}).unwrap(), r#"{"action":"factory_reset"}"#);
    }

    #[test]
    fn test_renamed_fields() {
        // ---
        let raw = encode(&PlaylistGetTracks {
            revision: 3,
            items: 10,
            start: 0,
        })
        .unwrap();
        assert_eq!(
            raw,
            r#"{"action":"playlist_get_tracks","list_revision":3,"num_items":10,"start_index":0}"#
        );

        let raw = encode(&SetClientColor { color_index: 5 }).unwrap();
        assert_eq!(raw, r#"{"action":"client_set_color","color_index":5}"#);
    }

    #[test]
    fn test_composite_field_encodings() {
        // ---
        let raw = encode(&SeekTrack {
            time: Duration::from_secs(90),
        })
        .unwrap();
        assert_eq!(raw, r#"{"action":"track_seek","time":90.0}"#);

        let raw = encode(&SetChannel {
            channel: Channel::Right,
            mac: "m".into(),
        })
        .unwrap();
        assert_eq!(raw, r#"{"action":"speaker_set_channel","channel":2,"mac":"m"}"#);

        let raw = encode(&PlaylistAddUrl {
            url: Url::parse("http://example.com/a b.mp3").unwrap(),
        })
        .unwrap();
        assert_eq!(
            raw,
            r#"{"action":"playlist_add_url","url":"http://example.com/a%20b.mp3"}"#
        );
    }

    #[test]
    fn test_seek_beyond_limit_is_clamped_or_rejected() {
        // ---
        let clamped = SeekTrack::new(Duration::from_secs(u64::MAX));
        assert_eq!(clamped.time, SeekTrack::MAX_TIME);

        let raw = encode(&clamped).unwrap();
        assert_eq!(
            decode_action(&raw).unwrap(),
            AnyAction::SeekTrack(clamped)
        );

        let res = encode(&SeekTrack {
            time: Duration::from_secs(u64::MAX),
        });
        assert!(matches!(
            res,
            Err(OrthoError::Encoding {
                action: "track_seek",
                ..
            })
        ));
    }

    #[test]
    fn test_decode_global_joined() {
        // ---
        let response = decode(GLOBAL_JOINED).unwrap();
        assert_eq!(response.kind(), ResponseKind::GlobalJoined);

        let joined = GlobalJoined::try_from(response).unwrap();
        assert_eq!(joined.mac, "544a1x279dxx");
        assert_eq!(joined.ssid, "some_SSID");
        assert_eq!(joined.protocol_major_version, 0);
        assert_eq!(joined.protocol_minor_version, 4);
        assert_eq!(joined.palette.len(), 1);
        assert_eq!(joined.palette.name(), "colors");
        assert!(joined.services.is_empty());
        assert!(joined.state.is_empty());
        assert_eq!(joined.latest_revision.as_deref(), Some("0.9.18"));
    }

    #[test]
    fn test_response_round_trip() {
        // ---
        let original = decode(GLOBAL_JOINED).unwrap();
        let raw = encode_response(&original).unwrap();
        assert!(raw.starts_with(r#"{"response":"global_joined""#));
        assert_eq!(decode(&raw).unwrap(), original);

        let pong: Response = SpeakerPong { value: 9 }.into();
        let raw = encode_response(&pong).unwrap();
        assert_eq!(raw, r#"{"response":"speaker_pong","value":9}"#);
    }

    #[test]
    fn test_unknown_discriminant() {
        // ---
        let raw = r#"{"response": "unknown_kind"}"#;
        let err = decode(raw).unwrap_err();
        assert_eq!(
            err.failure(),
            &DecodeFailure::UnknownDiscriminant("unknown_kind".into())
        );
        assert_eq!(err.raw(), raw);
    }

    #[test]
    fn test_decode_failures_classified() {
        // ---
        let cases = [
            ("not json", "InvalidJson"),
            ("[1, 2]", "NotAnObject"),
            (r#"{"value": 1}"#, "MissingDiscriminant"),
            (r#"{"response": 5}"#, "MissingDiscriminant"),
            (r#"{"response": "speaker_pong"}"#, "InvalidFields"),
            (r#"{"response": "speaker_pong", "value": "x"}"#, "InvalidFields"),
        ];

        for (raw, expected) in cases {
            let err = decode(raw).unwrap_err();
            let actual = match err.failure() {
                DecodeFailure::InvalidJson(_) => "InvalidJson",
                DecodeFailure::NotAnObject => "NotAnObject",
                DecodeFailure::MissingDiscriminant(_) => "MissingDiscriminant",
                DecodeFailure::UnknownDiscriminant(_) => "UnknownDiscriminant",
                DecodeFailure::InvalidFields { .. } => "InvalidFields",
            };
            assert_eq!(actual, expected, "{raw}");
        }
    }

    #[test]
    fn test_palette_length_mismatch_is_decode_error() {
        // ---
        let raw = GLOBAL_JOINED.replace("[935022]", "[935022, 18479]");
        let err = decode(&raw).unwrap_err();
        assert!(matches!(
            err.failure(),
            DecodeFailure::InvalidFields {
                kind: "global_joined",
                ..
            }
        ));
    }

    #[test]
    fn test_action_field_is_not_a_response() {
        // ---
        let raw = encode(&SetVolume::new(1)).unwrap();
        let err = decode(&raw).unwrap_err();
        assert_eq!(err.failure(), &DecodeFailure::MissingDiscriminant(RESPONSE_FIELD));
    }
}
