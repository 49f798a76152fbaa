//! Inbound responses.
//!
//! Replies to requests and unsolicited pushes share one vocabulary; whether a
//! given message answers a pending call is decided by the correlator, not here.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::kinds::wire_kinds;
use super::{CorrelationToken, Palette};

/// Payload of one inbound response variant.
pub trait ResponseBody:
    Serialize
    + DeserializeOwned
    + Clone
    + fmt::Debug
    + Into<Response>
    + TryFrom<Response, Error = Response>
    + Send
    + 'static
{
    /// The discriminant read from the `response` field.
    const KIND: ResponseKind;
}

wire_kinds! {
    /// Discriminant of every inbound response.
    pub enum ResponseKind;

    /// Any inbound response.
    enum Response: ResponseBody;

    {
        GlobalJoined => "global_joined",
        GroupJoined => "group_joined",
        SpeakerPong => "speaker_pong",
        ClientInfo => "client_info",
        PlaylistTracks => "playlist_tracks",
        GroupVolumeChanged => "group_volume_changed",
        PlaylistChanged => "playlist_changed",
    }
}

impl Response {
    /// Value echoed from the request, when this variant carries one.
    pub fn correlation_token(&self) -> Option<CorrelationToken> {
        // ---
        match self {
            Response::SpeakerPong(pong) => Some(CorrelationToken(pong.value)),
            _ => None,
        }
    }
}

/// Reply to `global_join`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalJoined {
    pub protocol_major_version: u32,
    pub protocol_minor_version: u32,
    pub palette: Palette,
    pub mac: String,
    pub ssid: String,
    #[serde(default)]
    pub services: Vec<Value>,
    #[serde(default)]
    pub state: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_revision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orthocloud_base_url: Option<String>,
}

/// Reply to `group_join`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupJoined {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(default)]
    pub state: Vec<Value>,
}

/// Reply to `speaker_ping`, echoing its `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerPong {
    pub value: i64,
}

/// Reply to `client_get_info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_index: Option<u32>,
}

/// Reply to `playlist_get_tracks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistTracks {
    #[serde(rename = "list_revision")]
    pub revision: i64,
    #[serde(rename = "start_index")]
    pub start: u32,
    #[serde(default)]
    pub tracks: Vec<Value>,
}

/// Pushed when any remote changes the group volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupVolumeChanged {
    #[serde(rename = "vol")]
    pub volume: u32,
}

/// Pushed when the playlist revision changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistChanged {
    #[serde(rename = "list_revision")]
    pub revision: i64,
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_discriminants_unique() {
        // ---
        let tags: HashSet<&str> = ResponseKind::ALL.iter().map(|kind| kind.as_str()).collect();
        assert_eq!(tags.len(), ResponseKind::ALL.len());
    }

    #[test]
    fn test_pong_exposes_token() {
        // ---
        let pong: Response = SpeakerPong { value: 9 }.into();
        assert_eq!(pong.correlation_token(), Some(CorrelationToken(9)));
        assert_eq!(pong.kind(), ResponseKind::SpeakerPong);

        let volume: Response = GroupVolumeChanged { volume: 30 }.into();
        assert_eq!(volume.correlation_token(), None);
    }

    #[test]
    fn test_typed_extraction() {
        // ---
        let response: Response = SpeakerPong { value: 1 }.into();
        assert!(ClientInfo::try_from(response.clone()).is_err());
        assert_eq!(SpeakerPong::try_from(response), Ok(SpeakerPong { value: 1 }));
    }
}
