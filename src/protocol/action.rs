//! Outbound actions.
//!
//! Each action is a plain struct whose fields are the payload of one command.
//! Wire field names default to the Rust field names; the few that differ are
//! declared with `#[serde(rename = "...")]` and are therefore applied
//! identically when encoding and decoding.
//!
//! Actions that expect a reply also implement [`Request`], which fixes the
//! one response type the reply may take.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

use super::codes;
use super::kinds::wire_kinds;
use super::response::{ClientInfo, GlobalJoined, GroupJoined, PlaylistTracks, SpeakerPong};
use super::{CorrelationToken, ResponseBody};

/// An outbound command with a fixed wire discriminant.
pub trait Action:
    Serialize
    + DeserializeOwned
    + Clone
    + fmt::Debug
    + Into<AnyAction>
    + TryFrom<AnyAction, Error = AnyAction>
    + Send
    + Sync
    + 'static
{
    /// The discriminant written to the `action` field.
    const KIND: ActionKind;
}

/// An action that expects exactly one response variant in reply.
pub trait Request: Action {
    /// The only response shape that may satisfy this request.
    type Response: ResponseBody;

    /// Value echoed back in the reply, when the request carries one.
    fn correlation_token(&self) -> Option<CorrelationToken> {
        None
    }
}

wire_kinds! {
    /// Discriminant of every outbound action.
    pub enum ActionKind;

    /// Any outbound action, for code that handles the whole vocabulary
    /// (a simulated device, logging, replay).
    enum AnyAction: Action;

    {
        GlobalJoin => "global_join",
        GroupJoin => "group_join",
        SpeakerPing => "speaker_ping",
        ChangeVolume => "group_change_volume",
        SetVolume => "group_set_volume",
        SeekTrack => "track_seek",
        StartPlayback => "playback_start",
        StopPlayback => "playback_stop",
        SkipTrackToNext => "track_skip_to_next",
        SkipTrackToPrev => "track_skip_to_prev",
        SetBassBoost => "group_set_eq_bass_boost",
        SetTrebleBoost => "group_eq_treble_boost",
        SetMidBoost => "group_set_eq_mid_boost",
        PlayTestSound => "speaker_play_test_sound",
        SetInputSource => "group_set_input_source",
        SetClientColor => "client_set_color",
        GetClientInfo => "client_get_info",
        PlaylistGetTracks => "playlist_get_tracks",
        PlaylistAddUrl => "playlist_add_url",
        SetMuteState => "speaker_set_mute_state",
        SetChannel => "speaker_set_channel",
        MoveToNewGroup => "speaker_move_to_new_group",
        MoveToExistingGroup => "speaker_move_to_existing_group",
        SetGroupName => "group_set_name",
        FactoryReset => "factory_reset",
    }
}

/// Protocol version announced in `global_join`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProtocolVersion {
    pub major: u32,
    pub minor: u32,
}

impl ProtocolVersion {
    /// The version this crate speaks.
    pub const CURRENT: ProtocolVersion = ProtocolVersion { major: 0, minor: 4 };
}

impl Default for ProtocolVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Output channel of a single speaker, encoded as an integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Stereo,
    Left,
    Right,
}

impl Channel {
    // ---
    pub const fn code(self) -> u8 {
        match self {
            Channel::Stereo => 0,
            Channel::Left => 1,
            Channel::Right => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Channel::Stereo),
            1 => Some(Channel::Left),
            2 => Some(Channel::Right),
            _ => None,
        }
    }
}

// --------------------
// System
// --------------------

/// Join the speaker system. Must be the first action on a new connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalJoin {
    pub protocol_major_version: u32,
    pub protocol_minor_version: u32,
}

impl GlobalJoin {
    pub fn new(version: ProtocolVersion) -> Self {
        Self {
            protocol_major_version: version.major,
            protocol_minor_version: version.minor,
        }
    }

    pub fn version(&self) -> ProtocolVersion {
        ProtocolVersion {
            major: self.protocol_major_version,
            minor: self.protocol_minor_version,
        }
    }
}

impl Request for GlobalJoin {
    type Response = GlobalJoined;
}

/// Let this remote join the group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupJoin {
    /// Index into the palette announced in `global_joined`.
    pub color_index: u32,
    /// `guest` or a Teenage ID user name.
    pub name: String,
    /// Whether to receive realtime updates (e.g. track position).
    pub realtime_data: bool,
    /// Unique identifier of this remote.
    pub uid: String,
}

impl GroupJoin {
    /// Join with a freshly generated remote `uid`.
    pub fn new(color_index: u32, name: impl Into<String>, realtime_data: bool) -> Self {
        // ---
        Self {
            color_index,
            name: name.into(),
            realtime_data,
            uid: Uuid::new_v4().to_string(),
        }
    }

    /// Join as `guest` without realtime updates.
    pub fn guest(color_index: u32) -> Self {
        Self::new(color_index, "guest", false)
    }
}

impl Request for GroupJoin {
    type Response = GroupJoined;
}

/// Keep-alive. The device echoes `value` in its `speaker_pong`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerPing {
    pub value: i64,
}

impl SpeakerPing {
    pub fn new(value: i64) -> Self {
        Self { value }
    }
}

impl Request for SpeakerPing {
    type Response = SpeakerPong;

    fn correlation_token(&self) -> Option<CorrelationToken> {
        Some(CorrelationToken(self.value))
    }
}

/// Factory reset the speaker system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryReset {}

// --------------------
// Volume and playback
// --------------------

/// Change the group volume by a signed amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeVolume {
    pub amount: i32,
}

/// Set the absolute group volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetVolume {
    #[serde(rename = "vol")]
    pub volume: u32,
}

impl SetVolume {
    pub fn new(volume: u32) -> Self {
        Self { volume }
    }
}

/// Seek within the current track.
///
/// `time` must not exceed [`SeekTrack::MAX_TIME`]; encoding a larger value
/// fails with `OrthoError::Encoding`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeekTrack {
    #[serde(with = "codes::seconds")]
    pub time: Duration,
}

impl SeekTrack {
    /// Largest position the wire encoding carries.
    pub const MAX_TIME: Duration = codes::seconds::MAX;

    /// Seek to `time`, clamped to [`MAX_TIME`](Self::MAX_TIME).
    pub fn new(time: Duration) -> Self {
        Self {
            time: time.min(Self::MAX_TIME),
        }
    }
}

/// Equivalent to pressing Play.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartPlayback {}

/// Equivalent to pressing Stop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopPlayback {}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipTrackToNext {}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipTrackToPrev {}

// --------------------
// Equalizer and input
// --------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetBassBoost {
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetTrebleBoost {
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetMidBoost {
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetInputSource {
    pub source: u32,
}

// --------------------
// Remote
// --------------------

/// Set the colour of this remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetClientColor {
    pub color_index: u32,
}

/// Fetch information about a remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetClientInfo {
    pub uid: String,
}

impl Request for GetClientInfo {
    type Response = ClientInfo;
}

// --------------------
// Playlist
// --------------------

/// Request a page of the playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistGetTracks {
    #[serde(rename = "list_revision")]
    pub revision: i64,
    #[serde(rename = "num_items")]
    pub items: u32,
    #[serde(rename = "start_index")]
    pub start: u32,
}

impl Request for PlaylistGetTracks {
    type Response = PlaylistTracks;
}

/// Append a URL to the playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistAddUrl {
    #[serde(with = "codes::absolute_url")]
    pub url: Url,
}

// --------------------
// Speakers and groups
// --------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayTestSound {
    pub mac: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetMuteState {
    pub mac: String,
    pub muted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetChannel {
    #[serde(with = "codes::channel_code")]
    pub channel: Channel,
    pub mac: String,
}

/// Move a speaker into a new group with the given name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveToNewGroup {
    pub group_name: String,
    pub mac: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveToExistingGroup {
    pub group_id: String,
    pub mac: String,
}

/// Rename a speaker group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetGroupName {
    pub group_id: String,
    pub group_name: String,
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::protocol::ResponseKind;
    use std::collections::HashSet;

    fn reply_kind<R: Request>() -> ResponseKind {
        R::Response::KIND
    }

    #[test]
    fn test_discriminants_unique() {
        // ---
        let tags: HashSet<&str> = ActionKind::ALL.iter().map(|kind| kind.as_str()).collect();
        assert_eq!(tags.len(), ActionKind::ALL.len());
        assert_eq!(ActionKind::ALL.len(), 25);
    }

    #[test]
    fn test_from_wire_inverts_as_str() {
        // ---
        for kind in ActionKind::ALL {
            assert_eq!(ActionKind::from_wire(kind.as_str()), Some(*kind));
        }
        assert_eq!(ActionKind::from_wire("GLOBAL_JOIN"), None);
    }

    #[test]
    fn test_client_info_has_own_discriminant() {
        // ---
        assert_ne!(GetClientInfo::KIND.as_str(), SetClientColor::KIND.as_str());
        assert_eq!(GetClientInfo::KIND.as_str(), "client_get_info");
    }

    #[test]
    fn test_request_response_binding() {
        // ---
        assert_eq!(reply_kind::<GlobalJoin>(), ResponseKind::GlobalJoined);
        assert_eq!(reply_kind::<GroupJoin>(), ResponseKind::GroupJoined);
        assert_eq!(reply_kind::<SpeakerPing>(), ResponseKind::SpeakerPong);
        assert_eq!(reply_kind::<GetClientInfo>(), ResponseKind::ClientInfo);
        assert_eq!(reply_kind::<PlaylistGetTracks>(), ResponseKind::PlaylistTracks);
    }

    #[test]
    fn test_only_ping_carries_token() {
        // ---
        assert_eq!(
            SpeakerPing::new(7).correlation_token(),
            Some(CorrelationToken(7))
        );
        assert_eq!(GlobalJoin::new(ProtocolVersion::CURRENT).correlation_token(), None);
        assert_eq!(GroupJoin::guest(0).correlation_token(), None);
    }

    #[test]
    fn test_group_join_uids_differ() {
        // ---
        let a = GroupJoin::guest(1);
        let b = GroupJoin::guest(1);
        assert_ne!(a.uid, b.uid);
        assert_eq!(a.name, "guest");
        assert!(!a.realtime_data);
    }

    #[test]
    fn test_channel_codes() {
        // ---
        for channel in [Channel::Stereo, Channel::Left, Channel::Right] {
            assert_eq!(Channel::from_code(channel.code()), Some(channel));
        }
        assert_eq!(Channel::from_code(3), None);
    }

    #[test]
    fn test_any_action_round_trip() {
        // ---
        let any: AnyAction = SetVolume::new(42).into();
        assert_eq!(any.kind(), ActionKind::SetVolume);
        assert_eq!(SetVolume::try_from(any), Ok(SetVolume::new(42)));

        let any: AnyAction = StartPlayback {}.into();
        assert!(SetVolume::try_from(any).is_err());
    }

    #[test]
    fn test_protocol_version() {
        // ---
        let join = GlobalJoin::new(ProtocolVersion::CURRENT);
        assert_eq!(join.version().to_string(), "0.4");
        assert_eq!(ProtocolVersion::default(), ProtocolVersion::CURRENT);
    }
}
