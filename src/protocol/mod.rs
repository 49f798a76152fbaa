//! Message model and wire codec for the speaker protocol
//!
//! This module defines the closed action and response vocabularies, the
//! request-to-response binding, and the JSON wire format.
mod kinds;

mod action;
mod codec;
mod codes;
mod correlation;
mod palette;
mod response;

pub use action::{
    // ---
    Action,
    ActionKind,
    AnyAction,
    ChangeVolume,
    Channel,
    FactoryReset,
    GetClientInfo,
    GlobalJoin,
    GroupJoin,
    MoveToExistingGroup,
    MoveToNewGroup,
    PlayTestSound,
    PlaylistAddUrl,
    PlaylistGetTracks,
    ProtocolVersion,
    Request,
    SeekTrack,
    SetBassBoost,
    SetChannel,
    SetClientColor,
    SetGroupName,
    SetInputSource,
    SetMidBoost,
    SetMuteState,
    SetTrebleBoost,
    SetVolume,
    SkipTrackToNext,
    SkipTrackToPrev,
    SpeakerPing,
    StartPlayback,
    StopPlayback,
};
pub use codec::{
    // ---
    decode,
    decode_action,
    encode,
    encode_any,
    encode_response,
    DecodeError,
    DecodeFailure,
    ACTION_FIELD,
    RESPONSE_FIELD,
};
pub(crate) use correlation::CallIds;
pub use correlation::{CallId, CorrelationToken};
pub use palette::{Palette, PaletteColor, PaletteMismatch, Rgb};
pub use response::{
    // ---
    ClientInfo,
    GlobalJoined,
    GroupJoined,
    GroupVolumeChanged,
    PlaylistChanged,
    PlaylistTracks,
    Response,
    ResponseBody,
    ResponseKind,
    SpeakerPong,
};
