//! Primitive wire encodings for composite field types.
//!
//! Each module is attached to a field with `#[serde(with = "...")]`, so the
//! encoder and decoder always apply the same rule to that field.

use super::Channel;

/// `Duration` as numeric seconds (fractional part kept).
///
/// Values above [`seconds::MAX`] are rejected in both directions, so every
/// value that encodes also decodes.
pub(crate) mod seconds {
    // ---
    use serde::de::Error as _;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    /// Largest encodable duration (about 136 years).
    pub const MAX: Duration = Duration::from_secs(u32::MAX as u64);

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        // ---
        if *value > MAX {
            return Err(S::Error::custom(format!(
                "time {}s exceeds {}s",
                value.as_secs(),
                MAX.as_secs()
            )));
        }
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        // ---
        let secs = f64::deserialize(deserializer)?;
        let time = Duration::try_from_secs_f64(secs)
            .map_err(|err| D::Error::custom(format!("invalid time {secs}: {err}")))?;
        if time > MAX {
            return Err(D::Error::custom(format!("time {secs}s exceeds {}s", MAX.as_secs())));
        }
        Ok(time)
    }
}

/// [`Channel`] as its integer code.
pub(crate) mod channel_code {
    // ---
    use super::Channel;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Channel, serializer: S) -> Result<S::Ok, S::Error> {
        // ---
        serializer.serialize_u8(value.code())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Channel, D::Error> {
        // ---
        let code = u8::deserialize(deserializer)?;
        Channel::from_code(code).ok_or_else(|| D::Error::custom(format!("unknown channel code {code}")))
    }
}

/// `Url` as its absolute string form.
pub(crate) mod absolute_url {
    // ---
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use url::Url;

    pub fn serialize<S: Serializer>(value: &Url, serializer: S) -> Result<S::Ok, S::Error> {
        // ---
        serializer.serialize_str(value.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Url, D::Error> {
        // ---
        let raw = String::deserialize(deserializer)?;
        Url::parse(&raw).map_err(|err| D::Error::custom(format!("invalid url `{raw}`: {err}")))
    }
}
