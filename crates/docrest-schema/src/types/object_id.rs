use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{
    fmt::{self, Display},
    str::FromStr,
    sync::atomic::{AtomicU32, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};
use thiserror::Error as ThisError;

static COUNTER: AtomicU32 = AtomicU32::new(0);

///
/// ObjectIdError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ObjectIdError {
    #[error("object id must be 24 hex characters, found {len}")]
    InvalidLength { len: usize },

    #[error("object id contains non-hex characters: '{value}'")]
    InvalidHex { value: String },
}

///
/// ObjectId
///
/// 12-byte document identity: 4 bytes of seconds, 8 bytes of process-local
/// sequence. Rendered as 24 lowercase hex characters.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    pub const STORED_SIZE: usize = 12;
    pub const HEX_LEN: usize = 24;

    #[must_use]
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn to_bytes(self) -> [u8; 12] {
        self.0
    }

    /// Generate a fresh id from the wall clock and a process counter.
    #[must_use]
    pub fn generate() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
        #[allow(clippy::cast_possible_truncation)]
        let secs = secs as u32;

        Self::from_parts(secs, u64::from(seq))
    }

    /// Build an id from explicit parts; used by deterministic fixtures.
    #[must_use]
    pub fn from_parts(seconds: u32, sequence: u64) -> Self {
        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..].copy_from_slice(&sequence.to_be_bytes());

        Self(bytes)
    }

    #[must_use]
    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = ObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != Self::HEX_LEN {
            return Err(ObjectIdError::InvalidLength { len: s.len() });
        }

        let mut bytes = [0u8; 12];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| ObjectIdError::InvalidHex {
            value: s.to_string(),
        })?;

        Ok(Self(bytes))
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;

        s.parse().map_err(serde::de::Error::custom)
    }
}
