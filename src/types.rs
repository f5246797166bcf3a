//! Core types shared by the tree, annotation and patching passes.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Fingerprint: BLAKE3 digest of a file's bytes, or of a module's file set
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(pub [u8; 32]);

impl Fingerprint {
    /// Sentinel used when a file's content could not be read.
    pub const UNREADABLE: Fingerprint = Fingerprint([0u8; 32]);

    pub fn is_unreadable(&self) -> bool {
        *self == Self::UNREADABLE
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(value: &str) -> Result<Self, String> {
        let bytes = hex::decode(value).map_err(|e| format!("Invalid hex digit: {}", e))?;
        let digest: [u8; 32] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| format!("Invalid hash length: {}", b.len() * 2))?;
        Ok(Fingerprint(digest))
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..12])
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Fingerprint::from_hex(&value).map_err(serde::de::Error::custom)
    }
}

/// Weight: integer cost of content (a token count by default)
pub type Weight = u64;
