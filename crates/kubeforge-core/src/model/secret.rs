//! Secret payload values
//!
//! A value held in memory is either plaintext typed by a user or an already
//! base64-encoded string read from a manifest. Serialization encodes plaintext
//! exactly once and passes encoded text through untouched, so exporting an
//! imported Secret reproduces its original bytes instead of encoding twice.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CoreError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretValue {
    /// Plaintext entered in memory, encoded on serialization
    Plain(String),
    /// Base64 text as found in a manifest, emitted verbatim
    Encoded(String),
}

impl SecretValue {
    pub fn plain(value: impl Into<String>) -> Self {
        SecretValue::Plain(value.into())
    }

    /// The base64 form written to manifests
    pub fn encoded(&self) -> String {
        match self {
            SecretValue::Plain(text) => STANDARD.encode(text.as_bytes()),
            SecretValue::Encoded(text) => text.clone(),
        }
    }

    /// Plaintext, decoding stored base64 when necessary
    pub fn decode(&self, key: &str) -> Result<String> {
        match self {
            SecretValue::Plain(text) => Ok(text.clone()),
            SecretValue::Encoded(text) => {
                let bytes = STANDARD
                    .decode(text.trim())
                    .map_err(|e| CoreError::SecretDecode {
                        key: key.to_string(),
                        message: e.to_string(),
                    })?;
                String::from_utf8(bytes).map_err(|e| CoreError::SecretDecode {
                    key: key.to_string(),
                    message: e.to_string(),
                })
            }
        }
    }
}

impl Serialize for SecretValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encoded())
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(SecretValue::Encoded)
    }
}

/// Whether `text` is well-formed standard base64
pub fn is_base64(text: &str) -> bool {
    STANDARD.decode(text.trim()).is_ok()
}
