//! Reversible obfuscation for stored puzzle answers
//!
//! NOT encryption. The key is the site's host name plus a version tag, both
//! public. This only keeps the quest answers from being readable at a glance
//! in storage. Pipeline: JSON -> UTF-8 -> XOR with repeating key -> base64 ->
//! `v1.` prefix.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{FolioError, Result};

/// Format version written in front of every payload
pub const OBFUSCATION_VERSION: &str = "v1";

/// XOR + base64 encoder keyed by host name
///
/// The name says it: this offers no confidentiality. Anyone who knows the host
/// can decode the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsecureObfuscator {
    key: Vec<u8>,
}

impl InsecureObfuscator {
    /// Build the obfuscator for a host; the key is `"<host>|v1"`
    pub fn for_host(host: &str) -> Self {
        Self {
            key: format!("{host}|{OBFUSCATION_VERSION}").into_bytes(),
        }
    }

    fn xor(&self, bytes: &mut [u8]) {
        for (byte, k) in bytes.iter_mut().zip(self.key.iter().cycle()) {
            *byte ^= k;
        }
    }

    /// Encode a value into the `v1.<base64>` storage format
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let mut bytes = serde_json::to_vec(value)?;
        self.xor(&mut bytes);
        Ok(format!("{OBFUSCATION_VERSION}.{}", STANDARD.encode(bytes)))
    }

    /// Decode a `v1.<base64>` payload
    pub fn decode<T: DeserializeOwned>(&self, encoded: &str) -> Result<T> {
        let body = encoded
            .strip_prefix(OBFUSCATION_VERSION)
            .and_then(|rest| rest.strip_prefix('.'))
            .ok_or_else(|| FolioError::DecodeError("unknown payload version".to_string()))?;
        let mut bytes = STANDARD
            .decode(body.trim())
            .map_err(|e| FolioError::DecodeError(format!("invalid base64: {e}")))?;
        self.xor(&mut bytes);
        let text = String::from_utf8(bytes)
            .map_err(|e| FolioError::DecodeError(format!("invalid utf-8: {e}")))?;
        Ok(serde_json::from_str(&text)?)
    }
}
