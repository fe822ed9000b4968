//! Canonical string-to-sign for SNS signature version 1.
//!
//! For each signable field of the message type, in order, a present field
//! contributes:
//!
//! ```text
//! <Name> "\n" <Value> "\n"
//! ```
//!
//! Absent fields contribute nothing, not even their name. The signer computed
//! its signature over exactly these bytes, so any deviation breaks
//! verification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::message::{Message, MessageType};

/// How field values are turned into bytes before hashing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TextEncoding {
    #[default]
    Utf8,
    /// One byte per UTF-16 code unit (low byte kept).
    Latin1,
    Utf16Le,
}

impl TextEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf8",
            Self::Latin1 => "latin1",
            Self::Utf16Le => "utf16le",
        }
    }

    /// Encode text into bytes.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Latin1 => text.encode_utf16().map(|unit| unit as u8).collect(),
            Self::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextEncoding {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Self::Utf8),
            "latin1" | "binary" => Ok(Self::Latin1),
            "utf16le" | "utf-16le" | "ucs2" | "ucs-2" => Ok(Self::Utf16Le),
            _ => Err(ConfigError::InvalidEncoding(s.to_string())),
        }
    }
}

impl TryFrom<String> for TextEncoding {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TextEncoding> for String {
    fn from(value: TextEncoding) -> Self {
        value.as_str().to_string()
    }
}

/// Build the canonical string for a message of the given type.
pub fn canonical_string(message: &Message, message_type: MessageType) -> String {
    let mut out = String::new();
    for field in message_type.signable_fields() {
        if let Some(value) = message.get(*field) {
            out.push_str(field.name());
            out.push('\n');
            out.push_str(value);
            out.push('\n');
        }
    }
    out
}

/// Build the canonical buffer: the canonical string in the given encoding.
pub fn canonical_bytes(
    message: &Message,
    message_type: MessageType,
    encoding: TextEncoding,
) -> Vec<u8> {
    encoding.encode(&canonical_string(message, message_type))
}
