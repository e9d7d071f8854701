//! Job domain types

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

/// Opaque job identifier assigned by the queue service
///
/// The service emits integers today, but the agent never does arithmetic on
/// the value; it only logs it and appends it to the confirmation path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for JobId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for JobId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum WireId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match WireId::deserialize(deserializer)? {
            WireId::Text(s) => JobId(s),
            WireId::Signed(n) => JobId(n.to_string()),
            WireId::Unsigned(n) => JobId(n.to_string()),
        })
    }
}

/// Printer markup for one label
///
/// The markup is printer-control language, not prose: it must reach the
/// device byte for byte, so it is only ever encoded as Latin-1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(String);

/// A payload character has no single-byte representation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("character {character:?} at position {position} cannot be encoded as Latin-1")]
pub struct EncodingError {
    pub character: char,
    pub position: usize,
}

impl Payload {
    pub fn new(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Encodes the markup with exactly one byte per character
    ///
    /// Code points up to U+00FF map to the byte of the same value, so control
    /// bytes and high bytes embedded in the markup pass through unmodified.
    /// Anything above U+00FF is rejected instead of being expanded into a
    /// multi-byte sequence the printer would misread.
    pub fn to_latin1(&self) -> Result<Vec<u8>, EncodingError> {
        self.0
            .chars()
            .enumerate()
            .map(|(position, character)| {
                u8::try_from(u32::from(character)).map_err(|_| EncodingError {
                    character,
                    position,
                })
            })
            .collect()
    }
}

impl From<&str> for Payload {
    fn from(markup: &str) -> Self {
        Self(markup.to_string())
    }
}

/// A pending label-print job, as advertised by the queue service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,

    /// Destination label, informational only
    #[serde(rename = "endereco", default)]
    pub address: Option<String>,

    /// Missing and null markup both decode as an empty payload
    #[serde(rename = "zpl", default, deserialize_with = "nullable_payload")]
    pub payload: Payload,
}

impl Job {
    pub fn new(id: impl Into<JobId>, address: Option<String>, payload: impl Into<Payload>) -> Self {
        Self {
            id: id.into(),
            address,
            payload: payload.into(),
        }
    }

    /// Document name shown in the spooler queue
    pub fn document_name(&self) -> String {
        format!("Zebra label - ID {}", self.id)
    }

    pub fn describe_address(&self) -> &str {
        self.address.as_deref().unwrap_or("(no address)")
    }
}

fn nullable_payload<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Payload, D::Error> {
    Ok(Option::<Payload>::deserialize(deserializer)?.unwrap_or_default())
}
