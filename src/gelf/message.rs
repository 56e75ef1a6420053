//! GELF payload model.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::DecodeError;

/// Additional field carrying the per-message database location.
pub const DESTINATION_FIELD: &str = "_URL";

/// A parsed GELF JSON payload. Unknown keys (the `_`-prefixed additional
/// fields) are kept in [`additional`](Self::additional).
///
/// Only `short_message` is typed. Clients disagree on the JSON type of the
/// other standard fields (numeric `version`, string `level`, ISO
/// `timestamp`), so they are kept as raw values and never reject a message.
#[derive(Debug, Clone, Deserialize)]
pub struct GelfMessage {
    #[serde(default)]
    pub version: Option<Value>,
    #[serde(default)]
    pub host: Option<Value>,
    pub short_message: String,
    #[serde(default)]
    pub full_message: Option<Value>,
    #[serde(default)]
    pub timestamp: Option<Value>,
    #[serde(default)]
    pub level: Option<Value>,
    #[serde(flatten)]
    pub additional: Map<String, Value>,
}

impl GelfMessage {
    pub fn from_json(payload: &[u8]) -> Result<Self, DecodeError> {
        serde_json::from_slice(payload).map_err(DecodeError::Json)
    }

    /// Looks up an additional field holding a string value.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.additional.get(name).and_then(Value::as_str)
    }
}

/// What the relay needs from one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedLogMessage {
    pub short_message: String,
    pub destination_url: String,
}

impl TryFrom<GelfMessage> for DecodedLogMessage {
    type Error = DecodeError;

    fn try_from(message: GelfMessage) -> Result<Self, Self::Error> {
        let destination_url = message
            .field(DESTINATION_FIELD)
            .ok_or(DecodeError::MissingField(DESTINATION_FIELD))?
            .to_string();
        Ok(Self {
            short_message: message.short_message,
            destination_url,
        })
    }
}
