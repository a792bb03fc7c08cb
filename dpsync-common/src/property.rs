use alloc::{string::String, vec::Vec};
use core::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Data point identifier, namespaced by the product schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DpId(pub u8);

impl Display for DpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Typed value of a single data point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    Bool(bool),
    /// Signed integer data point
    Value(i32),
    String(String),
    /// Index into the enum range declared by the schema
    Enum(u32),
    /// Fault or flag mask
    Bitmap(u32),
}

impl PropertyValue {
    pub fn kind(&self) -> &'static str {
        match self {
            PropertyValue::Bool(_) => "bool",
            PropertyValue::Value(_) => "value",
            PropertyValue::String(_) => "string",
            PropertyValue::Enum(_) => "enum",
            PropertyValue::Bitmap(_) => "bitmap",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub id: DpId,
    #[serde(flatten)]
    pub value: PropertyValue,
    /// Unix timestamp in seconds, 0 when the sender did not stamp the entry
    #[serde(rename = "t", default)]
    pub timestamp: u32,
}

impl Property {
    pub fn new(id: DpId, value: PropertyValue) -> Self {
        Self { id, value, timestamp: 0 }
    }

    pub fn with_timestamp(mut self, timestamp: u32) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Opaque data point; never interpreted locally
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntry {
    pub id: DpId,
    pub data: Vec<u8>,
}

impl RawEntry {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
