//! Messages exchanged on the device topics
//!
//! # Example Session
//!
//! ```plain
//! dpsync/devices/{id}/in  <- {"type":"timestamp","epoch":1712345678}
//! dpsync/devices/{id}/in  <- {"type":"properties","dps":[{"id":3,"type":"value","value":77}]}
//! dpsync/devices/{id}/out -> {"type":"properties","dps":[{"id":3,"type":"value","value":77,"t":0}]}
//! ```

use alloc::string::String;

use serde::{Deserialize, Serialize};

use crate::{PropertyBatch, RawBatch};

/// Firmware upgrade offer pushed by the control plane
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeNotice {
    /// OTA channel
    #[serde(rename = "type")]
    pub channel: i32,
    pub version: String,
    pub size: String,
    pub md5: String,
    pub hmac: String,
    pub url: String,
    #[serde(rename = "httpsUrl")]
    pub https_url: String,
}

/// Control plane to device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inbound {
    /// Device is not provisioned and is waiting to be bound
    BindStart,
    Upgrade { notice: UpgradeNotice },
    Timestamp { epoch: i64 },
    Reset { code: i32 },
    Properties(PropertyBatch),
    Raw(RawBatch),
}

/// Device to control plane
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outbound {
    Properties(PropertyBatch),
    Raw(RawBatch),
}
