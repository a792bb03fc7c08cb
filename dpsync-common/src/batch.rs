use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::{DeviceId, Property, RawEntry};

/// Where a command originated
pub mod cmd {
    pub const LAN: u8 = 0;
    pub const MQTT: u8 = 1;
    pub const TIMER: u8 = 2;
    pub const SCENE: u8 = 3;
    pub const RELIABLE_TRANSFER: u8 = 4;
    pub const BLE: u8 = 5;
}

/// How a batch is delivered to subdevices
pub mod dtt {
    pub const SINGLE: u8 = 0;
    pub const GROUP: u8 = 1;
    pub const BROADCAST: u8 = 2;
}

/// Ordered data points sharing one command context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyBatch {
    /// Absent for the gateway device itself
    #[serde(rename = "devId", default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<DeviceId>,
    #[serde(rename = "cmd", default)]
    pub cmd_type: u8,
    #[serde(rename = "dtt", default)]
    pub delivery_type: u8,
    pub dps: Vec<Property>,
}

impl PropertyBatch {
    pub fn new(device_id: Option<DeviceId>, dps: Vec<Property>) -> Self {
        Self {
            device_id,
            cmd_type: cmd::MQTT,
            delivery_type: dtt::SINGLE,
            dps,
        }
    }

    pub fn len(&self) -> usize {
        self.dps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dps.is_empty()
    }
}

/// A single raw data point with its command context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBatch {
    #[serde(rename = "devId", default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<DeviceId>,
    #[serde(rename = "cmd", default)]
    pub cmd_type: u8,
    #[serde(rename = "dtt", default)]
    pub delivery_type: u8,
    pub dp: RawEntry,
}
