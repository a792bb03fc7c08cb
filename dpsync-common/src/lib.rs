#![cfg_attr(not(test), no_std)]

extern crate alloc;

use core::{fmt::Display, str::FromStr};

mod batch;
pub mod message;
mod property;
mod string;
pub use batch::*;
pub use property::*;
pub use string::*;

/// Data points this firmware knows about
pub mod dp {
    use crate::DpId;

    /// Speaker volume, `value` type, 0-100 by convention
    pub const VOLUME: DpId = DpId(3);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Topic {
    /// Commands and lifecycle messages for the device
    Inbound { device: DeviceId },
    /// Reports from the device
    Outbound { device: DeviceId },
}

impl Topic {
    pub fn device(&self) -> &DeviceId {
        match self {
            Topic::Inbound { device } | Topic::Outbound { device } => device,
        }
    }
}

impl Display for Topic {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Topic::Inbound { device } => write!(f, "dpsync/devices/{device}/in"),
            Topic::Outbound { device } => write!(f, "dpsync/devices/{device}/out"),
        }
    }
}

impl FromStr for Topic {
    type Err = &'static str;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        let mut parts = s.split('/');
        if parts.next() != Some("dpsync") {
            return Err("does not start with dpsync/");
        }

        match parts.next() {
            Some("devices") => match parts.next() {
                Some("") => Err("dpsync/devices/{id} with empty id"),
                Some(device) => {
                    let device = DeviceId::from(device);
                    let topic = match parts.next() {
                        Some("in") => Topic::Inbound { device },
                        Some("out") => Topic::Outbound { device },
                        Some(_) => return Err("dpsync/devices/{id}/{in|out}"),
                        None => return Err("dpsync/devices/{id}"),
                    };

                    match parts.next() {
                        Some(_) => Err("dpsync/devices/{id}/{in|out}/..."),
                        None => Ok(topic),
                    }
                }
                None => Err("dpsync/devices"),
            },
            Some(_) => Err("dpsync/..."),
            None => Err("dpsync"),
        }
    }
}
