use dpsync_common::{Property, PropertyValue, dp};

use crate::store::{KvStore, PropertyStore, keys};

/// Properties the device itself owns and reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceState {
    pub volume: u8,
}

impl DeviceState {
    pub fn load<K: KvStore>(store: &PropertyStore<K>) -> Self {
        Self { volume: store.get(&keys::VOLUME) }
    }

    pub fn properties(&self, timestamp: u32) -> Vec<Property> {
        vec![
            Property::new(dp::VOLUME, PropertyValue::Value(self.volume.into()))
                .with_timestamp(timestamp),
        ]
    }
}
