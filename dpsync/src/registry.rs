use std::collections::BTreeMap;

use dpsync_common::{DpId, PropertyValue, dp};

use crate::{
    peripherals::Peripherals,
    store::{KvStore, PropertyStore, StoreError, keys},
};

#[derive(thiserror::Error, Debug)]
pub enum ApplyError {
    #[error("expected {expected} value, got {got:?}")]
    Decode {
        expected: &'static str,
        got: PropertyValue,
    },
    #[error("actuated but not persisted: {0}")]
    Store(#[from] StoreError),
}

/// Local effect of accepting a data point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actuation {
    /// Speaker level, persisted under [`keys::VOLUME`]
    Volume,
}

impl Actuation {
    pub fn key_name(&self) -> &'static str {
        match self {
            Actuation::Volume => keys::VOLUME.name,
        }
    }

    /// Decode, actuate, then persist
    ///
    /// Nothing happens when decoding fails. A persistence failure is reported
    /// after the actuation already took effect.
    pub fn apply<K: KvStore, P: Peripherals>(
        &self,
        value: &PropertyValue,
        store: &mut PropertyStore<K>,
        peripherals: &mut P,
    ) -> Result<(), ApplyError> {
        match self {
            Actuation::Volume => {
                let PropertyValue::Value(v) = *value else {
                    return Err(ApplyError::Decode { expected: "value", got: value.clone() });
                };
                // Out-of-range levels keep their low byte, no clamping
                let level = v as u8;

                tracing::debug!(level, "Applying volume");
                peripherals.set_volume(level);
                store.set(&keys::VOLUME, level)?;
            }
        }

        Ok(())
    }
}

/// Data point id to actuation lookup
///
/// Ids without an entry are ignored by dispatch.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    actuations: BTreeMap<DpId, Actuation>,
}

impl Registry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Everything this firmware actuates
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(dp::VOLUME, Actuation::Volume);
        registry
    }

    /// Returns the actuation previously bound to `id`, if any
    pub fn register(&mut self, id: DpId, actuation: Actuation) -> Option<Actuation> {
        self.actuations.insert(id, actuation)
    }

    pub fn get(&self, id: DpId) -> Option<Actuation> {
        self.actuations.get(&id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DpId, Actuation)> + '_ {
        self.actuations.iter().map(|(id, act)| (*id, *act))
    }
}
