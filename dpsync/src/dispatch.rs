use dpsync_common::PropertyBatch;

use crate::{
    peripherals::Peripherals,
    registry::{ApplyError, Registry},
    store::{KvStore, PropertyStore},
};

/// Per-entry outcome counts of one dispatch
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Actuated and persisted
    pub applied: usize,
    /// No actuation registered for the id
    pub skipped: usize,
    /// Value did not decode for its actuation
    pub rejected: usize,
    /// Actuated, but the store write failed
    pub unpersisted: usize,
}

/// Apply every entry of `batch` in order
///
/// Entries are independent: an unknown id, a bad value or a failed write only
/// affects that entry.
pub fn dispatch<K: KvStore, P: Peripherals>(
    registry: &Registry,
    store: &mut PropertyStore<K>,
    peripherals: &mut P,
    batch: &PropertyBatch,
) -> DispatchSummary {
    let mut summary = DispatchSummary::default();

    for (idx, prop) in batch.dps.iter().enumerate() {
        tracing::debug!(
            idx,
            id = %prop.id,
            kind = prop.value.kind(),
            ts = prop.timestamp,
            "Dispatching property"
        );

        let Some(actuation) = registry.get(prop.id) else {
            summary.skipped += 1;
            continue;
        };

        match actuation.apply(&prop.value, store, peripherals) {
            Ok(()) => summary.applied += 1,
            Err(e @ ApplyError::Decode { .. }) => {
                tracing::warn!(id = %prop.id, ?actuation, "Ignoring property: {e}");
                summary.rejected += 1;
            }
            Err(e @ ApplyError::Store(_)) => {
                tracing::error!(
                    id = %prop.id,
                    key = actuation.key_name(),
                    "Failed to persist property: {e}"
                );
                summary.unpersisted += 1;
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use dpsync_common::{DpId, Property, PropertyValue, dp};

    use super::*;
    use crate::{
        store::{MemoryStore, keys},
        testing::{BrokenStore, RecordingPeripherals},
    };

    fn volume(level: i32) -> Property {
        Property::new(dp::VOLUME, PropertyValue::Value(level))
    }

    #[test]
    fn known_id_applies_and_persists() {
        let mut store = PropertyStore::new(MemoryStore::new());
        let mut peripherals = RecordingPeripherals::default();
        let batch = PropertyBatch::new(None, vec![volume(77)]);

        let summary = dispatch(&Registry::standard(), &mut store, &mut peripherals, &batch);

        assert_eq!(summary, DispatchSummary { applied: 1, ..Default::default() });
        assert_eq!(peripherals.volumes, [77]);
        assert_eq!(store.get(&keys::VOLUME), 77);
    }

    #[test]
    fn unknown_id_is_a_noop() {
        let mut store = PropertyStore::new(MemoryStore::new());
        let mut peripherals = RecordingPeripherals::default();
        let batch = PropertyBatch::new(None, vec![
            Property::new(DpId(101), PropertyValue::Bool(true)),
            volume(12),
            Property::new(DpId(102), PropertyValue::Value(3)),
        ]);

        let summary = dispatch(&Registry::standard(), &mut store, &mut peripherals, &batch);

        assert_eq!(summary, DispatchSummary { applied: 1, skipped: 2, ..Default::default() });
        assert_eq!(peripherals.volumes, [12]);
        assert_eq!(store.kv().len(), 1);
    }

    #[test]
    fn entries_apply_in_order() {
        let mut store = PropertyStore::new(MemoryStore::new());
        let mut peripherals = RecordingPeripherals::default();
        let batch = PropertyBatch::new(None, vec![volume(10), volume(20), volume(30)]);

        dispatch(&Registry::standard(), &mut store, &mut peripherals, &batch);

        assert_eq!(peripherals.volumes, [10, 20, 30]);
        assert_eq!(store.get(&keys::VOLUME), 30);
    }

    #[test]
    fn bad_entry_does_not_stop_the_batch() {
        let mut store = PropertyStore::new(MemoryStore::new());
        let mut peripherals = RecordingPeripherals::default();
        let batch = PropertyBatch::new(None, vec![
            Property::new(dp::VOLUME, PropertyValue::Bool(true)),
            volume(40),
        ]);

        let summary = dispatch(&Registry::standard(), &mut store, &mut peripherals, &batch);

        assert_eq!(summary, DispatchSummary { applied: 1, rejected: 1, ..Default::default() });
        assert_eq!(peripherals.volumes, [40]);
    }

    #[test]
    fn oversized_volume_is_truncated_not_rejected() {
        let mut store = PropertyStore::new(MemoryStore::new());
        let mut peripherals = RecordingPeripherals::default();
        let batch = PropertyBatch::new(None, vec![volume(300)]);

        let summary = dispatch(&Registry::standard(), &mut store, &mut peripherals, &batch);

        assert_eq!(summary, DispatchSummary { applied: 1, ..Default::default() });
        assert_eq!(peripherals.volumes, [44]);
        assert_eq!(store.get(&keys::VOLUME), 44);
    }

    #[test]
    fn failed_write_still_actuates() {
        let mut store = PropertyStore::new(BrokenStore);
        let mut peripherals = RecordingPeripherals::default();
        let batch = PropertyBatch::new(None, vec![volume(60), volume(61)]);

        let summary = dispatch(&Registry::standard(), &mut store, &mut peripherals, &batch);

        assert_eq!(summary, DispatchSummary { unpersisted: 2, ..Default::default() });
        assert_eq!(peripherals.volumes, [60, 61]);
    }

    #[test]
    fn repeated_delivery_is_not_deduplicated() {
        let mut store = PropertyStore::new(MemoryStore::new());
        let mut peripherals = RecordingPeripherals::default();
        let batch = PropertyBatch::new(None, vec![volume(33)]);

        dispatch(&Registry::standard(), &mut store, &mut peripherals, &batch);
        dispatch(&Registry::standard(), &mut store, &mut peripherals, &batch);

        assert_eq!(peripherals.volumes, [33, 33]);
        assert_eq!(store.get(&keys::VOLUME), 33);
    }
}
