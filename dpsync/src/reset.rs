//! Power-cycle the device three times in quick succession to drop its
//! provisioning.
//!
//! Every boot bumps a persisted counter. Staying up for [`STABLE_UPTIME`]
//! clears it again; reaching [`RESET_THRESHOLD`] at boot triggers the reset.

use std::time::{Duration, Instant};

use crate::store::{KvStore, PropertyStore, keys};

pub const RESET_THRESHOLD: u8 = 3;
pub const STABLE_UPTIME: Duration = Duration::from_secs(5);

#[derive(Debug, Default)]
pub struct ResetGuard {
    clear_at: Option<Instant>,
}

impl ResetGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count this boot, returning whether provisioning should be dropped
    pub fn on_boot<K: KvStore>(&mut self, store: &mut PropertyStore<K>, now: Instant) -> bool {
        let count = store.get(&keys::RESET_COUNT).saturating_add(1);
        tracing::debug!(count, "Counting boot");

        if count >= RESET_THRESHOLD {
            self.clear_at = None;
            write(store, 0);
            return true;
        }

        write(store, count);
        self.clear_at = Some(now + STABLE_UPTIME);
        false
    }

    /// Clear the counter once the device has been up long enough
    pub fn poll<K: KvStore>(&mut self, store: &mut PropertyStore<K>, now: Instant) {
        if let Some(clear_at) = self.clear_at
            && now >= clear_at
        {
            self.clear_at = None;
            write(store, 0);
            tracing::debug!("Reset count cleared");
        }
    }

    pub fn is_armed(&self) -> bool {
        self.clear_at.is_some()
    }
}

fn write<K: KvStore>(store: &mut PropertyStore<K>, count: u8) {
    if let Err(e) = store.set(&keys::RESET_COUNT, count) {
        tracing::error!(count, "Failed to write reset count: {e}");
    }
}
