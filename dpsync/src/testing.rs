use std::collections::VecDeque;

use dpsync_common::message::Outbound;

use crate::{
    event::LifecycleEvent,
    peripherals::{Alert, LocalEvent, Peripherals},
    session::{Session, SessionError},
    store::{KvStore, StoreError},
};

#[derive(Debug, Default)]
pub(crate) struct RecordingPeripherals {
    pub volumes: Vec<u8>,
    pub alerts: Vec<(Alert, bool)>,
    pub local_events: Vec<LocalEvent>,
    pub clocks: Vec<i64>,
}

impl RecordingPeripherals {
    pub fn calls(&self) -> usize {
        self.volumes.len() + self.alerts.len() + self.local_events.len() + self.clocks.len()
    }
}

impl Peripherals for RecordingPeripherals {
    fn set_volume(&mut self, level: u8) {
        self.volumes.push(level);
    }

    fn play_alert(&mut self, alert: Alert, repeat: bool) {
        self.alerts.push((alert, repeat));
    }

    fn publish_local_event(&mut self, event: LocalEvent) {
        self.local_events.push(event);
    }

    fn set_clock(&mut self, epoch: i64) {
        self.clocks.push(epoch);
    }
}

/// Fails every read and write
pub(crate) struct BrokenStore;

impl KvStore for BrokenStore {
    fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Err(StoreError::Io(std::io::Error::other("flash offline")))
    }

    fn set(&mut self, _key: &str, _value: &[u8]) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::other("flash offline")))
    }
}

/// Replays queued poll results and records everything sent
#[derive(Debug, Default)]
pub(crate) struct ScriptedSession {
    pub started: bool,
    pub script: VecDeque<Result<Vec<LifecycleEvent>, SessionError>>,
    pub polls: usize,
    pub sent: Vec<Outbound>,
    pub reject_sends: bool,
    pub provisioning_resets: usize,
}

impl ScriptedSession {
    pub fn with_script(
        script: impl IntoIterator<Item = Result<Vec<LifecycleEvent>, SessionError>>,
    ) -> Self {
        Self { script: script.into_iter().collect(), ..Default::default() }
    }
}

impl Session for ScriptedSession {
    async fn start(&mut self) -> Result<(), SessionError> {
        self.started = true;
        Ok(())
    }

    async fn poll(&mut self) -> Result<Vec<LifecycleEvent>, SessionError> {
        self.polls += 1;
        self.script.pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }

    fn send(&mut self, msg: Outbound) -> Result<(), SessionError> {
        if self.reject_sends {
            return Err(SessionError::NotConnected);
        }

        self.sent.push(msg);
        Ok(())
    }

    fn reset_provisioning(&mut self) {
        self.provisioning_resets += 1;
    }
}
