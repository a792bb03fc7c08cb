use dpsync_common::DeviceId;

use self::{
    peripherals::Peripherals,
    registry::Registry,
    reset::ResetGuard,
    session::{Session, SessionError},
    state::DeviceState,
    store::{KvStore, PropertyStore, StoreError},
};

pub mod dispatch;
pub mod event;
pub mod log;
pub mod mqtt;
pub mod peripherals;
mod poll;
pub mod registry;
pub mod report;
pub mod reset;
mod router;
pub mod session;
pub mod state;
pub mod store;
#[cfg(test)]
mod testing;

pub use dpsync_common as common;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("session error: {0}")]
    Session(#[from] SessionError),
}

impl Error {
    /// I/O that may succeed if tried again later
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Store(StoreError::Io(_)) => true,
            Error::Store(StoreError::Corrupt(_)) => false,
            Error::Session(
                SessionError::MqttTransport(_)
                | SessionError::MqttConnection(_)
                | SessionError::ConnectTimeout
                | SessionError::OutboxFull(_)
                | SessionError::NotConnected,
            ) => true,
            Error::Session(_) => false,
        }
    }
}

/// Everything the device needs to react to its session
///
/// Owns the session, the persisted properties and the local peripherals, and
/// is driven by [`Device::run`].
pub struct Device<S, K, P> {
    id: DeviceId,
    session: S,
    store: PropertyStore<K>,
    peripherals: P,
    registry: Registry,
    reset_guard: ResetGuard,
}

impl<S: Session, K: KvStore, P: Peripherals> Device<S, K, P> {
    pub fn new(id: impl Into<DeviceId>, session: S, kv: K, peripherals: P) -> Self {
        Self {
            id: id.into(),
            session,
            store: PropertyStore::new(kv),
            peripherals,
            registry: Registry::standard(),
            reset_guard: ResetGuard::new(),
        }
    }

    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn store(&self) -> &PropertyStore<K> {
        &self.store
    }

    pub fn peripherals(&self) -> &P {
        &self.peripherals
    }

    /// Queue a report of the device-owned properties
    pub fn report_status(&mut self) -> DeviceState {
        report::report_status(&self.store, &mut self.session, &self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_timeout_is_transient() {
        assert!(Error::from(SessionError::ConnectTimeout).is_transient());
        assert!(Error::from(SessionError::NotConnected).is_transient());
        assert!(!Error::from(StoreError::Corrupt("bad".into())).is_transient());
    }
}
