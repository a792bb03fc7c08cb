use dpsync_common::{
    PropertyBatch, RawBatch,
    message::{Inbound, UpgradeNotice},
};

/// Something the session wants the device to react to
///
/// Each event is handled exactly once, in delivery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    BindStart,
    Connected,
    Disconnected,
    UpgradeNotify(UpgradeNotice),
    /// Unix timestamp in seconds
    TimeSync(i64),
    Reset(i32),
    PropertyReceived(PropertyBatch),
    RawReceived(RawBatch),
}

impl LifecycleEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::BindStart => "bind_start",
            LifecycleEvent::Connected => "connected",
            LifecycleEvent::Disconnected => "disconnected",
            LifecycleEvent::UpgradeNotify(_) => "upgrade_notify",
            LifecycleEvent::TimeSync(_) => "time_sync",
            LifecycleEvent::Reset(_) => "reset",
            LifecycleEvent::PropertyReceived(_) => "property_received",
            LifecycleEvent::RawReceived(_) => "raw_received",
        }
    }
}

impl From<Inbound> for LifecycleEvent {
    fn from(msg: Inbound) -> Self {
        match msg {
            Inbound::BindStart => LifecycleEvent::BindStart,
            Inbound::Upgrade { notice } => LifecycleEvent::UpgradeNotify(notice),
            Inbound::Timestamp { epoch } => LifecycleEvent::TimeSync(epoch),
            Inbound::Reset { code } => LifecycleEvent::Reset(code),
            Inbound::Properties(batch) => LifecycleEvent::PropertyReceived(batch),
            Inbound::Raw(raw) => LifecycleEvent::RawReceived(raw),
        }
    }
}
