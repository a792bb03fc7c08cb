/// Canned voice prompts the audio subsystem can play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alert {
    PowerOn,
    /// Waiting to be provisioned
    NetworkConfig,
    NetworkConnected,
    NetworkDisconnect,
}

/// Notifications fanned out to other subsystems on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalEvent {
    Online,
    Offline,
    ResetRequested,
}

/// Local side effects available to the core
///
/// Implementations must return quickly; they run inline with event handling.
pub trait Peripherals {
    fn set_volume(&mut self, level: u8);

    fn play_alert(&mut self, alert: Alert, repeat: bool);

    fn publish_local_event(&mut self, event: LocalEvent);

    /// Set the wall clock to a unix timestamp in seconds
    fn set_clock(&mut self, epoch: i64);
}
