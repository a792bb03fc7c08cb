use dpsync::peripherals::{Alert, LocalEvent, Peripherals};
use tokio::sync::broadcast;

/// Peripherals of a device without audio hardware
///
/// Alerts and volume changes are logged. Local events are fanned out over a
/// broadcast channel.
pub struct DevicePeripherals {
    volume: u8,
    /// Seconds between the synced clock and the system clock
    clock_offset: i64,
    announced_online: bool,
    local_events: broadcast::Sender<LocalEvent>,
}

fn system_time() -> i64 {
    chrono::Utc::now().timestamp()
}

impl DevicePeripherals {
    pub fn new() -> (Self, broadcast::Receiver<LocalEvent>) {
        let (tx, rx) = broadcast::channel(16);

        let peripherals = Self {
            volume: 0,
            clock_offset: 0,
            announced_online: false,
            local_events: tx,
        };

        (peripherals, rx)
    }
}

impl Peripherals for DevicePeripherals {
    fn set_volume(&mut self, level: u8) {
        tracing::info!(level, "Setting volume");
        self.volume = level;
    }

    fn play_alert(&mut self, alert: Alert, repeat: bool) {
        tracing::info!(?alert, repeat, volume = self.volume, "Playing alert");
    }

    fn publish_local_event(&mut self, event: LocalEvent) {
        if self.local_events.send(event).is_err() {
            tracing::debug!(?event, "No subscribers for local event");
        }

        match event {
            LocalEvent::Online if !self.announced_online => {
                self.announced_online = true;
                self.play_alert(Alert::NetworkConnected, false);
            }
            LocalEvent::Offline => self.play_alert(Alert::NetworkDisconnect, false),
            LocalEvent::Online | LocalEvent::ResetRequested => {}
        }
    }

    fn set_clock(&mut self, epoch: i64) {
        self.clock_offset = epoch - system_time();
        tracing::debug!(offset = self.clock_offset, "Clock synced");
    }
}
