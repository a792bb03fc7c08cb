use dpsync_common::message::UpgradeNotice;

use crate::{
    Device,
    dispatch::dispatch,
    event::LifecycleEvent,
    peripherals::{Alert, LocalEvent, Peripherals},
    report,
    session::Session,
    store::KvStore,
};

fn log_upgrade(notice: &UpgradeNotice) {
    tracing::info!(
        channel = notice.channel,
        version = %notice.version,
        size = %notice.size,
        md5 = %notice.md5,
        hmac = %notice.hmac,
        url = %notice.url,
        https_url = %notice.https_url,
        "Upgrade available"
    );
}

impl<S: Session, K: KvStore, P: Peripherals> Device<S, K, P> {
    /// React to one lifecycle event
    ///
    /// Runs to completion without awaiting; failures are logged.
    pub fn handle(&mut self, event: LifecycleEvent) {
        tracing::debug!(event = event.name(), "Handling lifecycle event");

        match event {
            LifecycleEvent::BindStart => {
                tracing::info!("Device bind start");
                self.peripherals.play_alert(Alert::NetworkConfig, true);
            }
            LifecycleEvent::Connected => {
                tracing::info!("Session connected");
                self.peripherals.publish_local_event(LocalEvent::Online);
            }
            LifecycleEvent::Disconnected => {
                tracing::info!("Session disconnected");
                self.peripherals.publish_local_event(LocalEvent::Offline);
            }
            LifecycleEvent::UpgradeNotify(notice) => log_upgrade(&notice),
            LifecycleEvent::TimeSync(epoch) => {
                match chrono::DateTime::from_timestamp(epoch, 0) {
                    Some(time) => tracing::info!(epoch, %time, "Syncing clock"),
                    None => tracing::warn!(epoch, "Syncing clock to unrepresentable time"),
                }
                self.peripherals.set_clock(epoch);
            }
            LifecycleEvent::Reset(code) => {
                tracing::info!(code, "Device reset");
                self.peripherals.publish_local_event(LocalEvent::ResetRequested);
            }
            LifecycleEvent::PropertyReceived(batch) => {
                tracing::debug!(
                    cmd = batch.cmd_type,
                    dtt = batch.delivery_type,
                    count = batch.len(),
                    device = ?batch.device_id,
                    "Received properties"
                );

                let summary =
                    dispatch(&self.registry, &mut self.store, &mut self.peripherals, &batch);
                tracing::debug!(?summary, "Dispatched properties");

                report::acknowledge(&mut self.session, batch);
            }
            LifecycleEvent::RawReceived(raw) => {
                tracing::debug!(
                    cmd = raw.cmd_type,
                    dtt = raw.delivery_type,
                    device = ?raw.device_id,
                    id = %raw.dp.id,
                    len = raw.dp.len(),
                    data = %hex::encode(&raw.dp.data),
                    "Received raw data point"
                );

                report::echo_raw(&mut self.session, raw);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use dpsync_common::{
        DpId, Property, PropertyBatch, PropertyValue, RawBatch, RawEntry, dp, message::Outbound,
    };

    use super::*;
    use crate::{
        store::{MemoryStore, keys},
        testing::{RecordingPeripherals, ScriptedSession},
    };

    type TestDevice = Device<ScriptedSession, MemoryStore, RecordingPeripherals>;

    fn device() -> TestDevice {
        Device::new("dev1", ScriptedSession::default(), MemoryStore::new(), Default::default())
    }

    fn notice() -> UpgradeNotice {
        UpgradeNotice {
            channel: 0,
            version: "1.0.1".into(),
            size: "1048576".into(),
            md5: "d41d8cd98f00b204e9800998ecf8427e".into(),
            hmac: "00ff".into(),
            url: "http://ota.example/fw.bin".into(),
            https_url: "https://ota.example/fw.bin".into(),
        }
    }

    /// Total side effects: peripheral calls plus outbound messages
    fn effects(device: &TestDevice) -> usize {
        device.peripherals().calls() + device.session().sent.len()
    }

    #[test]
    fn bind_start_plays_network_config() {
        let mut device = device();
        device.handle(LifecycleEvent::BindStart);

        assert_eq!(device.peripherals().alerts, [(Alert::NetworkConfig, true)]);
        assert_eq!(effects(&device), 1);
    }

    #[test]
    fn connected_publishes_online() {
        let mut device = device();
        device.handle(LifecycleEvent::Connected);

        assert_eq!(device.peripherals().local_events, [LocalEvent::Online]);
        assert_eq!(effects(&device), 1);
    }

    #[test]
    fn disconnected_publishes_offline() {
        let mut device = device();
        device.handle(LifecycleEvent::Disconnected);

        assert_eq!(device.peripherals().local_events, [LocalEvent::Offline]);
        assert_eq!(effects(&device), 1);
    }

    #[test]
    fn upgrade_notice_only_logs() {
        let mut device = device();
        device.handle(LifecycleEvent::UpgradeNotify(notice()));

        assert_eq!(effects(&device), 0);
        assert!(device.store().kv().is_empty());
    }

    #[test]
    fn time_sync_sets_clock() {
        let mut device = device();
        device.handle(LifecycleEvent::TimeSync(1712345678));

        assert_eq!(device.peripherals().clocks, [1712345678]);
        assert_eq!(effects(&device), 1);
    }

    #[test]
    fn reset_publishes_reset_requested() {
        let mut device = device();
        device.handle(LifecycleEvent::Reset(2));

        assert_eq!(device.peripherals().local_events, [LocalEvent::ResetRequested]);
        assert_eq!(effects(&device), 1);
        assert_eq!(device.session().provisioning_resets, 0);
    }

    #[test]
    fn properties_dispatch_then_acknowledge() {
        let mut device = device();
        let batch = PropertyBatch::new(Some("dev1".into()), vec![
            Property::new(dp::VOLUME, PropertyValue::Value(77)),
            Property::new(DpId(101), PropertyValue::Bool(true)),
        ]);

        device.handle(LifecycleEvent::PropertyReceived(batch.clone()));

        assert_eq!(device.peripherals().volumes, [77]);
        assert_eq!(device.store().get(&keys::VOLUME), 77);
        assert_eq!(device.session().sent, [Outbound::Properties(batch)]);
        assert_eq!(effects(&device), 2);
    }

    #[test]
    fn unhandled_properties_are_still_acknowledged() {
        let mut device = device();
        let batch = PropertyBatch::new(None, vec![Property::new(
            DpId(101),
            PropertyValue::Enum(1),
        )]);

        device.handle(LifecycleEvent::PropertyReceived(batch.clone()));

        assert_eq!(device.peripherals().calls(), 0);
        assert_eq!(device.session().sent, [Outbound::Properties(batch)]);
    }

    #[test]
    fn raw_is_echoed_without_actuation() {
        let mut device = device();
        let raw = RawBatch {
            device_id: None,
            cmd_type: 1,
            delivery_type: 0,
            dp: RawEntry { id: dp::VOLUME, data: vec![0x10] },
        };

        device.handle(LifecycleEvent::RawReceived(raw.clone()));

        assert_eq!(device.peripherals().calls(), 0);
        assert!(device.store().kv().is_empty());
        assert_eq!(device.session().sent, [Outbound::Raw(raw)]);
    }
}
