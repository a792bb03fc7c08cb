use dpsync_common::{DeviceId, PropertyBatch, RawBatch, message::Outbound};

use crate::{
    session::Session,
    state::DeviceState,
    store::{KvStore, PropertyStore},
};

fn now_secs() -> u32 {
    u32::try_from(chrono::Utc::now().timestamp()).unwrap_or_default()
}

fn send<S: Session>(session: &mut S, msg: Outbound) {
    if let Err(e) = session.send(msg) {
        tracing::warn!("Failed to queue report: {e}");
    }
}

/// Report the device-owned properties as currently stored
pub fn report_status<K: KvStore, S: Session>(
    store: &PropertyStore<K>,
    session: &mut S,
    device: &DeviceId,
) -> DeviceState {
    let state = DeviceState::load(store);
    tracing::debug!(?state, "Reporting device state");

    let batch = PropertyBatch::new(Some(device.clone()), state.properties(now_secs()));
    send(session, Outbound::Properties(batch));

    state
}

/// Echo an inbound batch back unchanged to confirm it was received
pub fn acknowledge<S: Session>(session: &mut S, batch: PropertyBatch) {
    tracing::debug!(dps = batch.len(), device = ?batch.device_id, "Acknowledging batch");
    send(session, Outbound::Properties(batch));
}

/// Echo an inbound raw data point back unchanged
pub fn echo_raw<S: Session>(session: &mut S, raw: RawBatch) {
    tracing::debug!(id = %raw.dp.id, len = raw.dp.len(), "Echoing raw data point");
    send(session, Outbound::Raw(raw));
}
