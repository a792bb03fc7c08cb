use dpsync_common::message::Outbound;
use mqtt_endpoint_tokio::mqtt_ep;

use crate::event::LifecycleEvent;

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("mqtt transport error: {0}")]
    MqttTransport(#[from] mqtt_ep::TransportError),
    #[error("mqtt connection error: {0}")]
    MqttConnection(#[from] mqtt_ep::ConnectionError),
    #[error("mqtt packet field error: {0}")]
    MqttPacketField(&'static str),
    #[error("mqtt packet error: {0}")]
    MqttPacket(mqtt_ep::result_code::MqttError),
    #[error("serde json error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("outbox full with {0} queued")]
    OutboxFull(usize),
    #[error("timed out connecting to broker")]
    ConnectTimeout,
    #[error("not connected")]
    NotConnected,
}

impl From<mqtt_ep::result_code::MqttError> for SessionError {
    fn from(e: mqtt_ep::result_code::MqttError) -> Self {
        SessionError::MqttPacket(e)
    }
}

/// Connection to the control plane
///
/// The session is driven from a single task: `poll` is the only place it
/// performs I/O, and `send` merely queues.
pub trait Session {
    /// Bring the session up; called once before the first `poll`
    fn start(&mut self) -> impl Future<Output = Result<(), SessionError>>;

    /// Make progress and return the lifecycle events that are ready
    ///
    /// Writes queued messages, waits a bounded time for inbound traffic and
    /// keeps the connection alive. An empty vector means nothing arrived.
    fn poll(&mut self) -> impl Future<Output = Result<Vec<LifecycleEvent>, SessionError>>;

    /// Queue a message for delivery on the next `poll`
    ///
    /// Delivery is not confirmed.
    fn send(&mut self, msg: Outbound) -> Result<(), SessionError>;

    /// Forget the provisioning so the device goes back to waiting for a bind
    fn reset_provisioning(&mut self);
}
