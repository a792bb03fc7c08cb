//! [`Session`] over an MQTT v5 broker
//!
//! The device subscribes to its inbound topic and publishes reports to its
//! outbound topic, see [`Topic`]. Connection state changes surface as
//! [`LifecycleEvent::Connected`] and [`LifecycleEvent::Disconnected`].

use core::str::FromStr as _;
use std::{collections::VecDeque, time::Duration};

use dpsync_common::{
    DeviceId, Topic,
    message::{Inbound, Outbound},
};
use mqtt_endpoint_tokio::mqtt_ep::{
    self, Endpoint,
    packet::v5_0,
    role,
    transport::{TcpTransport, connect_helper},
};
use mqtt_protocol_core::mqtt::packet::{
    Qos, SubEntry, SubOpts,
    v5_0::{Connack, Publish},
};

use crate::{
    event::LifecycleEvent,
    session::{Session, SessionError},
};

#[derive(Debug, Clone)]
pub struct MqttConfig {
    pub client_id: String,
    /// `host:port` of the broker
    pub addr: String,
    /// Longest time a single poll waits for inbound traffic
    pub poll_interval: Duration,
    /// Bound on the TCP connect plus CONNACK handshake
    pub connect_timeout: Duration,
    /// Pause after a failed connection attempt
    pub reconnect_interval: Duration,
    /// Reports queued beyond this are rejected
    pub outbox_limit: usize,
}

impl MqttConfig {
    pub fn new(client_id: impl Into<String>, addr: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            addr: addr.into(),
            poll_interval: Duration::from_millis(100),
            connect_timeout: Duration::from_secs(5),
            reconnect_interval: Duration::from_secs(5),
            outbox_limit: 32,
        }
    }
}

pub struct MqttSession {
    config: MqttConfig,
    device: DeviceId,
    endpoint: Option<Endpoint<role::Client>>,
    next_packet_id: u16,
    outbox: VecDeque<Outbound>,
    /// Raised locally, delivered on the next poll
    pending: Vec<LifecycleEvent>,
}

fn next_packet_id(counter: &mut u16) -> u16 {
    loop {
        let id = *counter;
        *counter = counter.wrapping_add(1);

        if id != 0 {
            break id;
        }
    }
}

impl MqttSession {
    pub fn new(config: MqttConfig, device: DeviceId) -> Self {
        Self {
            config,
            device,
            endpoint: None,
            next_packet_id: 1,
            outbox: VecDeque::new(),
            pending: Vec::new(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.endpoint.is_some()
    }

    async fn connect(&mut self) -> Result<Endpoint<role::Client>, SessionError> {
        let endpoint = mqtt_ep::endpoint::Endpoint::<role::Client>::new(mqtt_ep::Version::V5_0);

        let timeout = Some(self.config.connect_timeout);
        let tcp_stream = connect_helper::connect_tcp(self.config.addr.as_str(), timeout).await?;
        let transport = TcpTransport::from_stream(tcp_stream);
        endpoint
            .attach(transport, mqtt_ep::endpoint::Mode::Client)
            .await?;

        let connect = v5_0::Connect::builder()
            .client_id(self.config.client_id.as_str())?
            .build()?;

        endpoint.send(connect).await?;

        let packet = endpoint.recv().await?;
        let connack: Connack = packet.try_into().map_err(SessionError::MqttPacketField)?;
        tracing::debug!("Received CONNACK: {connack:?}");

        let topic = Topic::Inbound { device: self.device.clone() };
        let subscribe = v5_0::Subscribe::builder()
            .packet_id(next_packet_id(&mut self.next_packet_id))
            .entries(vec![SubEntry::new(
                topic.to_string(),
                SubOpts::new().set_qos(Qos::AtLeastOnce),
            )?])
            .build()?;

        tracing::info!("Subscribing to topic '{topic}'");

        endpoint.register_packet_id(subscribe.packet_id()).await?;
        endpoint.send(subscribe).await?;

        Ok(endpoint)
    }

    fn decode(&self, packet: mqtt_ep::packet::Packet) -> Option<LifecycleEvent> {
        let publish: Publish = packet.try_into().ok()?;

        match Topic::from_str(publish.topic_name()) {
            Ok(Topic::Inbound { device }) if device == self.device => {}
            Ok(topic) => {
                tracing::debug!("Ignoring publish on foreign topic {topic}");
                return None;
            }
            Err(e) => {
                tracing::warn!(topic = publish.topic_name(), "Ignoring publish: {e}");
                return None;
            }
        }

        match serde_json::from_slice::<Inbound>(publish.payload().as_slice()) {
            Ok(msg) => Some(msg.into()),
            Err(e) => {
                tracing::warn!("Ignoring undecodable message: {e}");
                None
            }
        }
    }
}

async fn publish(
    endpoint: &Endpoint<role::Client>,
    packet_id: u16,
    topic: &Topic,
    msg: &Outbound,
) -> Result<(), SessionError> {
    let payload = serde_json::to_string(msg)?;

    tracing::debug!("Publishing to topic {topic}: {payload}");

    let publish = v5_0::Publish::builder()
        .topic_name(topic.to_string())?
        .payload(payload)
        .qos(Qos::AtLeastOnce)
        .retain(false)
        .packet_id(packet_id)
        .build()?;

    if let Some(packet_id) = publish.packet_id() {
        endpoint.register_packet_id(packet_id).await?;
    }

    endpoint.send(publish).await?;

    Ok(())
}

impl Session for MqttSession {
    async fn start(&mut self) -> Result<(), SessionError> {
        tracing::info!(
            addr = %self.config.addr,
            client_id = %self.config.client_id,
            device = %self.device,
            "Starting MQTT session"
        );
        Ok(())
    }

    async fn poll(&mut self) -> Result<Vec<LifecycleEvent>, SessionError> {
        let mut events = core::mem::take(&mut self.pending);

        if self.endpoint.is_none() {
            let connect = tokio::time::timeout(self.config.connect_timeout, self.connect());
            match connect.await.unwrap_or(Err(SessionError::ConnectTimeout)) {
                Ok(endpoint) => {
                    tracing::info!(addr = %self.config.addr, "Connected to broker");
                    self.endpoint = Some(endpoint);
                    events.push(LifecycleEvent::Connected);
                }
                Err(e) => {
                    tokio::time::sleep(self.config.reconnect_interval).await;
                    self.pending = events;
                    return Err(e);
                }
            }
        }

        let Some(endpoint) = self.endpoint.as_ref() else {
            return Ok(events);
        };

        let topic = Topic::Outbound { device: self.device.clone() };
        while let Some(msg) = self.outbox.pop_front() {
            let packet_id = next_packet_id(&mut self.next_packet_id);
            if let Err(e) = publish(endpoint, packet_id, &topic, &msg).await {
                tracing::warn!("Dropping report: {e}");
            }
        }

        match tokio::time::timeout(self.config.poll_interval, endpoint.recv()).await {
            Err(_elapsed) => {}
            Ok(Ok(packet)) => events.extend(self.decode(packet)),
            Ok(Err(e)) => {
                tracing::warn!("Connection lost: {e}");
                self.endpoint = None;
                events.push(LifecycleEvent::Disconnected);
            }
        }

        Ok(events)
    }

    fn send(&mut self, msg: Outbound) -> Result<(), SessionError> {
        if self.outbox.len() >= self.config.outbox_limit {
            return Err(SessionError::OutboxFull(self.outbox.len()));
        }

        self.outbox.push_back(msg);
        Ok(())
    }

    /// Drops the connection and restarts the bind flow
    ///
    /// The broker address and client id come from [`MqttConfig`] and are not
    /// provisioned state, so the next poll reconnects with the same identity.
    fn reset_provisioning(&mut self) {
        tracing::warn!(device = %self.device, "Dropping provisioning");

        self.outbox.clear();
        if self.endpoint.take().is_some() {
            self.pending.push(LifecycleEvent::Disconnected);
        }
        self.pending.push(LifecycleEvent::BindStart);
    }
}
