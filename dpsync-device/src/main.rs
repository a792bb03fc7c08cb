use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use clap::Parser;
use dpsync::{
    Device,
    mqtt::{MqttConfig, MqttSession},
    peripherals::{Alert, Peripherals as _},
};

use self::{file_store::FileStore, peripherals::DevicePeripherals};

mod file_store;
mod peripherals;

#[derive(Parser)]
struct Args {
    /// Device ID assigned at activation
    device_id: String,

    /// MQTT broker address
    mqtt_addr: String,

    /// MQTT client ID, defaults to dpsync-<device id>
    #[arg(long)]
    client_id: Option<String>,

    /// Where persisted properties are kept
    #[arg(long, default_value = "dpsync-store.json")]
    store: PathBuf,

    /// Longest a single poll waits for inbound traffic, in milliseconds
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,

    /// Longest a broker handshake may take, in seconds
    #[arg(long, default_value_t = 5)]
    connect_secs: u64,

    /// Pause between connection attempts, in seconds
    #[arg(long, default_value_t = 5)]
    reconnect_secs: u64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dpsync::log::init();

    let args = Args::parse();

    let kv = FileStore::open(&args.store)
        .with_context(|| format!("failed to open store at {}", args.store.display()))?;

    let (mut peripherals, mut local_events) = DevicePeripherals::new();
    peripherals.play_alert(Alert::PowerOn, false);

    tokio::spawn(async move {
        while let Ok(event) = local_events.recv().await {
            tracing::info!(?event, "Local event");
        }
    });

    let client_id = args
        .client_id
        .clone()
        .unwrap_or_else(|| format!("dpsync-{}", args.device_id));

    let mut config = MqttConfig::new(client_id, &args.mqtt_addr);
    config.poll_interval = Duration::from_millis(args.poll_ms);
    config.connect_timeout = Duration::from_secs(args.connect_secs);
    config.reconnect_interval = Duration::from_secs(args.reconnect_secs);

    let session = MqttSession::new(config, args.device_id.as_str().into());

    let mut device = Device::new(args.device_id.as_str(), session, kv, peripherals);
    device.start().await.context("failed to start device")?;

    match device.run().await {}
}
