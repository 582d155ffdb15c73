// MIT License - Copyright (c) 2026 lifesos-lan-bridge contributors
// Event monitor

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

use lifesos_lan_bridge::{
    BaseUnit, BaseUnitConfig, BaseUnitEvent, BaseUnitRecord, ContactId, Device, PropertyValue,
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "lifesos-monitor")]
#[command(about = "Print events from a LifeSOS base unit as JSON lines")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: String,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Config {
    base_unit: BaseUnitToml,
    /// Friendly names keyed by device id in hex, e.g. `f01a7a = "Hallway PIR"`
    #[serde(default, deserialize_with = "deserialize_device_names")]
    device_names: HashMap<u32, String>,
}

fn deserialize_device_names<'de, D>(deserializer: D) -> Result<HashMap<u32, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let string_map: HashMap<String, String> = HashMap::deserialize(deserializer)?;
    string_map
        .into_iter()
        .map(|(k, v)| {
            u32::from_str_radix(&k, 16)
                .map(|id| (id, v))
                .map_err(|_| serde::de::Error::custom(format!("invalid device ID: {k}")))
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct BaseUnitToml {
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default)]
    password: String,
    #[serde(default = "default_command_timeout")]
    command_timeout_secs: u64,
    #[serde(default = "default_retry_max")]
    retry_max: u32,
    #[serde(default = "default_connect_timeout")]
    connect_timeout_secs: u64,
}

fn default_port() -> u16 {
    1680
}
fn default_command_timeout() -> u64 {
    8
}
fn default_retry_max() -> u32 {
    3
}
fn default_connect_timeout() -> u64 {
    10
}

fn build_base_unit_config(toml: &BaseUnitToml) -> BaseUnitConfig {
    BaseUnitConfig::builder()
        .host(&toml.host)
        .port(toml.port)
        .password(&toml.password)
        .command_timeout(Duration::from_secs(toml.command_timeout_secs))
        .retry_max(toml.retry_max)
        .connect_timeout(Duration::from_secs(toml.connect_timeout_secs))
        .build()
}

// ---------------------------------------------------------------------------
// JSON output
// ---------------------------------------------------------------------------

// Every line shares the flat {now, op, ...} structure

#[derive(Serialize)]
struct SnapshotMessage {
    now: u64,
    op: &'static str,
    connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    rom_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    operation_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exit_delay: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    entry_delay: Option<u32>,
    devices: Vec<DeviceJson>,
}

#[derive(Serialize)]
struct DeviceJson {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    category: &'static str,
    #[serde(rename = "type")]
    device_type: String,
    zone: String,
    enable_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    closed: Option<bool>,
    rssi_db: u8,
    rssi_bars: u8,
}

#[derive(Serialize)]
struct EventMessage {
    now: u64,
    op: &'static str,
    #[serde(flatten)]
    body: Value,
}

struct Printer {
    device_names: HashMap<u32, String>,
}

impl Printer {
    fn device_json(&self, device: &Device) -> DeviceJson {
        DeviceJson {
            id: format!("{:06x}", device.device_id),
            name: self.device_names.get(&device.device_id).cloned(),
            category: device.category.description(),
            device_type: device
                .device_type()
                .map(|t| format!("{t:?}"))
                .unwrap_or_else(|| format!("{:02x}", device.device_type)),
            zone: device.zone(),
            enable_status: device.enable_status.describe(),
            closed: device.is_closed,
            rssi_db: device.rssi_db,
            rssi_bars: device.rssi_bars,
        }
    }

    fn snapshot(&self, record: &BaseUnitRecord, devices: &[Device]) -> Result<String> {
        let message = SnapshotMessage {
            now: now_secs(),
            op: "snapshot",
            connected: record.is_connected,
            rom_version: record.rom_version.clone(),
            operation_mode: record.operation_mode.map(|m| m.as_str()),
            state: record.state.map(|s| s.as_str()),
            exit_delay: record.exit_delay,
            entry_delay: record.entry_delay,
            devices: devices.iter().map(|d| self.device_json(d)).collect(),
        };
        Ok(serde_json::to_string(&message)?)
    }

    fn event(&self, event: &BaseUnitEvent) -> Result<Option<String>> {
        let (op, body) = match event {
            BaseUnitEvent::PropertyChanged(change) => (
                "property",
                json!({
                    "name": change.name,
                    "old": property_json(&change.old_value),
                    "new": property_json(&change.new_value),
                }),
            ),
            BaseUnitEvent::DiscoveryComplete => return Ok(None),
            BaseUnitEvent::DeviceAdded(device) => {
                ("device_added", serde_json::to_value(self.device_json(device))?)
            }
            BaseUnitEvent::DeviceDeleted(device) => {
                ("device_deleted", serde_json::to_value(self.device_json(device))?)
            }
            BaseUnitEvent::DevicePropertyChanged { device_id, change } => (
                "device_property",
                json!({
                    "id": format!("{device_id:06x}"),
                    "device": self.device_names.get(device_id),
                    "name": change.name,
                    "old": property_json(&change.old_value),
                    "new": property_json(&change.new_value),
                }),
            ),
            BaseUnitEvent::DeviceEvent {
                device_id,
                event_code,
            } => (
                "device_event",
                json!({
                    "id": format!("{device_id:06x}"),
                    "device": self.device_names.get(device_id),
                    "event": format!("{event_code:?}"),
                }),
            ),
            BaseUnitEvent::ContactId(contact_id) => ("contact_id", contact_id_json(contact_id)),
        };
        let message = EventMessage {
            now: now_secs(),
            op,
            body,
        };
        Ok(Some(serde_json::to_string(&message)?))
    }
}

fn property_json(value: &PropertyValue) -> Value {
    match value {
        PropertyValue::None => Value::Null,
        PropertyValue::Bool(b) => json!(b),
        PropertyValue::Number(n) => json!(n),
        PropertyValue::Text(s) => json!(s),
        PropertyValue::OperationMode(mode) => json!(mode.as_str()),
        PropertyValue::State(state) => json!(state.as_str()),
        PropertyValue::EnableStatus(flags) => json!(flags.describe()),
        PropertyValue::Characteristics(flags) => json!(flags.describe()),
    }
}

fn contact_id_json(contact_id: &ContactId) -> Value {
    json!({
        "event": contact_id
            .event()
            .map(|e| format!("{e:?}"))
            .unwrap_or_else(|| format!("{:03x}", contact_id.event_code)),
        "qualifier": contact_id.qualifier().map(|q| format!("{q:?}")),
        "category": contact_id.device_category.map(|c| c.description()),
        "zone": contact_id.zone(),
        "user": contact_id.user_id,
    })
}

fn now_secs() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

fn is_disconnect(event: &BaseUnitEvent) -> bool {
    matches!(
        event,
        BaseUnitEvent::PropertyChanged(change)
            if change.name == "is_connected" && change.new_value == PropertyValue::Bool(false)
    )
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity (e.g. RUST_LOG=debug or RUST_LOG=lifesos_lan_bridge=trace).
    // Default: info.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // systemd journal already adds timestamps, so omit them when running under systemd
    if std::env::var_os("JOURNAL_STREAM").is_some() {
        tracing_subscriber::fmt()
            .without_time()
            .with_writer(std::io::stderr)
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(env_filter)
            .init();
    }

    let cli = Cli::parse();
    let text = std::fs::read_to_string(&cli.config)
        .with_context(|| format!("Failed to read config file {}", cli.config))?;
    let config: Config = toml::from_str(&text).context("Failed to parse config file")?;

    let mut base_unit = BaseUnit::connect(build_base_unit_config(&config.base_unit))
        .await
        .context("Failed to connect to base unit")?;
    let mut events = base_unit.subscribe();
    let printer = Printer {
        device_names: config.device_names,
    };

    let mut sigterm = signal(SignalKind::terminate())?;
    info!("Monitor running. Send SIGINT/SIGTERM to stop.");

    let lost = loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    if let Some(line) = printer.event(&event)? {
                        println!("{line}");
                    }
                    if matches!(event, BaseUnitEvent::DiscoveryComplete) {
                        let line = printer.snapshot(&base_unit.state().await, &base_unit.devices().await)?;
                        println!("{line}");
                    }
                    if is_disconnect(&event) {
                        break true;
                    }
                }
                Err(RecvError::Lagged(n)) => warn!("Output fell behind, skipped {} events", n),
                Err(RecvError::Closed) => break true,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Received SIGINT, shutting down...");
                break false;
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
                break false;
            }
        }
    };

    if lost {
        error!("Connection to base unit lost");
        anyhow::bail!("Connection to base unit lost");
    }

    base_unit.disconnect().await?;
    Ok(())
}
