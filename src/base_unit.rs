// MIT License - Copyright (c) 2026 lifesos-lan-bridge contributors

use std::sync::{Arc, Mutex as StdMutex};

use chrono::NaiveDateTime;
use tokio::sync::{mpsc, watch, RwLock};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info};

use crate::config::BaseUnitConfig;
use crate::constants::{OperationMode, EVENT_LOG_SIZE};
use crate::devices::{BaseUnitRecord, Device, DeviceCategory, EnableStatusFlags};
use crate::error::{LifeSosError, Result};
use crate::event::{event_channel, EventReceiver, EventSender, Observer};
use crate::protocol::Command;
use crate::reconciler::Reconciler;
use crate::response::{DeviceInfo, DeviceSettings, EventLogEntry, Response};
use crate::transport::direct::DirectTcpTransport;
use crate::transport::{CommandEngine, Transport, TransportEvent};

/// Input to the event-processing task.
///
/// Protocol messages and the results of facade operations share one
/// channel so the reconciler sees them in order.
#[derive(Debug)]
pub enum Inbound {
    Transport(TransportEvent),
    DeviceSettingsChanged {
        device_id: u32,
        settings: DeviceSettings,
    },
    DeviceRemoved {
        device_id: u32,
    },
    DiscoveryComplete,
}

impl From<TransportEvent> for Inbound {
    fn from(event: TransportEvent) -> Self {
        Inbound::Transport(event)
    }
}

/// A connection to a LifeSOS base unit.
///
/// # Example
///
/// ```no_run
/// use lifesos_lan_bridge::{BaseUnit, BaseUnitConfig, OperationMode};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = BaseUnitConfig::builder()
///         .host("192.168.1.100")
///         .password("1234")
///         .build();
///
///     let mut base_unit = BaseUnit::connect(config).await?;
///
///     let mut events = base_unit.subscribe();
///     tokio::spawn(async move {
///         while let Ok(event) = events.recv().await {
///             println!("Event: {:?}", event);
///         }
///     });
///
///     base_unit.set_operation_mode(OperationMode::Home, None).await?;
///
///     tokio::signal::ctrl_c().await?;
///     base_unit.disconnect().await?;
///     Ok(())
/// }
/// ```
pub struct BaseUnit {
    config: BaseUnitConfig,
    transport: DirectTcpTransport,
    reconciler: Arc<RwLock<Reconciler>>,
    event_tx: EventSender,
    inbound_tx: mpsc::UnboundedSender<Inbound>,
    /// Receiver created with the channel, handed to the first subscriber
    first_rx: StdMutex<Option<EventReceiver>>,
    processor_handle: Option<JoinHandle<()>>,
    shutdown_tx: watch::Sender<bool>,
}

impl BaseUnit {
    /// Connect to the base unit and start processing its messages.
    ///
    /// With `auto_discover` set, initial state and enrolled devices are read
    /// in the background; `DiscoveryComplete` is emitted when done.
    pub async fn connect(config: BaseUnitConfig) -> Result<Self> {
        let (event_tx, event_rx) = event_channel(config.event_capacity);
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let transport = DirectTcpTransport::connect(&config, inbound_tx.clone()).await?;
        let reconciler = Arc::new(RwLock::new(Reconciler::new(event_tx.clone())));

        let processor_handle = spawn_event_loop(
            inbound_rx,
            shutdown_rx,
            reconciler.clone(),
            transport.engine().clone(),
            inbound_tx.clone(),
            config.clone(),
        );

        Ok(Self {
            config,
            transport,
            reconciler,
            event_tx,
            inbound_tx,
            first_rx: StdMutex::new(Some(event_rx)),
            processor_handle: Some(processor_handle),
            shutdown_tx,
        })
    }

    /// Subscribe to base unit events.
    ///
    /// The first subscriber also receives events emitted before it
    /// subscribed, up to the channel capacity.
    pub fn subscribe(&self) -> EventReceiver {
        if let Ok(mut first) = self.first_rx.lock() {
            if let Some(rx) = first.take() {
                return rx;
            }
        }
        self.event_tx.subscribe()
    }

    /// Register an observer, notified synchronously for every event.
    pub async fn add_observer(&self, observer: impl Observer + 'static) {
        self.reconciler.write().await.add_observer(Box::new(observer));
    }

    pub fn config(&self) -> &BaseUnitConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    // --- State accessors ---

    /// Get a snapshot of the base unit state.
    pub async fn state(&self) -> BaseUnitRecord {
        self.reconciler.read().await.base_unit().clone()
    }

    /// Get a snapshot of all enrolled devices.
    pub async fn devices(&self) -> Vec<Device> {
        self.reconciler.read().await.devices()
    }

    /// Get a specific device by its ID.
    pub async fn device(&self, device_id: u32) -> Option<Device> {
        self.reconciler.read().await.device(device_id).cloned()
    }

    // --- Commands ---

    /// Clear the alarm/warning LEDs on the base unit and stop the siren.
    pub async fn clear_status(&self, password: Option<&str>) -> Result<()> {
        self.engine()
            .execute(&Command::ClearStatus, password, None)
            .await?;
        Ok(())
    }

    /// Put the base unit into enrollment mode for a category.
    ///
    /// The enrolled device is picked up automatically once the base unit
    /// reports it.
    pub async fn add_device(&self, category: DeviceCategory) -> Result<()> {
        let command = Command::AddDevice { category };
        match self.engine().execute(&command, None, None).await? {
            Response::DeviceAdding { .. } | Response::DeviceAdded(_) => Ok(()),
            other => Err(unexpected(&command, &other)),
        }
    }

    /// Change the zone and enable status of an enrolled device.
    pub async fn change_device(
        &self,
        device_id: u32,
        group_number: u8,
        unit_number: u8,
        enable_status: EnableStatusFlags,
    ) -> Result<()> {
        let (device, index) = self.lookup(device_id).await?;
        let command = Command::ChangeDevice {
            category: device.category,
            index,
            group_number,
            unit_number,
            enable_status,
        };
        match self.engine().execute(&command, None, None).await? {
            Response::DeviceChanged(settings) => self
                .inbound_tx
                .send(Inbound::DeviceSettingsChanged {
                    device_id,
                    settings,
                })
                .map_err(|_| LifeSosError::ChannelClosed),
            other => Err(unexpected(&command, &other)),
        }
    }

    /// Remove an enrolled device.
    pub async fn delete_device(&self, device_id: u32) -> Result<()> {
        let (device, index) = self.lookup(device_id).await?;
        let command = Command::DeleteDevice {
            category: device.category,
            index,
        };
        match self.engine().execute(&command, None, None).await? {
            Response::DeviceDeleted { .. } => self
                .inbound_tx
                .send(Inbound::DeviceRemoved { device_id })
                .map_err(|_| LifeSosError::ChannelClosed),
            other => Err(unexpected(&command, &other)),
        }
    }

    /// Get the base unit clock.
    pub async fn get_datetime(&self) -> Result<NaiveDateTime> {
        let command = Command::GetDateTime;
        match self.engine().execute(&command, None, None).await? {
            Response::DateTime { value, .. } => Ok(value),
            other => Err(unexpected(&command, &other)),
        }
    }

    /// Set the base unit clock, to local time when `value` is `None`.
    pub async fn set_datetime(&self, value: Option<NaiveDateTime>) -> Result<()> {
        let command = match value {
            Some(value) => Command::SetDateTime { value },
            None => Command::set_datetime_now(),
        };
        self.engine().execute(&command, None, None).await?;
        Ok(())
    }

    /// Read an entry from the event log; `None` when there is none at `index`.
    ///
    /// The log is a ring of 512 entries. Any entry reports the index of the
    /// latest one in `last_index`; to read the whole log, walk down from
    /// there to 0 and then from 511 to `last_index + 1`.
    pub async fn get_event_log(&self, index: u16) -> Result<Option<EventLogEntry>> {
        if index >= EVENT_LOG_SIZE {
            return Err(LifeSosError::format(format!(
                "event log index {} out of range (0-{})",
                index,
                EVENT_LOG_SIZE - 1
            )));
        }
        let command = Command::GetEventLog { index };
        match self.engine().execute(&command, None, None).await? {
            Response::EventLog(entry) => Ok(Some(entry)),
            Response::EventLogNotFound => Ok(None),
            other => Err(unexpected(&command, &other)),
        }
    }

    /// Change the operation mode.
    pub async fn set_operation_mode(
        &self,
        mode: OperationMode,
        password: Option<&str>,
    ) -> Result<()> {
        self.engine()
            .execute(&Command::SetOpMode { mode }, password, None)
            .await?;
        Ok(())
    }

    pub async fn set_exit_delay(&self, seconds: u8) -> Result<()> {
        self.engine()
            .execute(&Command::SetExitDelay { seconds }, None, None)
            .await?;
        Ok(())
    }

    pub async fn set_entry_delay(&self, seconds: u8) -> Result<()> {
        self.engine()
            .execute(&Command::SetEntryDelay { seconds }, None, None)
            .await?;
        Ok(())
    }

    /// Disconnect from the base unit and stop processing.
    pub async fn disconnect(&mut self) -> Result<()> {
        info!("Disconnecting from base unit");
        let result = self.transport.disconnect().await;

        // Let the event loop record the disconnect before it stops
        let _ = self
            .inbound_tx
            .send(Inbound::Transport(TransportEvent::Disconnected));
        let _ = self.shutdown_tx.send(true);
        if let Some(handle) = self.processor_handle.take() {
            let _ = handle.await;
        }
        result
    }

    fn engine(&self) -> &Arc<CommandEngine> {
        self.transport.engine()
    }

    /// Find a device and its current index on the base unit.
    ///
    /// Indexes shift as devices are removed, so it is read fresh by zone.
    async fn lookup(&self, device_id: u32) -> Result<(Device, u8)> {
        let device = self
            .device(device_id)
            .await
            .ok_or(LifeSosError::UnknownDevice { device_id })?;
        let command = Command::GetDevice {
            category: device.category,
            group_number: device.group_number,
            unit_number: device.unit_number,
        };
        match self.engine().execute(&command, None, None).await? {
            Response::DeviceInfo(DeviceInfo {
                index: Some(index), ..
            }) => Ok((device, index)),
            Response::DeviceNotFound { .. } => Err(LifeSosError::DeviceNotFound { device_id }),
            other => Err(unexpected(&command, &other)),
        }
    }
}

impl Drop for BaseUnit {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(h) = self.processor_handle.take() {
            h.abort();
        }
    }
}

fn unexpected(command: &Command, response: &Response) -> LifeSosError {
    LifeSosError::UnexpectedResponse {
        command: command.name(),
        details: format!("{response:?}"),
    }
}

/// Spawn the task that owns all writes to the reconciler.
fn spawn_event_loop(
    mut inbound_rx: mpsc::UnboundedReceiver<Inbound>,
    mut shutdown_rx: watch::Receiver<bool>,
    reconciler: Arc<RwLock<Reconciler>>,
    engine: Arc<CommandEngine>,
    inbound_tx: mpsc::UnboundedSender<Inbound>,
    config: BaseUnitConfig,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        // Discovery and follow-up commands; aborted when this task ends
        let mut tasks = JoinSet::new();
        loop {
            let inbound = tokio::select! {
                biased;
                inbound = inbound_rx.recv() => match inbound {
                    Some(inbound) => inbound,
                    None => break,
                },
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        // Drain what is already queued, then stop
                        while let Ok(inbound) = inbound_rx.try_recv() {
                            process(inbound, &reconciler, &engine, &inbound_tx, &config, &mut tasks)
                                .await;
                        }
                        break;
                    }
                    continue;
                }
                Some(_) = tasks.join_next(), if !tasks.is_empty() => continue,
            };
            process(inbound, &reconciler, &engine, &inbound_tx, &config, &mut tasks).await;
        }
        debug!("Event loop shutting down");
    })
}

async fn process(
    inbound: Inbound,
    reconciler: &RwLock<Reconciler>,
    engine: &Arc<CommandEngine>,
    inbound_tx: &mpsc::UnboundedSender<Inbound>,
    config: &BaseUnitConfig,
    tasks: &mut JoinSet<()>,
) {
    let mut state = reconciler.write().await;
    match inbound {
        Inbound::Transport(TransportEvent::Connected) => {
            state.set_connected(true);
            if config.auto_discover {
                tasks.spawn(discover(
                    engine.clone(),
                    inbound_tx.clone(),
                    config.retry_max,
                ));
            }
        }
        Inbound::Transport(TransportEvent::Disconnected) => state.set_connected(false),
        Inbound::Transport(TransportEvent::Message(message)) => {
            if let Some(command) = state.handle_message(&message) {
                let engine = engine.clone();
                let retry_max = config.retry_max;
                tasks.spawn(async move {
                    let description = format!("new device ({})", command.format(""));
                    engine.execute_retry(&command, &description, retry_max).await;
                });
            }
        }
        Inbound::DeviceSettingsChanged {
            device_id,
            settings,
        } => state.apply_device_settings(device_id, &settings),
        Inbound::DeviceRemoved { device_id } => {
            state.remove_device(device_id);
        }
        Inbound::DiscoveryComplete => state.discovery_complete(),
    }
}

/// Read initial state and every enrolled device.
///
/// Responses reach the reconciler through the reader task like any other
/// message; this only drives the queries.
async fn discover(
    engine: Arc<CommandEngine>,
    inbound_tx: mpsc::UnboundedSender<Inbound>,
    retry_max: u32,
) {
    info!("Discovering devices and getting initial state...");

    engine
        .execute_retry(&Command::GetRomVersion, "ROM version", retry_max)
        .await;
    engine
        .execute_retry(&Command::GetOpMode, "initial operation mode", retry_max)
        .await;
    engine
        .execute_retry(&Command::GetExitDelay, "exit delay", retry_max)
        .await;
    engine
        .execute_retry(&Command::GetEntryDelay, "entry delay", retry_max)
        .await;

    for category in DeviceCategory::ALL {
        let Some(max_devices) = category.max_devices() else {
            continue;
        };
        for index in 0..max_devices {
            let Ok(index) = u8::try_from(index) else {
                break;
            };
            debug!("Getting {} device #{}", category.description(), index);
            let description = format!("{} device #{}", category.description(), index);
            let response = engine
                .execute_retry(
                    &Command::GetDeviceByIndex { category, index },
                    &description,
                    retry_max,
                )
                .await;
            if matches!(response, None | Some(Response::DeviceNotFound { .. })) {
                break;
            }
        }
    }

    if engine.is_connected() {
        let _ = inbound_tx.send(Inbound::DiscoveryComplete);
    }
}
