// MIT License - Copyright (c) 2026 lifesos-lan-bridge contributors
//
//! # lifesos-lan-bridge
//!
//! TCP/IP client for LifeSOS alarm base units (LS-10, LS-20 and LS-30),
//! over the base unit's LAN interface or a serial-to-Ethernet adapter.
//!
//! The client tracks the base unit's operation mode and arming state, and
//! the enrolled devices. Changes are published as [`BaseUnitEvent`]s.
//!
//! ## Quick Start
//!
//! ```no_run
//! use lifesos_lan_bridge::{BaseUnit, BaseUnitConfig, BaseUnitEvent};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = BaseUnitConfig::builder()
//!         .host("192.168.1.100")
//!         .port(1680)
//!         .password("1234")
//!         .build();
//!
//!     let mut base_unit = BaseUnit::connect(config).await?;
//!
//!     let mut events = base_unit.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             if let BaseUnitEvent::PropertyChanged(change) = event {
//!                 println!("{}: {:?}", change.name, change.new_value);
//!             }
//!         }
//!     });
//!
//!     tokio::signal::ctrl_c().await?;
//!     base_unit.disconnect().await?;
//!     Ok(())
//! }
//! ```

pub mod base_unit;
pub mod codec;
pub mod config;
pub mod constants;
pub mod contact_id;
pub mod device_event;
pub mod devices;
pub mod error;
pub mod event;
pub mod protocol;
pub mod reconciler;
pub mod response;
pub mod transport;

// Re-exports for convenience
pub use base_unit::BaseUnit;
pub use config::{BaseUnitConfig, BaseUnitConfigBuilder};
pub use constants::{
    BaseUnitState, ContactIdEventCode, DeviceEventCode, DeviceType, OperationMode,
};
pub use contact_id::ContactId;
pub use devices::{
    BaseUnitRecord, CharacteristicsFlags, Device, DeviceCategory, EnableStatusFlags,
};
pub use error::{LifeSosError, Result};
pub use event::{
    BaseUnitEvent, EventReceiver, Observer, ObserverError, PropertyChange, PropertyValue,
};
pub use protocol::Command;
pub use response::{EventLogEntry, Response};
