// MIT License - Copyright (c) 2026 lifesos-lan-bridge contributors

use crate::constants::{BaseUnitState, OperationMode};
use crate::event::PropertyChange;

/// Tracked state of the base unit itself.
///
/// Every setter returns the change it made, if any, so the caller can
/// notify observers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseUnitRecord {
    pub is_connected: bool,
    pub rom_version: Option<String>,
    pub operation_mode: Option<OperationMode>,
    /// Operation mode plus the exit/entry delay sub-states
    pub state: Option<BaseUnitState>,
    pub exit_delay: Option<u32>,
    pub entry_delay: Option<u32>,
}

impl BaseUnitRecord {
    pub fn set_connected(&mut self, value: bool) -> Option<PropertyChange> {
        PropertyChange::track("is_connected", &mut self.is_connected, value)
    }

    pub fn set_rom_version(&mut self, value: String) -> Option<PropertyChange> {
        PropertyChange::track("rom_version", &mut self.rom_version, Some(value))
    }

    pub fn set_operation_mode(&mut self, value: OperationMode) -> Option<PropertyChange> {
        PropertyChange::track("operation_mode", &mut self.operation_mode, Some(value))
    }

    pub fn set_state(&mut self, value: BaseUnitState) -> Option<PropertyChange> {
        PropertyChange::track("state", &mut self.state, Some(value))
    }

    pub fn set_exit_delay(&mut self, value: u32) -> Option<PropertyChange> {
        PropertyChange::track("exit_delay", &mut self.exit_delay, Some(value))
    }

    pub fn set_entry_delay(&mut self, value: u32) -> Option<PropertyChange> {
        PropertyChange::track("entry_delay", &mut self.entry_delay, Some(value))
    }
}
