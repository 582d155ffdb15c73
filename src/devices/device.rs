// MIT License - Copyright (c) 2026 lifesos-lan-bridge contributors

use crate::constants::{DeviceEventCode, DeviceType};
use crate::device_event::DeviceEvent;
use crate::devices::category::DeviceCategory;
use crate::devices::flags::{CharacteristicsFlags, EnableStatusFlags};
use crate::event::PropertyChange;
use crate::response::{DeviceInfo, DeviceSettings};

/// A device enrolled on the base unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub device_id: u32,
    pub category: DeviceCategory,
    pub device_type: u8,
    pub message_attribute: u8,
    pub characteristics: CharacteristicsFlags,
    pub enable_status: EnableStatusFlags,
    pub group_number: u8,
    pub unit_number: u8,
    /// Only door magnets report open/closed.
    pub is_closed: Option<bool>,
    pub rssi_db: u8,
    pub rssi_bars: u8,
}

impl Device {
    pub fn from_info(info: &DeviceInfo) -> Self {
        let signal = info.signal_strength();
        Self {
            device_id: info.device_id,
            category: info.category,
            device_type: info.device_type,
            message_attribute: info.message_attribute,
            characteristics: info.characteristics,
            enable_status: info.enable_status,
            group_number: info.group_number,
            unit_number: info.unit_number,
            is_closed: info.is_closed(),
            rssi_db: signal.db,
            rssi_bars: signal.bars,
        }
    }

    pub fn device_type(&self) -> Option<DeviceType> {
        DeviceType::from_u8(self.device_type)
    }

    /// Zone display string `gg-uu`.
    pub fn zone(&self) -> String {
        format!("{:02x}-{:02x}", self.group_number, self.unit_number)
    }

    /// Refresh from a device info response, returning what changed.
    pub fn apply_info(&mut self, info: &DeviceInfo) -> Vec<PropertyChange> {
        let signal = info.signal_strength();
        [
            PropertyChange::track("device_type", &mut self.device_type, info.device_type),
            PropertyChange::track(
                "message_attribute",
                &mut self.message_attribute,
                info.message_attribute,
            ),
            PropertyChange::track("characteristics", &mut self.characteristics, info.characteristics),
            PropertyChange::track("enable_status", &mut self.enable_status, info.enable_status),
            PropertyChange::track("group_number", &mut self.group_number, info.group_number),
            PropertyChange::track("unit_number", &mut self.unit_number, info.unit_number),
            PropertyChange::track("is_closed", &mut self.is_closed, info.is_closed()),
            PropertyChange::track("rssi_db", &mut self.rssi_db, signal.db),
            PropertyChange::track("rssi_bars", &mut self.rssi_bars, signal.bars),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Apply settings confirmed by the base unit after a change.
    pub fn apply_settings(&mut self, settings: &DeviceSettings) -> Vec<PropertyChange> {
        [
            PropertyChange::track("enable_status", &mut self.enable_status, settings.enable_status),
            PropertyChange::track("group_number", &mut self.group_number, settings.group_number),
            PropertyChange::track("unit_number", &mut self.unit_number, settings.unit_number),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Refresh signal strength and open/closed state from a device event.
    pub fn apply_event(&mut self, event: &DeviceEvent) -> Vec<PropertyChange> {
        let signal = event.signal_strength();
        let is_closed = match event.event() {
            Some(DeviceEventCode::Open) => Some(false),
            Some(DeviceEventCode::Close) => Some(true),
            _ => self.is_closed,
        };
        [
            PropertyChange::track("is_closed", &mut self.is_closed, is_closed),
            PropertyChange::track("rssi_db", &mut self.rssi_db, signal.db),
            PropertyChange::track("rssi_bars", &mut self.rssi_bars, signal.bars),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}
