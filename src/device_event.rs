// MIT License - Copyright (c) 2026 lifesos-lan-bridge contributors

use crate::codec;
use crate::constants::{DeviceEventCode, DeviceType, DEVICE_EVENT_PREFIX};
use crate::devices::flags::CharacteristicsFlags;
use crate::error::{LifeSosError, Result};

/// Shortest device event line that carries every field.
pub const DEVICE_EVENT_MIN_LENGTH: usize = 25;

/// Signal strength derived from a device's current status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignalStrength {
    /// Received signal strength, 0-99 dB
    pub db: u8,
    /// Signal bars, 0-4
    pub bars: u8,
}

impl SignalStrength {
    pub fn from_status(current_status: u8) -> Self {
        let db = current_status.saturating_sub(0x40).min(99);
        let bars = match db {
            0..=44 => 0,
            45..=59 => 1,
            60..=74 => 2,
            75..=89 => 3,
            _ => 4,
        };
        Self { db, bars }
    }
}

/// An event raised by an enrolled device (`MINPIC=` line).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEvent {
    pub event_code: u16,
    pub device_type: u8,
    pub device_id: u32,
    pub message_attribute: u8,
    pub characteristics: CharacteristicsFlags,
    pub current_status: u8,
}

impl DeviceEvent {
    /// Decode a complete `MINPIC=` line.
    pub fn parse(text: &str) -> Result<Self> {
        if text.len() < DEVICE_EVENT_MIN_LENGTH || !text.is_ascii() {
            return Err(LifeSosError::DeviceEventLength { length: text.len() });
        }
        if !text.starts_with(DEVICE_EVENT_PREFIX) {
            return Err(LifeSosError::format(format!("not a device event: {text}")));
        }

        Ok(Self {
            event_code: codec::decode(&text[7..11])? as u16,
            device_type: codec::decode(&text[11..13])? as u8,
            device_id: codec::decode(&text[13..19])?,
            message_attribute: codec::decode(&text[19..21])? as u8,
            characteristics: CharacteristicsFlags::from_bits_retain(
                codec::decode(&text[21..23])? as u8,
            ),
            current_status: codec::decode(&text[23..25])? as u8,
        })
    }

    pub fn event(&self) -> Option<DeviceEventCode> {
        DeviceEventCode::from_u16(self.event_code)
    }

    pub fn device_type(&self) -> Option<DeviceType> {
        DeviceType::from_u8(self.device_type)
    }

    pub fn signal_strength(&self) -> SignalStrength {
        SignalStrength::from_status(self.current_status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_door_magnet_open() {
        let event = DeviceEvent::parse("MINPIC=0a404020fccd00109a4fff").unwrap();
        assert_eq!(event.event(), Some(DeviceEventCode::Open));
        assert_eq!(event.device_type(), Some(DeviceType::DoorMagnet));
        assert_eq!(event.device_id, 2161869);
        assert_eq!(event.message_attribute, 0);
        assert_eq!(event.characteristics, CharacteristicsFlags::SUPERVISORY);
        assert_eq!(event.current_status, 154);
        assert_eq!(event.signal_strength(), SignalStrength { db: 90, bars: 4 });
    }

    #[test]
    fn test_all_zero_line() {
        let event = DeviceEvent::parse("MINPIC=0000000000000000000000").unwrap();
        assert_eq!(event.event_code, 0);
        assert_eq!(event.event(), None);
        assert_eq!(event.signal_strength(), SignalStrength { db: 0, bars: 0 });
    }

    #[test]
    fn test_short_line_rejected() {
        assert!(matches!(
            DeviceEvent::parse("MINPIC=0a404020fccd"),
            Err(LifeSosError::DeviceEventLength { length: 19 })
        ));
        assert!(matches!(
            DeviceEvent::parse("MINPIC=0"),
            Err(LifeSosError::DeviceEventLength { .. })
        ));
    }

    #[test]
    fn test_signal_strength_thresholds() {
        assert_eq!(SignalStrength::from_status(0x20), SignalStrength { db: 0, bars: 0 });
        assert_eq!(SignalStrength::from_status(0x40 + 44).bars, 0);
        assert_eq!(SignalStrength::from_status(0x40 + 45).bars, 1);
        assert_eq!(SignalStrength::from_status(0x40 + 60).bars, 2);
        assert_eq!(SignalStrength::from_status(0x40 + 75).bars, 3);
        assert_eq!(SignalStrength::from_status(0x40 + 90).bars, 4);
        assert_eq!(SignalStrength::from_status(0xff).db, 99);
    }
}
