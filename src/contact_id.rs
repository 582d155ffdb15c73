// MIT License - Copyright (c) 2026 lifesos-lan-bridge contributors

//! Contact ID messages.
//!
//! The base unit reports alarm events as a 16 digit variant of the Ademco
//! Contact ID format, wrapped in parentheses on the wire:
//!
//! ```text
//! AAAA TT Q EEE GG C ZZ S
//! |    |  | |   |  | |  checksum digit
//! |    |  | |   |  | zone (unit) or user
//! |    |  | |   |  device category index
//! |    |  | |   group or partition
//! |    |  | event code
//! |    |  event qualifier
//! |    message type
//! account number
//! ```

use crate::codec;
use crate::constants::{
    ContactIdEventCategory, ContactIdEventCode, ContactIdEventQualifier, MessageType,
};
use crate::devices::category::DeviceCategory;
use crate::error::{LifeSosError, Result};

/// Number of symbols in a Contact ID payload.
pub const CONTACT_ID_LENGTH: usize = 16;

/// A decoded Contact ID message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactId {
    pub account_number: u32,
    pub message_type: u8,
    pub event_qualifier: u8,
    pub event_code: u16,
    pub device_category: Option<DeviceCategory>,
    /// Group number; absent for base unit messages.
    pub group_number: Option<u8>,
    /// Unit number; absent for base unit messages.
    pub unit_number: Option<u8>,
    /// User that triggered a base unit message, if any.
    pub user_id: Option<u8>,
    pub checksum: u8,
}

impl ContactId {
    /// Decode a 16 symbol payload (without the surrounding parentheses).
    pub fn parse(text: &str) -> Result<Self> {
        if text.len() != CONTACT_ID_LENGTH || !text.is_ascii() {
            return Err(LifeSosError::ContactIdLength { length: text.len() });
        }

        let mut sum = 0u32;
        for pos in 0..CONTACT_ID_LENGTH {
            let digit = codec::decode(&text[pos..pos + 1])?;
            sum += if digit == 0 { 10 } else { digit };
        }
        if sum % 15 != 0 {
            return Err(LifeSosError::ContactIdChecksum);
        }

        let account_number = codec::decode(&text[0..4])?;
        let message_type = codec::decode(&text[4..6])? as u8;
        let event_qualifier = codec::decode(&text[6..7])? as u8;
        let event_code = codec::decode(&text[7..10])? as u16;
        let group_partition = codec::decode(&text[10..12])? as u8;
        let device_category = DeviceCategory::from_index(codec::decode(&text[12..13])?);
        let zone_user = codec::decode(&text[13..15])? as u8;
        let checksum = codec::decode(&text[15..16])? as u8;

        if MessageType::from_u8(message_type).is_none() {
            return Err(LifeSosError::InvalidMessageType {
                message_type: message_type as u32,
            });
        }

        let (group_number, unit_number, user_id) =
            if device_category == Some(DeviceCategory::BaseUnit) {
                (None, None, (zone_user != 0).then_some(zone_user))
            } else {
                (Some(group_partition), Some(zone_user), None)
            };

        Ok(Self {
            account_number,
            message_type,
            event_qualifier,
            event_code,
            device_category,
            group_number,
            unit_number,
            user_id,
            checksum,
        })
    }

    /// Encode into the 16 symbol wire form, computing the checksum digit.
    pub fn to_wire_string(&self) -> String {
        let (group_partition, zone_user) = match (self.group_number, self.unit_number) {
            (Some(group), Some(unit)) => (group, unit),
            _ => (0, self.user_id.unwrap_or(0)),
        };
        let category_index = self.device_category.map_or(0, |dc| dc.index());
        let body = format!(
            "{:04x}{:02x}{:01x}{:03x}{:02x}{:01x}{:02x}",
            self.account_number & 0xffff,
            self.message_type,
            self.event_qualifier & 0xf,
            self.event_code & 0xfff,
            group_partition,
            category_index,
            zone_user,
        );
        let sum: u32 = body
            .chars()
            .filter_map(|c| c.to_digit(16))
            .map(|d| if d == 0 { 10 } else { d })
            .sum();
        let checksum = match (15 - sum % 15) % 15 {
            0 => 15,
            n => n,
        };
        format!("{body}{checksum:x}")
    }

    pub fn event(&self) -> Option<ContactIdEventCode> {
        ContactIdEventCode::from_u16(self.event_code)
    }

    pub fn qualifier(&self) -> Option<ContactIdEventQualifier> {
        ContactIdEventQualifier::from_u8(self.event_qualifier)
    }

    pub fn category(&self) -> Option<ContactIdEventCategory> {
        ContactIdEventCategory::of_code(self.event_code)
    }

    /// Zone display string `gg-uu`, absent for base unit messages.
    pub fn zone(&self) -> Option<String> {
        match (self.group_number, self.unit_number) {
            (Some(group), Some(unit)) => Some(format!("{group:02x}-{unit:02x}")),
            _ => None,
        }
    }
}
