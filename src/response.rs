// MIT License - Copyright (c) 2026 lifesos-lan-bridge contributors

//! Responses from the base unit.
//!
//! Response lines are `! <text> &`; the parser works on the lowercased text
//! with the markers already stripped. Each variant corresponds to one kind of
//! reply, and every variant can report the command name it answers so the
//! command engine can hand it to the waiting caller.

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime};

use crate::codec;
use crate::constants::{
    DeviceType, OperationMode, ACTION_ADD, ACTION_DEL, ACTION_SET, CMD_CLEAR_STATUS,
    CMD_DATETIME, CMD_DEVBYIDX_PREFIX, CMD_DEVICE_PREFIX, CMD_ENTRY_DELAY, CMD_EVENT_LOG,
    CMD_EXIT_DELAY, CMD_OPMODE, CMD_ROMVER, RESPONSE_ERROR,
};
use crate::device_event::SignalStrength;
use crate::devices::category::DeviceCategory;
use crate::devices::flags::{CharacteristicsFlags, EnableStatusFlags};
use crate::error::{LifeSosError, Result};

/// A decoded response line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// `dt` - base unit clock.
    DateTime { value: NaiveDateTime, was_set: bool },
    /// `n0` - operation mode.
    OpMode { mode: OperationMode, was_set: bool },
    /// `l0` - exit delay in seconds.
    ExitDelay { seconds: u32, was_set: bool },
    /// `l1` - entry delay in seconds.
    EntryDelay { seconds: u32, was_set: bool },
    /// `vn` - ROM version.
    RomVersion { version: String },
    /// `l5` - status cleared.
    ClearedStatus,
    /// `k`/`i` - no device at the requested index or zone.
    DeviceNotFound {
        command_name: String,
        category: DeviceCategory,
    },
    /// `k`/`i` - device details.
    DeviceInfo(DeviceInfo),
    /// `il` - enrollment mode started.
    DeviceAdding { category: DeviceCategory },
    /// `il` - a device was enrolled.
    DeviceAdded(DeviceSettings),
    /// `is` - device settings changed.
    DeviceChanged(DeviceSettings),
    /// `ik` - device removed.
    DeviceDeleted { category: DeviceCategory, index: u8 },
    /// `ev` - event log entry.
    EventLog(EventLogEntry),
    /// `evno` - no event log entry at the requested index.
    EventLogNotFound,
}

impl Response {
    /// Parse the lowercased text of a response line.
    ///
    /// Returns `Ok(None)` for empty text.
    pub fn parse(text: &str) -> Result<Option<Self>> {
        if text.is_empty() {
            return Ok(None);
        }

        let response = if let Some(rest) = text.strip_prefix(CMD_DATETIME) {
            let (was_set, value) = split_set_flag(rest);
            Response::DateTime {
                value: parse_datetime(value)?,
                was_set,
            }
        } else if let Some(rest) = text.strip_prefix(CMD_OPMODE) {
            let (was_set, value) = split_set_flag(rest);
            let raw = codec::decode(value)?;
            let mode = u8::try_from(raw)
                .ok()
                .and_then(OperationMode::from_u8)
                .ok_or_else(|| LifeSosError::format(format!("unknown operation mode {raw}")))?;
            Response::OpMode { mode, was_set }
        } else if text.starts_with(CMD_DEVBYIDX_PREFIX) {
            if text.get(2..) == Some(RESPONSE_ERROR) || text.get(2..4) == Some("00") {
                Response::DeviceNotFound {
                    command_name: field(text, 0, 2)?.to_string(),
                    category: category_at(text, 1)?,
                }
            } else {
                Response::DeviceInfo(DeviceInfo::parse(text)?)
            }
        } else if text.starts_with(CMD_DEVICE_PREFIX) {
            parse_device_response(text)?
        } else if text.starts_with(CMD_CLEAR_STATUS) {
            Response::ClearedStatus
        } else if let Some(rest) = text.strip_prefix(CMD_ROMVER) {
            Response::RomVersion {
                version: rest.to_string(),
            }
        } else if let Some(rest) = text.strip_prefix(CMD_EXIT_DELAY) {
            let (was_set, value) = split_set_flag(rest);
            Response::ExitDelay {
                seconds: codec::decode(value)?,
                was_set,
            }
        } else if let Some(rest) = text.strip_prefix(CMD_ENTRY_DELAY) {
            let (was_set, value) = split_set_flag(rest);
            Response::EntryDelay {
                seconds: codec::decode(value)?,
                was_set,
            }
        } else if let Some(rest) = text.strip_prefix(CMD_EVENT_LOG) {
            if rest == RESPONSE_ERROR {
                Response::EventLogNotFound
            } else {
                Response::EventLog(EventLogEntry::parse(rest)?)
            }
        } else {
            return Err(LifeSosError::ResponseNotRecognised {
                text: text.to_string(),
            });
        };

        Ok(Some(response))
    }

    /// Name of the command this response answers.
    pub fn command_name(&self) -> String {
        match self {
            Response::DateTime { .. } => CMD_DATETIME.to_string(),
            Response::OpMode { .. } => CMD_OPMODE.to_string(),
            Response::ExitDelay { .. } => CMD_EXIT_DELAY.to_string(),
            Response::EntryDelay { .. } => CMD_ENTRY_DELAY.to_string(),
            Response::RomVersion { .. } => CMD_ROMVER.to_string(),
            Response::ClearedStatus => CMD_CLEAR_STATUS.to_string(),
            Response::DeviceNotFound { command_name, .. } => command_name.clone(),
            Response::DeviceInfo(info) => info.command_name.clone(),
            Response::DeviceAdding { category } | Response::DeviceDeleted { category, .. } => {
                format!("{}{}", CMD_DEVICE_PREFIX, category.code())
            }
            Response::DeviceAdded(settings) | Response::DeviceChanged(settings) => {
                settings.command_name.clone()
            }
            Response::EventLog(_) | Response::EventLogNotFound => CMD_EVENT_LOG.to_string(),
        }
    }
}

/// Settings reported when a device is added or changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSettings {
    pub command_name: String,
    pub category: DeviceCategory,
    pub index: u8,
    pub group_number: u8,
    pub unit_number: u8,
    pub enable_status: EnableStatusFlags,
}

impl DeviceSettings {
    fn parse(text: &str) -> Result<Self> {
        let body = field(text, 3, text.len())?;
        Ok(Self {
            command_name: field(text, 0, 2)?.to_string(),
            category: category_at(text, 1)?,
            index: decode_u8(field(body, 0, 2)?)?,
            group_number: decode_u8(field(body, 2, 4)?)?,
            unit_number: decode_u8(field(body, 4, 6)?)?,
            enable_status: EnableStatusFlags::from_bits_retain(decode_u16(field(body, 6, 10)?)?),
        })
    }

    pub fn zone(&self) -> String {
        format!("{:02x}-{:02x}", self.group_number, self.unit_number)
    }
}

/// Details of an enrolled device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub command_name: String,
    pub category: DeviceCategory,
    /// Present when queried by zone (`i` command), absent when queried by index.
    pub index: Option<u8>,
    pub device_type: u8,
    pub device_id: u32,
    pub message_attribute: u8,
    pub characteristics: CharacteristicsFlags,
    pub group_number: u8,
    pub unit_number: u8,
    pub enable_status: EnableStatusFlags,
    pub current_status: u8,
    pub down_count: u8,
}

impl DeviceInfo {
    fn parse(text: &str) -> Result<Self> {
        let command_name = field(text, 0, 2)?.to_string();
        let category = category_at(text, 1)?;
        let mut body = field(text, 2, text.len())?;
        let mut index = None;
        if command_name.starts_with(CMD_DEVICE_PREFIX) {
            index = Some(decode_u8(field(body, 0, 2)?)?);
            body = field(body, 2, body.len())?;
        }

        Ok(Self {
            command_name,
            category,
            index,
            device_type: decode_u8(field(body, 0, 2)?)?,
            device_id: codec::decode(field(body, 2, 8)?)?,
            message_attribute: decode_u8(field(body, 8, 10)?)?,
            characteristics: CharacteristicsFlags::from_bits_retain(decode_u8(field(
                body, 10, 12,
            )?)?),
            group_number: decode_u8(field(body, 14, 16)?)?,
            unit_number: decode_u8(field(body, 16, 18)?)?,
            enable_status: EnableStatusFlags::from_bits_retain(decode_u16(field(body, 18, 22)?)?),
            current_status: decode_u8(field(body, 26, 28)?)?,
            down_count: decode_u8(field(body, 28, 30)?)?,
        })
    }

    /// Open/closed state; only door magnets report it.
    pub fn is_closed(&self) -> Option<bool> {
        (DeviceType::from_u8(self.device_type) == Some(DeviceType::DoorMagnet))
            .then_some(self.current_status & 0x01 != 0)
    }

    pub fn signal_strength(&self) -> SignalStrength {
        SignalStrength::from_status(self.current_status)
    }

    pub fn zone(&self) -> String {
        format!("{:02x}-{:02x}", self.group_number, self.unit_number)
    }
}

/// An entry from the base unit event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLogEntry {
    pub event_qualifier: u8,
    pub event_code: u16,
    pub device_category: Option<DeviceCategory>,
    pub group_number: Option<u8>,
    pub unit_number: Option<u8>,
    pub user_id: Option<u8>,
    /// Category of the device that performed the action.
    pub action_category: Option<DeviceCategory>,
    /// Time of the event. The log has no year, so the current one is assumed.
    pub logged_at: Option<NaiveDateTime>,
    /// Index of the most recent entry in the log.
    pub last_index: u16,
}

impl EventLogEntry {
    fn parse(text: &str) -> Result<Self> {
        let event_qualifier = decode_u8(field(text, 0, 1)?)?;
        let event_code = decode_u16(field(text, 1, 4)?)?;
        let group_partition = decode_u8(field(text, 4, 6)?)?;
        let device_category = DeviceCategory::from_index(codec::decode(field(text, 7, 8)?)?);
        let zone_user = decode_u8(field(text, 8, 10)?)?;
        let action_category = DeviceCategory::from_index(codec::decode(field(text, 10, 12)?)?);
        let logged_at = parse_log_timestamp(field(text, 12, 20)?, Local::now().year());
        let last_index = decode_u16(field(text, 20, 23)?)?;

        let (group_number, unit_number, user_id) =
            if device_category == Some(DeviceCategory::BaseUnit) {
                (None, None, (zone_user != 0).then_some(zone_user))
            } else {
                (Some(group_partition), Some(zone_user), None)
            };

        Ok(Self {
            event_qualifier,
            event_code,
            device_category,
            group_number,
            unit_number,
            user_id,
            action_category,
            logged_at,
            last_index,
        })
    }

    pub fn zone(&self) -> Option<String> {
        match (self.group_number, self.unit_number) {
            (Some(group), Some(unit)) => Some(format!("{group:02x}-{unit:02x}")),
            _ => None,
        }
    }
}

fn parse_device_response(text: &str) -> Result<Response> {
    let action = text
        .get(2..3)
        .filter(|a| [ACTION_ADD, ACTION_DEL, ACTION_SET].contains(a));
    let args = match action {
        Some(_) => field(text, 3, text.len())?,
        None => field(text, 2, text.len())?,
    };

    if args == RESPONSE_ERROR {
        return Ok(Response::DeviceNotFound {
            command_name: field(text, 0, 2)?.to_string(),
            category: category_at(text, 1)?,
        });
    }

    Ok(match action {
        Some(ACTION_ADD) if args.is_empty() => Response::DeviceAdding {
            category: category_at(text, 1)?,
        },
        Some(ACTION_ADD) => Response::DeviceAdded(DeviceSettings::parse(text)?),
        Some(ACTION_SET) => Response::DeviceChanged(DeviceSettings::parse(text)?),
        Some(_) => Response::DeviceDeleted {
            category: category_at(text, 1)?,
            index: decode_u8(field(text, 3, 5)?)?,
        },
        None => Response::DeviceInfo(DeviceInfo::parse(text)?),
    })
}

fn split_set_flag(rest: &str) -> (bool, &str) {
    match rest.strip_prefix(ACTION_SET) {
        Some(value) => (true, value),
        None => (false, rest),
    }
}

/// `yyMMdd` + weekday digit + `HHmm`; the weekday is ignored.
fn parse_datetime(text: &str) -> Result<NaiveDateTime> {
    if text.len() != 11 {
        return Err(LifeSosError::format(format!("invalid date/time '{text}'")));
    }
    let date = NaiveDate::parse_from_str(field(text, 0, 6)?, "%y%m%d")
        .map_err(|e| LifeSosError::format(format!("invalid date '{text}': {e}")))?;
    let time = NaiveTime::parse_from_str(field(text, 7, 11)?, "%H%M")
        .map_err(|e| LifeSosError::format(format!("invalid time '{text}': {e}")))?;
    Ok(date.and_time(time))
}

/// `MMddHHmm` in the given year.
fn parse_log_timestamp(text: &str, year: i32) -> Option<NaiveDateTime> {
    let number = |start: usize| text.get(start..start + 2)?.parse::<u32>().ok();
    NaiveDate::from_ymd_opt(year, number(0)?, number(2)?)?.and_hms_opt(number(4)?, number(6)?, 0)
}

fn field(text: &str, start: usize, end: usize) -> Result<&str> {
    text.get(start..end).ok_or_else(|| {
        LifeSosError::format(format!("response '{text}' too short for field {start}..{end}"))
    })
}

fn category_at(text: &str, pos: usize) -> Result<DeviceCategory> {
    field(text, pos, pos + 1)?
        .chars()
        .next()
        .and_then(DeviceCategory::from_code)
        .ok_or_else(|| LifeSosError::format(format!("unknown device category in '{text}'")))
}

fn decode_u8(text: &str) -> Result<u8> {
    u8::try_from(codec::decode(text)?)
        .map_err(|_| LifeSosError::format(format!("value '{text}' out of range")))
}

fn decode_u16(text: &str) -> Result<u16> {
    u16::try_from(codec::decode(text)?)
        .map_err(|_| LifeSosError::format(format!("value '{text}' out of range")))
}
