// MIT License - Copyright (c) 2026 lifesos-lan-bridge contributors

use chrono::{Datelike, Local, NaiveDateTime};

use crate::codec;
use crate::constants::{
    OperationMode, ACTION_ADD, ACTION_DEL, ACTION_GET, ACTION_NONE, ACTION_SET,
    CMD_CLEAR_STATUS, CMD_DATETIME, CMD_DEVBYIDX_PREFIX, CMD_DEVICE_PREFIX, CMD_ENTRY_DELAY,
    CMD_EVENT_LOG, CMD_EXIT_DELAY, CMD_OPMODE, CMD_ROMVER, MARKER_END, MARKER_START,
};
use crate::devices::category::DeviceCategory;
use crate::devices::flags::EnableStatusFlags;

/// Commands that can be sent to the base unit.
///
/// # Wire format
///
/// Every command is a single line without separators:
///
/// ```text
/// ! <name> <action> <args> <password> &
/// ```
///
/// `name` is one or two characters, `action` is empty, `?` (get), `s` (set),
/// `l` (add) or `k` (delete). Numeric arguments are fixed width wire
/// integers (see [`crate::codec`]). The base unit answers with
/// `! <name> ... &`, which is how responses are correlated with commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `l5` - Clear the alarm/warning LEDs on the base unit.
    ClearStatus,
    /// `dt?` - Query the base unit clock.
    GetDateTime,
    /// `dts<yyMMdd><weekday><HHmm>` - Set the base unit clock.
    /// Weekday runs 1 (Monday) to 7 (Sunday).
    SetDateTime { value: NaiveDateTime },
    /// `n0?` - Query the operation mode.
    GetOpMode,
    /// `n0s<mode>` - Set the operation mode, mode in decimal.
    SetOpMode { mode: OperationMode },
    /// `l0?` - Query the exit delay in seconds.
    GetExitDelay,
    /// `l0s<seconds:2>` - Set the exit delay.
    SetExitDelay { seconds: u8 },
    /// `l1?` - Query the entry delay in seconds.
    GetEntryDelay,
    /// `l1s<seconds:2>` - Set the entry delay.
    SetEntryDelay { seconds: u8 },
    /// `vn?` - Query the ROM version.
    GetRomVersion,
    /// `k<cat>?<index:2>` - Query an enrolled device by its index.
    /// Used to enumerate devices during discovery.
    GetDeviceByIndex { category: DeviceCategory, index: u8 },
    /// `i<cat>?<group:2><unit:2>` - Query an enrolled device by zone.
    GetDevice {
        category: DeviceCategory,
        group_number: u8,
        unit_number: u8,
    },
    /// `i<cat>l` - Put the base unit into enrollment mode for a category.
    /// The base unit answers immediately, then again once a device is enrolled.
    AddDevice { category: DeviceCategory },
    /// `i<cat>s<index:2><group:2><unit:2><enable:4>0000` - Change device settings.
    ChangeDevice {
        category: DeviceCategory,
        index: u8,
        group_number: u8,
        unit_number: u8,
        enable_status: EnableStatusFlags,
    },
    /// `i<cat>k<index:2>` - Remove an enrolled device.
    DeleteDevice { category: DeviceCategory, index: u8 },
    /// `ev<index:3>` - Read an entry from the event log, index below 512.
    GetEventLog { index: u16 },
}

impl Command {
    /// Set the clock to the current local time.
    pub fn set_datetime_now() -> Self {
        Command::SetDateTime {
            value: Local::now().naive_local(),
        }
    }

    /// The command name token, used to correlate the response.
    pub fn name(&self) -> String {
        match self {
            Command::ClearStatus => CMD_CLEAR_STATUS.to_string(),
            Command::GetDateTime | Command::SetDateTime { .. } => CMD_DATETIME.to_string(),
            Command::GetOpMode | Command::SetOpMode { .. } => CMD_OPMODE.to_string(),
            Command::GetExitDelay | Command::SetExitDelay { .. } => CMD_EXIT_DELAY.to_string(),
            Command::GetEntryDelay | Command::SetEntryDelay { .. } => CMD_ENTRY_DELAY.to_string(),
            Command::GetRomVersion => CMD_ROMVER.to_string(),
            Command::GetDeviceByIndex { category, .. } => {
                format!("{}{}", CMD_DEVBYIDX_PREFIX, category.code())
            }
            Command::GetDevice { category, .. }
            | Command::AddDevice { category }
            | Command::ChangeDevice { category, .. }
            | Command::DeleteDevice { category, .. } => {
                format!("{}{}", CMD_DEVICE_PREFIX, category.code())
            }
            Command::GetEventLog { .. } => CMD_EVENT_LOG.to_string(),
        }
    }

    /// The action token.
    pub fn action(&self) -> &'static str {
        match self {
            Command::ClearStatus | Command::GetEventLog { .. } => ACTION_NONE,
            Command::GetDateTime
            | Command::GetOpMode
            | Command::GetExitDelay
            | Command::GetEntryDelay
            | Command::GetRomVersion
            | Command::GetDeviceByIndex { .. }
            | Command::GetDevice { .. } => ACTION_GET,
            Command::SetDateTime { .. }
            | Command::SetOpMode { .. }
            | Command::SetExitDelay { .. }
            | Command::SetEntryDelay { .. }
            | Command::ChangeDevice { .. } => ACTION_SET,
            Command::AddDevice { .. } => ACTION_ADD,
            Command::DeleteDevice { .. } => ACTION_DEL,
        }
    }

    /// The formatted arguments.
    pub fn args(&self) -> String {
        match self {
            Command::SetDateTime { value } => format!(
                "{}{}{}",
                value.format("%y%m%d"),
                value.weekday().number_from_monday(),
                value.format("%H%M")
            ),
            Command::SetOpMode { mode } => (*mode as u8).to_string(),
            Command::SetExitDelay { seconds } | Command::SetEntryDelay { seconds } => {
                codec::encode(*seconds as u32, 2)
            }
            Command::GetDeviceByIndex { index, .. } | Command::DeleteDevice { index, .. } => {
                codec::encode(*index as u32, 2)
            }
            Command::GetDevice {
                group_number,
                unit_number,
                ..
            } => format!(
                "{}{}",
                codec::encode(*group_number as u32, 2),
                codec::encode(*unit_number as u32, 2)
            ),
            Command::ChangeDevice {
                index,
                group_number,
                unit_number,
                enable_status,
                ..
            } => format!(
                "{}{}{}{}{}",
                codec::encode(*index as u32, 2),
                codec::encode(*group_number as u32, 2),
                codec::encode(*unit_number as u32, 2),
                codec::encode(enable_status.bits() as u32, 4),
                codec::encode(0, 4)
            ),
            Command::GetEventLog { index } => codec::encode(*index as u32, 3),
            _ => String::new(),
        }
    }

    /// Render the full command line sent to the base unit.
    pub fn format(&self, password: &str) -> String {
        format!(
            "{}{}{}{}{}{}",
            MARKER_START,
            self.name(),
            self.action(),
            self.args(),
            password,
            MARKER_END
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_simple_queries() {
        assert_eq!(Command::GetRomVersion.format(""), "!vn?&");
        assert_eq!(Command::GetOpMode.format(""), "!n0?&");
        assert_eq!(Command::GetExitDelay.format(""), "!l0?&");
        assert_eq!(Command::GetEntryDelay.format(""), "!l1?&");
        assert_eq!(Command::GetDateTime.format(""), "!dt?&");
        assert_eq!(Command::ClearStatus.format("1234"), "!l51234&");
    }

    #[test]
    fn test_set_op_mode_with_password() {
        let cmd = Command::SetOpMode {
            mode: OperationMode::Monitor,
        };
        assert_eq!(cmd.name(), "n0");
        assert_eq!(cmd.format("1234"), "!n0s81234&");
    }

    #[test]
    fn test_set_delays() {
        assert_eq!(Command::SetExitDelay { seconds: 30 }.format(""), "!l0s1>&");
        assert_eq!(Command::SetEntryDelay { seconds: 255 }.format(""), "!l1s??&");
    }

    #[test]
    fn test_device_commands() {
        let category = DeviceCategory::Burglar;
        assert_eq!(
            Command::GetDeviceByIndex { category, index: 12 }.format(""),
            "!kb?0<&"
        );
        assert_eq!(
            Command::GetDevice {
                category,
                group_number: 0x11,
                unit_number: 2
            }
            .format(""),
            "!ib?1102&"
        );
        assert_eq!(Command::AddDevice { category }.format(""), "!ibl&");
        assert_eq!(
            Command::DeleteDevice { category, index: 1 }.format(""),
            "!ibk01&"
        );
        let change = Command::ChangeDevice {
            category,
            index: 5,
            group_number: 0x11,
            unit_number: 2,
            enable_status: EnableStatusFlags::from_bits_retain(0x1410),
        };
        assert_eq!(change.name(), "ib");
        assert_eq!(change.format(""), "!ibs051102141000000&");
    }

    #[test]
    fn test_set_datetime_now() {
        let line = Command::set_datetime_now().format("");
        assert!(line.starts_with("!dts") && line.ends_with('&'));
        assert_eq!(line.len(), 16);
    }

    #[test]
    fn test_event_log() {
        assert_eq!(Command::GetEventLog { index: 0xb7 }.format(""), "!ev0;7&");
    }

    #[test]
    fn test_set_datetime() {
        // 20 April 1986 was a Sunday
        let value = NaiveDate::from_ymd_opt(1986, 4, 20)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(
            Command::SetDateTime { value }.format(""),
            "!dts86042071200&"
        );
    }
}
