// MIT License - Copyright (c) 2026 lifesos-lan-bridge contributors

use bitflags::bitflags;

bitflags! {
    /// Enable status flags configured per device.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EnableStatusFlags: u16 {
        /// Device is bypassed
        const BYPASS             = 0x8000;
        /// Entry/exit delay applies
        const DELAY              = 0x4000;
        /// 24 hour zone
        const HOUR24             = 0x2000;
        /// Armed in Home mode
        const HOME_GUARD         = 0x1000;
        /// Warning beep during delay (pre-warning)
        const WARNING_BEEP_DELAY = 0x0800;
        /// Sound the siren on alarm
        const ALARM_SIREN        = 0x0400;
        /// Chime
        const BELL               = 0x0200;
        /// Latchkey (inactivity) reporting
        const LATCHKEY           = 0x0100;
        const RESERVED_B7        = 0x0080;
        const RESERVED_B6        = 0x0040;
        /// Two-way communication
        const TWO_WAY            = 0x0020;
        /// Supervised by the base unit
        const SUPERVISED         = 0x0010;
        /// RF voice
        const RF_VOICE           = 0x0008;
        /// Home automation
        const HOME_AUTO          = 0x0004;
        const RESERVED_B1        = 0x0002;
        const RESERVED_B0        = 0x0001;
    }
}

impl EnableStatusFlags {
    pub const PRE_WARNING: Self = Self::WARNING_BEEP_DELAY;
    pub const INACTIVITY: Self = Self::LATCHKEY;

    /// Names of the set flags joined with `|`.
    pub fn describe(&self) -> String {
        self.iter_names()
            .map(|(name, _)| name)
            .collect::<Vec<_>>()
            .join("|")
    }
}

bitflags! {
    /// Device characteristics reported by the device itself.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CharacteristicsFlags: u8 {
        const REPEATER    = 0x80;
        const BASE_UNIT   = 0x40;
        const TWO_WAY     = 0x20;
        const SUPERVISORY = 0x10;
        const RF_VOICE    = 0x08;
        const RESERVED_B2 = 0x04;
        const RESERVED_B1 = 0x02;
        const RESERVED_B0 = 0x01;
    }
}

impl CharacteristicsFlags {
    /// Names of the set flags joined with `|`.
    pub fn describe(&self) -> String {
        self.iter_names()
            .map(|(name, _)| name)
            .collect::<Vec<_>>()
            .join("|")
    }
}
