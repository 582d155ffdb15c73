// MIT License - Copyright (c) 2026 lifesos-lan-bridge contributors

/// Category of devices enrolled on the base unit.
///
/// The single-character code is used in device commands and is shown on
/// the base unit when reporting events. The numeric index is what Contact ID
/// and event log messages carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceCategory {
    Controller,
    Burglar,
    Fire,
    Medical,
    Special,
    BaseUnit,
}

impl DeviceCategory {
    /// All categories, in index order.
    pub const ALL: [Self; 6] = [
        Self::Controller,
        Self::Burglar,
        Self::Fire,
        Self::Medical,
        Self::Special,
        Self::BaseUnit,
    ];

    pub fn code(&self) -> char {
        match self {
            Self::Controller => 'c',
            Self::Burglar => 'b',
            Self::Fire => 'f',
            Self::Medical => 'm',
            Self::Special => 'e',
            Self::BaseUnit => 'z',
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Controller => "Controller",
            Self::Burglar => "Burglar",
            Self::Fire => "Fire",
            Self::Medical => "Medical",
            Self::Special => "Special",
            Self::BaseUnit => "Base Unit",
        }
    }

    /// Maximum number of devices, or `None` for the base unit itself.
    pub fn max_devices(&self) -> Option<u32> {
        match self {
            Self::Controller => Some(32),
            Self::Burglar => Some(128),
            Self::Fire => Some(64),
            Self::Medical => Some(32),
            Self::Special => Some(32),
            Self::BaseUnit => None,
        }
    }

    pub fn index(&self) -> u8 {
        match self {
            Self::Controller => 0,
            Self::Burglar => 1,
            Self::Fire => 2,
            Self::Medical => 3,
            Self::Special => 4,
            Self::BaseUnit => 5,
        }
    }

    pub fn from_code(c: char) -> Option<Self> {
        Self::ALL.iter().copied().find(|dc| dc.code() == c)
    }

    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_code() {
        assert_eq!(DeviceCategory::from_code('b'), Some(DeviceCategory::Burglar));
        assert_eq!(DeviceCategory::from_code('z'), Some(DeviceCategory::BaseUnit));
        assert_eq!(DeviceCategory::from_code('x'), None);
    }

    #[test]
    fn test_lookup_by_index() {
        for dc in DeviceCategory::ALL {
            assert_eq!(DeviceCategory::from_index(dc.index() as u32), Some(dc));
        }
        assert_eq!(DeviceCategory::from_index(6), None);
    }

    #[test]
    fn test_capacity() {
        assert_eq!(DeviceCategory::Burglar.max_devices(), Some(128));
        assert_eq!(DeviceCategory::BaseUnit.max_devices(), None);
    }
}
