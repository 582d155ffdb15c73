// MIT License - Copyright (c) 2026 lifesos-lan-bridge contributors

pub mod base_unit;
pub mod category;
pub mod device;
pub mod flags;

pub use base_unit::BaseUnitRecord;
pub use category::DeviceCategory;
pub use device::Device;
pub use flags::{CharacteristicsFlags, EnableStatusFlags};
