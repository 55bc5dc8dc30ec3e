//! Codec for the 112 byte configuration block stored in ESC flash.

mod groups;
mod layout;
mod setting;
mod values;

pub use groups::{
    group_fields, CommonConfig, DeviceInfo, EscConfig, COMMON_CONFIG_FIELDS, DEVICE_INFO_FIELDS,
    ESC_CONFIG_FIELDS,
};
pub use layout::{ConfigImage, CONFIG_ADDRESS, CONFIG_SIZE, PAGE_SIZE, RESERVED_REGIONS};
pub use setting::{Patch, Setting};
pub use values::{
    BeaconDelay, CommutationTiming, DemagCompensation, Mode, MotorDirection, StartupPower,
    TemperatureProtection,
};

#[cfg(test)]
pub(crate) use layout::tests::sample_image;
