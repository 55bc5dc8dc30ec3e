use serde::Serialize;

use super::{
    layout::ConfigImage,
    values::{
        BeaconDelay, CommutationTiming, DemagCompensation, MotorDirection, StartupPower,
        TemperatureProtection,
    },
};

pub const DEVICE_INFO_FIELDS: [&str; 7] = [
    "main_revision",
    "sub_revision",
    "layout_revision",
    "mode",
    "layout",
    "mcu",
    "name",
];

pub const COMMON_CONFIG_FIELDS: [&str; 11] = [
    "programming_by_tx",
    "commutation_timing",
    "beep_strength",
    "beacon_strength",
    "beacon_delay",
    "demag_compensation",
    "temperature_protection",
    "low_rpm_power_protection",
    "brake_on_stop",
    "led_control",
    "startup_power",
];

pub const ESC_CONFIG_FIELDS: [&str; 4] = [
    "motor_direction",
    "ppm_min_throttle",
    "ppm_max_throttle",
    "ppm_center_throttle",
];

/// Read-only identity of an ESC, rendered for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub main_revision: String,
    pub sub_revision: String,
    pub layout_revision: String,
    pub mode: String,
    pub layout: String,
    pub mcu: String,
    pub name: String,
}

/// Settings every ESC of a rig is expected to share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommonConfig {
    pub programming_by_tx: bool,
    pub commutation_timing: CommutationTiming,
    pub beep_strength: u8,
    pub beacon_strength: u8,
    pub beacon_delay: BeaconDelay,
    pub demag_compensation: DemagCompensation,
    pub temperature_protection: TemperatureProtection,
    pub low_rpm_power_protection: bool,
    pub brake_on_stop: bool,
    pub led_control: bool,
    pub startup_power: StartupPower,
}

/// Settings specific to one ESC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EscConfig {
    pub motor_direction: MotorDirection,
    pub ppm_min_throttle: u8,
    pub ppm_max_throttle: u8,
    pub ppm_center_throttle: u8,
}

impl CommonConfig {
    /// Names of the fields that differ between two configurations.
    pub fn differences(&self, other: &CommonConfig) -> Vec<&'static str> {
        let checks = [
            self.programming_by_tx != other.programming_by_tx,
            self.commutation_timing != other.commutation_timing,
            self.beep_strength != other.beep_strength,
            self.beacon_strength != other.beacon_strength,
            self.beacon_delay != other.beacon_delay,
            self.demag_compensation != other.demag_compensation,
            self.temperature_protection != other.temperature_protection,
            self.low_rpm_power_protection != other.low_rpm_power_protection,
            self.brake_on_stop != other.brake_on_stop,
            self.led_control != other.led_control,
            self.startup_power != other.startup_power,
        ];
        COMMON_CONFIG_FIELDS
            .into_iter()
            .zip(checks)
            .filter_map(|(field, differs)| differs.then_some(field))
            .collect()
    }
}

/// Split a configuration block into its device info, common and per-ESC views.
pub fn group_fields(image: &ConfigImage) -> (DeviceInfo, CommonConfig, EscConfig) {
    let info = DeviceInfo {
        main_revision: image.main_revision.to_string(),
        sub_revision: image.sub_revision.to_string(),
        layout_revision: image.layout_revision.to_string(),
        mode: image.mode.to_string(),
        layout: image.layout.trim().to_owned(),
        mcu: image.mcu.trim().to_owned(),
        name: image.name.trim().to_owned(),
    };
    let common = CommonConfig {
        programming_by_tx: image.programming_by_tx,
        commutation_timing: image.commutation_timing,
        beep_strength: image.beep_strength,
        beacon_strength: image.beacon_strength,
        beacon_delay: image.beacon_delay,
        demag_compensation: image.demag_compensation,
        temperature_protection: image.temperature_protection,
        low_rpm_power_protection: image.low_rpm_power_protection,
        brake_on_stop: image.brake_on_stop,
        led_control: image.led_control,
        startup_power: image.startup_power,
    };
    let esc = EscConfig {
        motor_direction: image.motor_direction,
        ppm_min_throttle: image.ppm_min_throttle,
        ppm_max_throttle: image.ppm_max_throttle,
        ppm_center_throttle: image.ppm_center_throttle,
    };
    (info, common, esc)
}
