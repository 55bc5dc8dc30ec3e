use super::{
    layout::ConfigImage,
    values::{
        parse_byte, parse_flag, BeaconDelay, CommutationTiming, DemagCompensation,
        MotorDirection, StartupPower, TemperatureProtection,
    },
};
use crate::error::EncodingError;

/// A writable configuration field with its new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    ProgrammingByTx(bool),
    CommutationTiming(CommutationTiming),
    BeepStrength(u8),
    BeaconStrength(u8),
    BeaconDelay(BeaconDelay),
    DemagCompensation(DemagCompensation),
    TemperatureProtection(TemperatureProtection),
    LowRpmPowerProtection(bool),
    BrakeOnStop(bool),
    LedControl(bool),
    StartupPower(StartupPower),
    MotorDirection(MotorDirection),
    PpmMinThrottle(u8),
    PpmMaxThrottle(u8),
    PpmCenterThrottle(u8),
}

impl Setting {
    /// Returns `Ok(None)` when `name` is not a writable field.
    pub fn parse(name: &str, value: &str) -> Result<Option<Setting>, EncodingError> {
        let setting = match name {
            "programming_by_tx" => Setting::ProgrammingByTx(parse_flag("programming_by_tx", value)?),
            "commutation_timing" => Setting::CommutationTiming(value.parse()?),
            "beep_strength" => Setting::BeepStrength(parse_byte("beep_strength", value)?),
            "beacon_strength" => Setting::BeaconStrength(parse_byte("beacon_strength", value)?),
            "beacon_delay" => Setting::BeaconDelay(value.parse()?),
            "demag_compensation" => Setting::DemagCompensation(value.parse()?),
            "temperature_protection" => Setting::TemperatureProtection(value.parse()?),
            "low_rpm_power_protection" => {
                Setting::LowRpmPowerProtection(parse_flag("low_rpm_power_protection", value)?)
            }
            "brake_on_stop" => Setting::BrakeOnStop(parse_flag("brake_on_stop", value)?),
            "led_control" => Setting::LedControl(parse_flag("led_control", value)?),
            "startup_power" => Setting::StartupPower(value.parse()?),
            "motor_direction" => Setting::MotorDirection(value.parse()?),
            "ppm_min_throttle" => Setting::PpmMinThrottle(parse_byte("ppm_min_throttle", value)?),
            "ppm_max_throttle" => Setting::PpmMaxThrottle(parse_byte("ppm_max_throttle", value)?),
            "ppm_center_throttle" => {
                Setting::PpmCenterThrottle(parse_byte("ppm_center_throttle", value)?)
            }
            _ => return Ok(None),
        };
        Ok(Some(setting))
    }
}

impl ConfigImage {
    pub fn apply(&mut self, setting: Setting) {
        match setting {
            Setting::ProgrammingByTx(v) => self.programming_by_tx = v,
            Setting::CommutationTiming(v) => self.commutation_timing = v,
            Setting::BeepStrength(v) => self.beep_strength = v,
            Setting::BeaconStrength(v) => self.beacon_strength = v,
            Setting::BeaconDelay(v) => self.beacon_delay = v,
            Setting::DemagCompensation(v) => self.demag_compensation = v,
            Setting::TemperatureProtection(v) => self.temperature_protection = v,
            Setting::LowRpmPowerProtection(v) => self.low_rpm_power_protection = v,
            Setting::BrakeOnStop(v) => self.brake_on_stop = v,
            Setting::LedControl(v) => self.led_control = v,
            Setting::StartupPower(v) => self.startup_power = v,
            Setting::MotorDirection(v) => self.motor_direction = v,
            Setting::PpmMinThrottle(v) => self.ppm_min_throttle = v,
            Setting::PpmMaxThrottle(v) => self.ppm_max_throttle = v,
            Setting::PpmCenterThrottle(v) => self.ppm_center_throttle = v,
        }
    }
}

/// Parameters requested for a write, split into known settings and names
/// that do not match any writable field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch {
    pub settings: Vec<Setting>,
    pub unknown: Vec<String>,
}

impl Patch {
    /// Fails on the first known field whose value cannot be encoded.
    pub fn parse<K, V>(params: &[(K, V)]) -> Result<Patch, EncodingError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut patch = Patch::default();
        for (name, value) in params {
            match Setting::parse(name.as_ref(), value.as_ref())? {
                Some(setting) => patch.settings.push(setting),
                None => patch.unknown.push(name.as_ref().to_owned()),
            }
        }
        Ok(patch)
    }

    pub fn apply(&self, image: &mut ConfigImage) {
        for setting in &self.settings {
            image.apply(*setting);
        }
    }
}
