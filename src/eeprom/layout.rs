use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::values::{
    BeaconDelay, CommutationTiming, DemagCompensation, Mode, MotorDirection, StartupPower,
    TemperatureProtection,
};
use crate::error::{DecodingError, EncodingError};

/// Flash address of the configuration block.
pub const CONFIG_ADDRESS: u16 = 0x1A00;
pub const PAGE_SIZE: u16 = 0x200;
pub const CONFIG_SIZE: usize = 0x70;
pub const TEXT_LEN: usize = 16;

const RESERVED_BYTE: u8 = 0xFF;
const TEXT_PAD_BYTE: u8 = 0x00;

/// Offsets and lengths of the unused regions, always written as `0xFF`.
pub const RESERVED_REGIONS: [(usize, usize); 10] = [
    (0x03, 6),
    (0x0A, 1),
    (0x0C, 1),
    (0x10, 5),
    (0x16, 3),
    (0x1E, 1),
    (0x20, 1),
    (0x22, 1),
    (0x25, 2),
    (0x29, 23),
];

/// Decoded content of the BLHeli configuration block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigImage {
    pub main_revision: u8,
    pub sub_revision: u8,
    pub layout_revision: u8,
    pub startup_power: StartupPower,
    pub motor_direction: MotorDirection,
    pub mode: Mode,
    pub programming_by_tx: bool,
    pub commutation_timing: CommutationTiming,
    pub ppm_min_throttle: u8,
    pub ppm_max_throttle: u8,
    pub beep_strength: u8,
    pub beacon_strength: u8,
    pub beacon_delay: BeaconDelay,
    pub demag_compensation: DemagCompensation,
    pub ppm_center_throttle: u8,
    pub temperature_protection: TemperatureProtection,
    pub low_rpm_power_protection: bool,
    pub brake_on_stop: bool,
    pub led_control: bool,
    pub layout: String,
    pub mcu: String,
    pub name: String,
}

fn get_text(buf: &mut &[u8], field: &'static str) -> Result<String, DecodingError> {
    let raw: &[u8] = *buf;
    let raw = &raw[..TEXT_LEN];
    buf.advance(TEXT_LEN);

    let end = raw
        .iter()
        .rposition(|&b| b != TEXT_PAD_BYTE)
        .map_or(0, |i| i + 1);
    String::from_utf8(raw[..end].to_vec()).map_err(|_| DecodingError::InvalidText(field))
}

fn put_text(buf: &mut BytesMut, field: &'static str, text: &str) -> Result<(), EncodingError> {
    if text.len() > TEXT_LEN {
        return Err(EncodingError::TextTooLong {
            field,
            len: text.len(),
            max: TEXT_LEN,
        });
    }
    buf.put_slice(text.as_bytes());
    buf.put_bytes(TEXT_PAD_BYTE, TEXT_LEN - text.len());
    Ok(())
}

fn put_reserved(buf: &mut BytesMut, len: usize) {
    buf.put_bytes(RESERVED_BYTE, len);
}

impl ConfigImage {
    /// Parse a configuration block as read from the device. Reserved bytes are
    /// skipped whatever their content.
    pub fn decode(input: &[u8]) -> Result<ConfigImage, DecodingError> {
        if input.len() != CONFIG_SIZE {
            return Err(DecodingError::InvalidLength {
                expected: CONFIG_SIZE,
                found: input.len(),
            });
        }
        let mut buf = input;

        let main_revision = buf.get_u8();
        let sub_revision = buf.get_u8();
        let layout_revision = buf.get_u8();
        buf.advance(6);
        let startup_power = StartupPower::try_from(buf.get_u8())?;
        buf.advance(1);
        let motor_direction = MotorDirection::try_from(buf.get_u8())?;
        buf.advance(1);
        let mode = Mode::try_from(buf.get_u16())?;
        let programming_by_tx = buf.get_u8() != 0;
        buf.advance(5);
        let commutation_timing = CommutationTiming::try_from(buf.get_u8())?;
        buf.advance(3);
        let ppm_min_throttle = buf.get_u8();
        let ppm_max_throttle = buf.get_u8();
        let beep_strength = buf.get_u8();
        let beacon_strength = buf.get_u8();
        let beacon_delay = BeaconDelay::try_from(buf.get_u8())?;
        buf.advance(1);
        let demag_compensation = DemagCompensation::try_from(buf.get_u8())?;
        buf.advance(1);
        let ppm_center_throttle = buf.get_u8();
        buf.advance(1);
        let temperature_protection = TemperatureProtection::try_from(buf.get_u8())?;
        let low_rpm_power_protection = buf.get_u8() != 0;
        buf.advance(2);
        let brake_on_stop = buf.get_u8() != 0;
        let led_control = buf.get_u8() != 0;
        buf.advance(23);
        let layout = get_text(&mut buf, "layout")?;
        let mcu = get_text(&mut buf, "mcu")?;
        let name = get_text(&mut buf, "name")?;

        Ok(ConfigImage {
            main_revision,
            sub_revision,
            layout_revision,
            startup_power,
            motor_direction,
            mode,
            programming_by_tx,
            commutation_timing,
            ppm_min_throttle,
            ppm_max_throttle,
            beep_strength,
            beacon_strength,
            beacon_delay,
            demag_compensation,
            ppm_center_throttle,
            temperature_protection,
            low_rpm_power_protection,
            brake_on_stop,
            led_control,
            layout,
            mcu,
            name,
        })
    }

    /// Serialize the configuration block, filling reserved regions with `0xFF`.
    pub fn encode(&self) -> Result<Bytes, EncodingError> {
        let mut buf = BytesMut::with_capacity(CONFIG_SIZE);

        buf.put_u8(self.main_revision);
        buf.put_u8(self.sub_revision);
        buf.put_u8(self.layout_revision);
        put_reserved(&mut buf, 6);
        buf.put_u8(self.startup_power.into());
        put_reserved(&mut buf, 1);
        buf.put_u8(self.motor_direction.into());
        put_reserved(&mut buf, 1);
        buf.put_u16(self.mode.value());
        buf.put_u8(self.programming_by_tx.into());
        put_reserved(&mut buf, 5);
        buf.put_u8(self.commutation_timing.into());
        put_reserved(&mut buf, 3);
        buf.put_u8(self.ppm_min_throttle);
        buf.put_u8(self.ppm_max_throttle);
        buf.put_u8(self.beep_strength);
        buf.put_u8(self.beacon_strength);
        buf.put_u8(self.beacon_delay.into());
        put_reserved(&mut buf, 1);
        buf.put_u8(self.demag_compensation.into());
        put_reserved(&mut buf, 1);
        buf.put_u8(self.ppm_center_throttle);
        put_reserved(&mut buf, 1);
        buf.put_u8(self.temperature_protection.into());
        buf.put_u8(self.low_rpm_power_protection.into());
        put_reserved(&mut buf, 2);
        buf.put_u8(self.brake_on_stop.into());
        buf.put_u8(self.led_control.into());
        put_reserved(&mut buf, 23);
        put_text(&mut buf, "layout", &self.layout)?;
        put_text(&mut buf, "mcu", &self.mcu)?;
        put_text(&mut buf, "name", &self.name)?;

        debug_assert_eq!(buf.len(), CONFIG_SIZE);
        Ok(buf.freeze())
    }
}
