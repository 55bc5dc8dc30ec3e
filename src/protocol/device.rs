use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::DecodingError;

/// Bootloader flavour reported by `device_init_flash`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BootMode {
    SiLabsC2 = 0,
    SiLabsBLB = 1,
    AtmelBLB = 2,
    AtmelSK = 3,
}

impl BootMode {
    pub fn family(self) -> ChipFamily {
        match self {
            BootMode::SiLabsC2 | BootMode::SiLabsBLB => ChipFamily::Silabs,
            BootMode::AtmelBLB | BootMode::AtmelSK => ChipFamily::Atmel,
        }
    }
}

impl TryFrom<u8> for BootMode {
    type Error = DecodingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(BootMode::SiLabsC2),
            1 => Ok(BootMode::SiLabsBLB),
            2 => Ok(BootMode::AtmelBLB),
            3 => Ok(BootMode::AtmelSK),
            v => Err(DecodingError::InvalidValue {
                field: "mode",
                value: v.into(),
            }),
        }
    }
}

/// Identification returned when the flash of an ESC is initialised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceId {
    pub hi_sign: u8,
    pub lo_sign: u8,
    pub boot_msg: u8,
    pub mode: BootMode,
}

impl DeviceId {
    pub fn signature(&self) -> u16 {
        u16::from_be_bytes([self.hi_sign, self.lo_sign])
    }

    pub fn family(&self) -> ChipFamily {
        self.mode.family()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChipFamily {
    Silabs,
    Atmel,
}

impl Display for ChipFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChipFamily::Silabs => f.write_str("silabs"),
            ChipFamily::Atmel => f.write_str("atmel"),
        }
    }
}

impl FromStr for ChipFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "silabs" => Ok(ChipFamily::Silabs),
            "atmel" => Ok(ChipFamily::Atmel),
            other => Err(format!("expected 'silabs' or 'atmel', got '{other}'")),
        }
    }
}
