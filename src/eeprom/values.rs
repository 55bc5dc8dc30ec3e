use std::{fmt::Display, str::FromStr};

use serde::{Serialize, Serializer};

use crate::error::{DecodingError, EncodingError};

/// Declares a one byte enumerated EEPROM value together with its labels.
macro_rules! config_enum {
    (
        $(#[$meta:meta])*
        $name:ident($field:literal) {
            $($variant:ident = $value:literal => $label:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            pub fn value(self) -> u8 {
                match self {
                    $($name::$variant => $value,)+
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl TryFrom<u8> for $name {
            type Error = DecodingError;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $($value => Ok($name::$variant),)+
                    v => Err(DecodingError::InvalidValue {
                        field: $field,
                        value: v.into(),
                    }),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(val: $name) -> Self {
                val.value()
            }
        }

        impl FromStr for $name {
            type Err = EncodingError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.label() == s || v.label().trim_end_matches('°') == s)
                    .ok_or_else(|| EncodingError::InvalidValue {
                        field: $field,
                        value: s.to_owned(),
                    })
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.label())
            }
        }
    };
}

config_enum! {
    /// Fraction of full power applied while starting the motor.
    StartupPower("startup_power") {
        P031 = 1 => "0.031",
        P047 = 2 => "0.047",
        P063 = 3 => "0.063",
        P094 = 4 => "0.094",
        P125 = 5 => "0.125",
        P188 = 6 => "0.188",
        P250 = 7 => "0.25",
        P380 = 8 => "0.38",
        P500 = 9 => "0.50",
        P750 = 10 => "0.75",
        P1000 = 11 => "1.00",
        P1250 = 12 => "1.25",
        P1500 = 13 => "1.50",
    }
}

config_enum! {
    MotorDirection("motor_direction") {
        Normal = 1 => "normal",
        Reversed = 2 => "reversed",
        Bidir = 3 => "bidir",
        BidirReversed = 4 => "bidir_reversed",
    }
}

config_enum! {
    CommutationTiming("commutation_timing") {
        Low = 1 => "low",
        MediumLow = 2 => "medium_low",
        Medium = 3 => "medium",
        MediumHigh = 4 => "medium_high",
        High = 5 => "high",
    }
}

config_enum! {
    /// Idle time before the beacon starts beeping.
    BeaconDelay("beacon_delay") {
        OneMinute = 1 => "1_min",
        TwoMinutes = 2 => "2_min",
        FiveMinutes = 3 => "5_min",
        TenMinutes = 4 => "10_min",
        Infinite = 5 => "infinite",
    }
}

config_enum! {
    DemagCompensation("demag_compensation") {
        Off = 1 => "off",
        Low = 2 => "low",
        High = 3 => "high",
    }
}

config_enum! {
    TemperatureProtection("temperature_protection") {
        Disabled = 0 => "disabled",
        C80 = 1 => "80°",
        C90 = 2 => "90°",
        C100 = 3 => "100°",
        C110 = 4 => "110°",
        C120 = 5 => "120°",
        C130 = 6 => "130°",
        C140 = 7 => "140°",
    }
}

/// Firmware flavour, stored as a big-endian 16 bit word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Main,
    Tail,
    Multi,
}

impl Mode {
    pub fn value(self) -> u16 {
        match self {
            Mode::Main => 0xA55A,
            Mode::Tail => 0x5AA5,
            Mode::Multi => 0x55AA,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Main => "main",
            Mode::Tail => "tail",
            Mode::Multi => "multi",
        }
    }
}

impl TryFrom<u16> for Mode {
    type Error = DecodingError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0xA55A => Ok(Mode::Main),
            0x5AA5 => Ok(Mode::Tail),
            0x55AA => Ok(Mode::Multi),
            value => Err(DecodingError::InvalidValue {
                field: "mode",
                value,
            }),
        }
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Mode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

pub fn parse_flag(field: &'static str, value: &str) -> Result<bool, EncodingError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        _ => Err(EncodingError::InvalidValue {
            field,
            value: value.to_owned(),
        }),
    }
}

pub fn parse_byte(field: &'static str, value: &str) -> Result<u8, EncodingError> {
    value.trim().parse().map_err(|_| EncodingError::InvalidValue {
        field,
        value: value.to_owned(),
    })
}
