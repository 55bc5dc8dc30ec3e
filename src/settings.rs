use std::{str::FromStr, time::Duration};

use anyhow::Result;
use config::{builder::DefaultState, ConfigBuilder, Environment, File};
use serde::{de::Visitor, Deserialize, Deserializer};
use tracing::Level;

use crate::{protocol::ChipFamily, session::Timing};

const LOG_LEVELS: [&str; 5] = ["DEBUG", "ERROR", "INFO", "TRACE", "WARN"];

struct LevelVisitor;

impl<'de> Visitor<'de> for LevelVisitor {
    type Value = Level;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter
            .write_str("one of ")
            .and(formatter.write_str(&LOG_LEVELS.join(",")))
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        FromStr::from_str(v).map_err(|_| E::unknown_variant(v, &LOG_LEVELS))
    }
}

pub fn deserialize_level<'de, D>(de: D) -> Result<Level, D::Error>
where
    D: Deserializer<'de>,
{
    de.deserialize_string(LevelVisitor)
}

/// Pacing delays, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    pub settle_ms: u64,
    pub command_ms: u64,
    pub reboot_ms: u64,
    pub read_timeout_ms: u64,
}

impl From<TimingSettings> for Timing {
    fn from(value: TimingSettings) -> Self {
        Timing {
            settle: Duration::from_millis(value.settle_ms),
            command: Duration::from_millis(value.command_ms),
            reboot: Duration::from_millis(value.reboot_ms),
            read_timeout: Duration::from_millis(value.read_timeout_ms),
        }
    }
}

impl Default for TimingSettings {
    fn default() -> Self {
        TimingSettings {
            settle_ms: 500,
            command_ms: 100,
            reboot_ms: 1000,
            read_timeout_ms: 1000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub baudrate: u32,
    pub count: u8,
    pub interface: ChipFamily,
    pub timing: TimingSettings,
    #[serde(deserialize_with = "deserialize_level")]
    pub loglevel: Level,
    pub json_logs: bool,
}

impl Settings {
    /// Defaults, overridden by an optional `blheli` file in the working
    /// directory, overridden by `BLHELI_*` environment variables.
    pub fn new() -> Result<Settings> {
        let reader = ConfigBuilder::<DefaultState>::default()
            .add_source(File::with_name("blheli").required(false))
            .add_source(Environment::with_prefix("BLHELI").separator("__"))
            .build()?;

        Ok(reader.try_deserialize()?)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            baudrate: 115200,
            count: 4,
            interface: ChipFamily::Silabs,
            timing: Default::default(),
            loglevel: Level::INFO,
            json_logs: false,
        }
    }
}
