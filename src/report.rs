use std::fmt::{self, Display, Formatter};

use serde::Serialize;
use serde_json::Value;

use crate::interface::{EscReport, RigReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Data {
    Esc(EscReport),
    Rig(RigReport),
    Written { written: Vec<u8> },
    Message(String),
}

/// The single outcome of a command run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub status: Status,
    pub data: Data,
}

impl Report {
    pub fn success(data: Data) -> Report {
        Report {
            status: Status::Success,
            data,
        }
    }

    pub fn failure(error: &impl Display) -> Report {
        Report {
            status: Status::Error,
            data: Data::Message(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn write_section(f: &mut Formatter<'_>, title: &str, section: &impl Serialize) -> fmt::Result {
    writeln!(f, "{}:", title)?;
    let Ok(Value::Object(fields)) = serde_json::to_value(section) else {
        return Err(fmt::Error);
    };
    for (name, value) in fields {
        match value {
            Value::String(s) => writeln!(f, "  {}: {}", name, s)?,
            other => writeln!(f, "  {}: {}", name, other)?,
        }
    }
    Ok(())
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.data {
            Data::Esc(report) => {
                write_section(f, "Device info", &report.info)?;
                write_section(f, "Common configuration", &report.common)?;
                write_section(f, "ESC configuration", &report.config)
            }
            Data::Rig(report) => {
                write_section(f, "Common configuration", &report.common)?;
                for entry in &report.escs {
                    write_section(f, &format!("ESC #{} device info", entry.esc), &entry.info)?;
                    write_section(f, &format!("ESC #{} configuration", entry.esc), &entry.config)?;
                }
                Ok(())
            }
            Data::Written { written } => {
                let escs: Vec<_> = written.iter().map(|esc| format!("#{}", esc)).collect();
                writeln!(f, "Configuration written to ESC {}", escs.join(", "))
            }
            Data::Message(message) => match self.status {
                Status::Success => writeln!(f, "{}", message),
                Status::Error => writeln!(f, "Error: {}", message),
            },
        }
    }
}
