#![allow(dead_code)]

mod eeprom;
mod error;
mod interface;
mod logging;
mod protocol;
mod report;
mod session;
mod settings;
#[cfg(test)]
mod test;
mod transport;

use std::process::ExitCode;

use anyhow::{Context, Result};
use argh::FromArgs;
use interface::{Interface, LogObserver};
use logging::setup_logging;
use protocol::ChipFamily;
use report::{Data, Report};
use session::Session;
use settings::Settings;
use tracing::{error, info, instrument, Level};
use transport::{SerialOpener, SerialPortOpener};

/// Read and modify the configuration of BLHeli ESCs through a 4-way
/// interface.
///
/// The interface is reached over a serial port. Each ESC is put in flash
/// mode, its 112 byte configuration block is read or rewritten, and it is
/// reset again before the next one is touched. Settings are read from an
/// optional `blheli` file and `BLHELI_*` environment variables; flags given
/// on the command line take precedence.
#[derive(FromArgs)]
struct Args {
    /// serial port the 4-way interface is attached to
    #[argh(positional)]
    port: String,
    /// serial baud rate
    #[argh(option)]
    baudrate: Option<u32>,
    /// number of ESCs attached to the interface
    #[argh(option)]
    count: Option<u8>,
    /// chip family of the ESCs: silabs or atmel
    #[argh(option)]
    interface: Option<ChipFamily>,
    /// log every frame exchanged
    #[argh(switch, short = 'v')]
    verbose: bool,
    /// print the report as JSON
    #[argh(switch)]
    json: bool,
    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Get(GetConfig),
    Set(SetConfig),
}

/// Read the configuration of one ESC, or of every ESC.
#[derive(FromArgs)]
#[argh(subcommand, name = "get-config")]
struct GetConfig {
    /// zero based index of the ESC, all of them when omitted
    #[argh(option)]
    esc: Option<u8>,
}

/// Change configuration fields of one ESC, or of every ESC.
#[derive(FromArgs)]
#[argh(subcommand, name = "set-config")]
struct SetConfig {
    /// zero based index of the ESC, all of them when omitted
    #[argh(option)]
    esc: Option<u8>,
    /// field to set, as name=value; may be repeated
    #[argh(option, from_str_fn(parse_param))]
    param: Vec<(String, String)>,
}

fn parse_param(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_owned(), value.trim().to_owned()))
        }
        _ => Err(format!("expected name=value, got '{}'", value)),
    }
}

async fn execute<O: SerialOpener>(
    iface: &mut Interface<O>,
    count: u8,
    command: &Command,
) -> error::Result<Data> {
    iface.connect().await?;
    match command {
        Command::Get(GetConfig { esc: Some(esc) }) => Ok(Data::Esc(iface.read_config(*esc).await?)),
        Command::Get(GetConfig { esc: None }) => Ok(Data::Rig(iface.read_config_all().await?)),
        Command::Set(SetConfig { esc: Some(esc), param }) => {
            iface.write_config(*esc, param.as_slice()).await?;
            Ok(Data::Written { written: vec![*esc] })
        }
        Command::Set(SetConfig { esc: None, param }) => {
            iface.write_config_all(param.as_slice()).await?;
            Ok(Data::Written {
                written: (0..count).collect(),
            })
        }
    }
}

#[instrument(skip_all, fields(port = %args.port))]
async fn run(args: Args, settings: Settings) -> Report {
    let session = Session::new(
        SerialPortOpener,
        &args.port,
        args.baudrate.unwrap_or(settings.baudrate),
        settings.timing.into(),
    );
    let family = args.interface.unwrap_or(settings.interface);
    let count = args.count.unwrap_or(settings.count);
    let mut iface = Interface::new(family, session, count, Box::new(LogObserver));
    info!(%family, count, "Using {} interface", family);

    let outcome = execute(&mut iface, count, &args.command).await;
    iface.disconnect();

    match outcome {
        Ok(data) => Report::success(data),
        Err(e) => {
            error!(error = %e, "Command failed: {}", e);
            Report::failure(&e)
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args: Args = argh::from_env();
    let settings = Settings::new().context("Unable to load settings")?;
    let level = if args.verbose {
        Level::TRACE
    } else {
        settings.loglevel
    };
    setup_logging(level, settings.json_logs);

    let json = args.json;
    let report = run(args, settings).await;
    if json {
        println!("{}", report.to_json().context("Unable to serialize report")?);
    } else {
        print!("{}", report);
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
