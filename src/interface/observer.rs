use mockall::automock;
use tracing::warn;

/// Receives the non fatal findings of a configuration run.
#[automock]
pub trait Observer: Send {
    /// The common configuration of `esc` differs from the first ESC's in `fields`.
    fn common_config_mismatch(&mut self, esc: u8, fields: &[&'static str]);
    /// `name` does not match a writable field and was skipped.
    fn unknown_parameter(&mut self, esc: u8, name: &str);
}

impl Observer for () {
    fn common_config_mismatch(&mut self, _esc: u8, _fields: &[&'static str]) {}

    fn unknown_parameter(&mut self, _esc: u8, _name: &str) {}
}

fn mismatch_message(esc: u8, fields: &[&str]) -> String {
    format!(
        "Common configuration of ESC index {} differs from ESC index 0 in {}",
        esc,
        fields.join(", ")
    )
}

fn unknown_parameter_message(esc: u8, name: &str) -> String {
    format!("Unknown parameter {:?} ignored for ESC index {}", name, esc)
}

/// Reports findings as `tracing` warnings. ESCs are named by their zero
/// based index, as on the command line.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn common_config_mismatch(&mut self, esc: u8, fields: &[&'static str]) {
        warn!(esc, ?fields, "{}", mismatch_message(esc, fields));
    }

    fn unknown_parameter(&mut self, esc: u8, name: &str) {
        warn!(esc, name, "{}", unknown_parameter_message(esc, name));
    }
}
