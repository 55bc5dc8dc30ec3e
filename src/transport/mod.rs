//! Byte level access to the serial line the 4-way interface is attached to.

mod serial;
mod traits;

pub use serial::{SerialPortLink, SerialPortOpener};
pub use traits::{SerialLink, SerialOpener};

#[cfg(test)]
pub use traits::{MockSerialLink, MockSerialOpener};
