//! Test doubles shared by the unit tests.

mod rig;

pub use rig::{EscSim, Rig, RigLink, RigOpener, INTERFACE_NAME};
