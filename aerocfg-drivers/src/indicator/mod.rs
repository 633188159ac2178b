//! Save acknowledgment outputs

pub mod blink;

pub use blink::{BlinkAck, BLINK_MS};
