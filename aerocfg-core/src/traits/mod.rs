//! Collaborator traits
//!
//! Interfaces between the config store and board-specific code.

pub mod ack;

pub use ack::{Acknowledge, NoAck};
