//! Persistent configuration for small flight controllers
//!
//! This crate owns the single configuration record of a flight controller:
//!
//! - Record layout, encoding and sealing (fixed size, fixed offsets)
//! - Validation (version, size, magic markers, XOR checksum)
//! - Factory defaults per hardware variant
//! - Field registry with menu ranges for editing collaborators
//! - Stick and throttle shaping tables derived from the record
//! - Config store binding the record to an EEPROM or page flash medium
//!
//! Everything here is board-agnostic; storage hardware is reached through
//! the `aerocfg-hal` traits.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod persist;
pub mod tables;
pub mod traits;

pub use config::{
    build_defaults, ChannelOrder, ConfigRecord, FieldError, FieldId, Features, HardwareVariant,
    Step, RECORD_SIZE, SCHEMA_VERSION,
};
pub use persist::{
    validate, ConfigStore, EepromMedium, FlashMedium, Invalid, LoadOutcome, LoadedConfig, Medium,
    RestoreReason, SaveError, WriteReport,
};
pub use tables::{build_tables, DerivedTables};
pub use traits::{Acknowledge, NoAck};
