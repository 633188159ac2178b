//! Driver implementations for the configuration store
//!
//! This crate provides concrete implementations of the traits defined in
//! aerocfg-hal and aerocfg-core:
//!
//! - Bus-attached EEPROM (24Cxx family) as a byte-addressable store
//! - LED/beeper blink as the save acknowledgment

#![no_std]
#![deny(unsafe_code)]

pub mod eeprom;
pub mod indicator;
