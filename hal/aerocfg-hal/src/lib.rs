//! aerocfg Hardware Abstraction Layer
//!
//! This crate defines the traits the configuration store is written against.
//! Chip-specific crates (STM32F0, external EEPROM drivers, ...) implement
//! them so the same store logic runs on every board.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  aerocfg-core (ConfigStore, Validator)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  aerocfg-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ aerocfg-hal-  │       │ aerocfg-      │
//! │   stm32f0     │       │  drivers      │
//! │ (page flash)  │       │ (AT24 EEPROM) │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`store::ByteStore`] - Byte-addressable non-volatile memory
//! - [`store::PageFlash`] - Erase-before-program page flash
//! - [`gpio::OutputPin`] - Digital output (status LED, beeper)
//! - [`i2c::I2cBus`] - I2C bus operations for external EEPROMs
//!
//! With the `mock` feature, [`mock`] provides in-memory media for host tests.

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod i2c;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod store;

// Re-export key traits at crate root for convenience
pub use gpio::OutputPin;
pub use i2c::I2cBus;
pub use store::{ByteStore, PageFlash, StoreError, WORD_SIZE};
