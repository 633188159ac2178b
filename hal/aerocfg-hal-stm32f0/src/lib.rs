//! STM32F0-specific HAL for aerocfg
//!
//! This crate binds the `aerocfg-hal` traits to embassy-stm32 peripherals:
//!
//! - [`flash::Stm32PageFlash`] - the last page of on-chip flash as a
//!   [`PageFlash`](aerocfg_hal::PageFlash) medium
//! - [`gpio::StatusPin`] - status LED / beeper output
//! - [`i2c::BlockingI2c`] - I2C master for external EEPROMs
//!
//! # Features
//!
//! - `stm32f042f6`, `stm32f042k6` - Chip selection
//! - `defmt` - Enable debug formatting support

#![no_std]

pub mod flash;
pub mod gpio;
pub mod i2c;

pub use flash::Stm32PageFlash;
pub use gpio::StatusPin;
pub use i2c::BlockingI2c;
