//! External EEPROM drivers

pub mod at24;

pub use at24::{At24Eeprom, AT24_ACK_POLL_LIMIT, AT24_ADDRESS, AT24_MAX_CAPACITY};
