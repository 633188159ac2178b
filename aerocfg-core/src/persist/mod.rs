//! Persistence of the configuration record
//!
//! Sealing and validation of record images, the media they live on and the
//! store that loads and saves them.

pub mod checksum;
pub mod medium;
pub mod store;
pub mod validator;

pub use medium::{EepromMedium, FlashMedium, Medium, WriteReport};
pub use store::{ConfigStore, LoadOutcome, LoadedConfig, RestoreReason, SaveError};
pub use validator::{check, validate, Invalid};
