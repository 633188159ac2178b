//! Record validation
//!
//! A candidate image is usable only if every check passes, in this order:
//! length, version, declared size, magic markers, checksum. There is no
//! migration; an older or newer layout is treated as absent.

use crate::config::record::{offsets, MAGIC_BE, MAGIC_EF, RECORD_SIZE, SCHEMA_VERSION};

use super::checksum::xor_reduce;

/// Why a candidate image was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Invalid {
    /// Fewer bytes than a record
    Truncated,
    /// Layout version differs from the compiled one
    VersionMismatch { found: u8 },
    /// Declared size differs from the compiled one
    SizeMismatch { found: u16 },
    /// Magic markers missing (blank, erased or foreign memory)
    BadMagic,
    /// Bytes don't XOR to zero
    Checksum { residue: u8 },
}

/// Check a raw candidate image
pub fn check(raw: &[u8]) -> Result<(), Invalid> {
    if raw.len() < RECORD_SIZE {
        return Err(Invalid::Truncated);
    }
    let raw = &raw[..RECORD_SIZE];

    let version = raw[offsets::VERSION];
    if version != SCHEMA_VERSION {
        return Err(Invalid::VersionMismatch { found: version });
    }

    let size = u16::from_le_bytes([raw[offsets::SIZE], raw[offsets::SIZE + 1]]);
    if size as usize != RECORD_SIZE {
        return Err(Invalid::SizeMismatch { found: size });
    }

    if raw[offsets::MAGIC_BE] != MAGIC_BE || raw[offsets::MAGIC_EF] != MAGIC_EF {
        return Err(Invalid::BadMagic);
    }

    match xor_reduce(raw) {
        0 => Ok(()),
        residue => Err(Invalid::Checksum { residue }),
    }
}

/// Check whether a raw candidate image is a usable record
pub fn validate(raw: &[u8]) -> bool {
    check(raw).is_ok()
}
