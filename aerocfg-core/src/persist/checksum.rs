//! XOR checksum over the record image
//!
//! The checksum byte is chosen so the XOR of every byte in a record,
//! checksum included, is zero.

use crate::config::record::{offsets, RECORD_SIZE};

/// XOR of all bytes
pub fn xor_reduce(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, &b| acc ^ b)
}

/// Zero the checksum field, compute the checksum and store it
///
/// Returns the stored checksum.
pub fn seal(image: &mut [u8; RECORD_SIZE]) -> u8 {
    image[offsets::CHECKSUM] = 0;
    let checksum = xor_reduce(image);
    image[offsets::CHECKSUM] = checksum;
    checksum
}
