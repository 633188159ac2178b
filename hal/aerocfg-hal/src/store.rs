//! Non-volatile storage abstractions
//!
//! The configuration record lives on one of two kinds of medium:
//!
//! - **Byte-addressable** (AVR-style EEPROM, 24Cxx over I2C): any byte can be
//!   rewritten on its own. Writes are slow and wear the cell, so unchanged
//!   bytes are never rewritten.
//! - **Page flash** (on-chip program flash): a whole page must be erased to
//!   all-ones before words in it can be programmed. Programming can only
//!   clear bits.
//!
//! Neither trait knows anything about the record layout; offsets and
//! addresses are chosen by the caller.

/// Minimum programmable unit of [`PageFlash`], in bytes
pub const WORD_SIZE: usize = 4;

/// Errors from non-volatile storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Access outside the medium
    OutOfRange,
    /// Address not aligned to the page or word size
    Misaligned,
    /// Page erase failed
    Erase {
        /// Start address of the page
        address: u32,
    },
    /// Word program failed
    Program {
        /// Address of the failing word
        address: u32,
    },
    /// Read operation failed
    Read,
    /// Transport (bus) error talking to an external device
    Bus,
}

/// Byte-addressable non-volatile memory
///
/// Implementors provide raw single-byte writes; the provided methods build
/// the wear-minimizing write path on top of them.
pub trait ByteStore {
    /// Total capacity in bytes
    fn capacity(&self) -> usize;

    /// Read `buf.len()` bytes starting at `offset`
    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), StoreError>;

    /// Physically write one byte
    ///
    /// Every call costs one write cycle of the cell, whatever its contents.
    fn write_byte(&mut self, offset: usize, value: u8) -> Result<(), StoreError>;

    /// Read a single byte
    fn read_byte(&mut self, offset: usize) -> Result<u8, StoreError> {
        let mut byte = [0u8; 1];
        self.read(offset, &mut byte)?;
        Ok(byte[0])
    }

    /// Write one byte only if the stored value differs
    ///
    /// Afterwards, reading `offset` returns `value`. Returns `true` when a
    /// physical write took place.
    fn write_if_different(&mut self, offset: usize, value: u8) -> Result<bool, StoreError> {
        if self.read_byte(offset)? == value {
            return Ok(false);
        }
        self.write_byte(offset, value)?;
        Ok(true)
    }

    /// Write a block through [`write_if_different`](Self::write_if_different)
    ///
    /// The resulting contents are identical to an unconditional overwrite.
    /// Returns the number of bytes physically written.
    fn write_block_changes(&mut self, offset: usize, data: &[u8]) -> Result<usize, StoreError> {
        let end = offset
            .checked_add(data.len())
            .ok_or(StoreError::OutOfRange)?;
        if end > self.capacity() {
            return Err(StoreError::OutOfRange);
        }

        let mut written = 0;
        for (i, &byte) in data.iter().enumerate() {
            if self.write_if_different(offset + i, byte)? {
                written += 1;
            }
        }
        Ok(written)
    }
}

/// Erase-before-program page flash
///
/// Addresses are absolute medium addresses. `program_word` is only valid on
/// erased cells; programming a non-erased word ANDs the bits together on
/// real hardware, which corrupts the data.
pub trait PageFlash {
    /// Erase page size in bytes
    const PAGE_SIZE: usize;

    /// Value of an erased byte
    const ERASED: u8 = 0xFF;

    /// Read `buf.len()` bytes starting at `address`
    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<(), StoreError>;

    /// Erase the page starting at `page_address`
    ///
    /// Every byte in the page reads back as [`ERASED`](Self::ERASED).
    fn erase_page(&mut self, page_address: u32) -> Result<(), StoreError>;

    /// Program one little-endian word at a word-aligned `address`
    fn program_word(&mut self, address: u32, word: u32) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockEeprom;

    #[test]
    fn test_write_if_different_skips_equal_byte() {
        let mut eeprom = MockEeprom::<64>::new();

        assert_eq!(eeprom.write_if_different(3, 0x42), Ok(true));
        assert_eq!(eeprom.physical_writes(), 1);

        assert_eq!(eeprom.write_if_different(3, 0x42), Ok(false));
        assert_eq!(eeprom.physical_writes(), 1);
        assert_eq!(eeprom.read_byte(3), Ok(0x42));
    }

    #[test]
    fn test_block_changes_counts_only_differences() {
        let mut eeprom = MockEeprom::<64>::new();
        let data = [1u8, 2, 3, 4, 5, 6, 7, 8];

        assert_eq!(eeprom.write_block_changes(10, &data), Ok(8));

        let mut changed = data;
        changed[2] = 0x33;
        changed[7] = 0x88;
        assert_eq!(eeprom.write_block_changes(10, &changed), Ok(2));

        let mut buf = [0u8; 8];
        eeprom.read(10, &mut buf).unwrap();
        assert_eq!(buf, changed);
    }

    #[test]
    fn test_block_changes_out_of_range() {
        let mut eeprom = MockEeprom::<16>::new();
        assert_eq!(
            eeprom.write_block_changes(12, &[0u8; 8]),
            Err(StoreError::OutOfRange)
        );
        assert_eq!(
            eeprom.write_block_changes(usize::MAX, &[0u8; 2]),
            Err(StoreError::OutOfRange)
        );
        // Nothing was written on rejection
        assert_eq!(eeprom.physical_writes(), 0);
    }

    #[test]
    fn test_block_changes_matches_full_overwrite() {
        let mut diffed = MockEeprom::<32>::new();
        let mut full = MockEeprom::<32>::new();
        diffed.fill(0x5A);
        full.fill(0x5A);

        let data: [u8; 20] = core::array::from_fn(|i| (i as u8).wrapping_mul(37));
        diffed.write_block_changes(4, &data).unwrap();
        for (i, &b) in data.iter().enumerate() {
            full.write_byte(4 + i, b).unwrap();
        }

        assert_eq!(diffed.contents(), full.contents());
        assert!(diffed.physical_writes() <= full.physical_writes());
    }
}
