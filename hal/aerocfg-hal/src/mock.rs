//! In-memory storage media for host testing
//!
//! Both mocks start fully erased (0xFF) and count physical operations so
//! tests can check wear behavior. [`MockPageFlash`] can also inject erase
//! and program failures to simulate torn writes.

use crate::store::{ByteStore, PageFlash, StoreError, WORD_SIZE};

/// Byte-addressable EEPROM simulation
#[derive(Debug, Clone)]
pub struct MockEeprom<const N: usize> {
    cells: [u8; N],
    writes: usize,
}

impl<const N: usize> Default for MockEeprom<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> MockEeprom<N> {
    /// Create an erased EEPROM
    pub const fn new() -> Self {
        Self {
            cells: [0xFF; N],
            writes: 0,
        }
    }

    /// Raw contents (for test verification)
    pub fn contents(&self) -> &[u8; N] {
        &self.cells
    }

    /// Number of physical byte writes since creation or the last reset
    pub fn physical_writes(&self) -> usize {
        self.writes
    }

    /// Reset the write counter
    pub fn reset_counters(&mut self) {
        self.writes = 0;
    }

    /// Fill every cell without counting writes
    pub fn fill(&mut self, value: u8) {
        self.cells = [value; N];
    }

    /// Flip bits of one stored byte behind the driver's back
    pub fn corrupt(&mut self, offset: usize, mask: u8) {
        self.cells[offset] ^= mask;
    }

    /// Overwrite a stored byte behind the driver's back
    pub fn poke(&mut self, offset: usize, value: u8) {
        self.cells[offset] = value;
    }
}

impl<const N: usize> ByteStore for MockEeprom<N> {
    fn capacity(&self) -> usize {
        N
    }

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), StoreError> {
        let end = offset
            .checked_add(buf.len())
            .filter(|&end| end <= N)
            .ok_or(StoreError::OutOfRange)?;
        buf.copy_from_slice(&self.cells[offset..end]);
        Ok(())
    }

    fn write_byte(&mut self, offset: usize, value: u8) -> Result<(), StoreError> {
        let cell = self.cells.get_mut(offset).ok_or(StoreError::OutOfRange)?;
        *cell = value;
        self.writes += 1;
        Ok(())
    }
}

/// Page flash simulation
///
/// `N` is the total size and `P` the page size, both in bytes. Addresses
/// start at zero.
#[derive(Debug, Clone)]
pub struct MockPageFlash<const N: usize, const P: usize> {
    cells: [u8; N],
    erases: u32,
    programs: u32,
    fail_erase: bool,
    fail_program_at: Option<u32>,
}

impl<const N: usize, const P: usize> Default for MockPageFlash<N, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize, const P: usize> MockPageFlash<N, P> {
    /// Create an erased flash
    pub const fn new() -> Self {
        Self {
            cells: [0xFF; N],
            erases: 0,
            programs: 0,
            fail_erase: false,
            fail_program_at: None,
        }
    }

    /// Raw contents of a region (for test verification)
    pub fn contents(&self, address: u32, len: usize) -> &[u8] {
        let start = address as usize;
        &self.cells[start..start + len]
    }

    /// Number of page erases performed
    pub fn erase_count(&self) -> u32 {
        self.erases
    }

    /// Number of words programmed successfully
    pub fn program_count(&self) -> u32 {
        self.programs
    }

    /// Reset the operation counters
    pub fn reset_counters(&mut self) {
        self.erases = 0;
        self.programs = 0;
    }

    /// Make the next erase fail without touching the page
    pub fn fail_next_erase(&mut self) {
        self.fail_erase = true;
    }

    /// Make programming the word at `address` fail, leaving it erased
    pub fn fail_program_at(&mut self, address: u32) {
        self.fail_program_at = Some(address);
    }

    /// Remove any injected failures
    pub fn clear_faults(&mut self) {
        self.fail_erase = false;
        self.fail_program_at = None;
    }

    /// Flip bits of one stored byte behind the driver's back
    pub fn corrupt(&mut self, address: u32, mask: u8) {
        self.cells[address as usize] ^= mask;
    }

    fn check_range(address: u32, len: usize) -> Result<usize, StoreError> {
        let start = address as usize;
        match start.checked_add(len) {
            Some(end) if end <= N => Ok(start),
            _ => Err(StoreError::OutOfRange),
        }
    }
}

impl<const N: usize, const P: usize> PageFlash for MockPageFlash<N, P> {
    const PAGE_SIZE: usize = P;

    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<(), StoreError> {
        let start = Self::check_range(address, buf.len())?;
        buf.copy_from_slice(&self.cells[start..start + buf.len()]);
        Ok(())
    }

    fn erase_page(&mut self, page_address: u32) -> Result<(), StoreError> {
        let start = Self::check_range(page_address, P)?;
        if start % P != 0 {
            return Err(StoreError::Misaligned);
        }
        if self.fail_erase {
            self.fail_erase = false;
            return Err(StoreError::Erase {
                address: page_address,
            });
        }

        self.cells[start..start + P].fill(Self::ERASED);
        self.erases += 1;
        Ok(())
    }

    fn program_word(&mut self, address: u32, word: u32) -> Result<(), StoreError> {
        let start = Self::check_range(address, WORD_SIZE)?;
        if start % WORD_SIZE != 0 {
            return Err(StoreError::Misaligned);
        }
        if self.fail_program_at == Some(address) {
            return Err(StoreError::Program { address });
        }

        // Programming can only clear bits
        for (cell, byte) in self.cells[start..start + WORD_SIZE]
            .iter_mut()
            .zip(word.to_le_bytes())
        {
            *cell &= byte;
        }
        self.programs += 1;
        Ok(())
    }
}
