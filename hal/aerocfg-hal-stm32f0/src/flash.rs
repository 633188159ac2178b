//! On-chip flash medium for STM32F0
//!
//! STM32F042 parts have 32KB of flash in 1KB pages. The configuration record
//! occupies the last page, well clear of the firmware image.
//!
//! Addresses passed through [`PageFlash`] are offsets from the start of
//! flash (`0x0800_0000`), the same convention embassy-stm32 uses.

use aerocfg_hal::store::{PageFlash, StoreError, WORD_SIZE};
use embassy_stm32::flash::{Blocking, Error as FlashError, Flash};
use embassy_stm32::peripherals::FLASH;
use embassy_stm32::Peri;

/// Total flash on STM32F042x6
pub const FLASH_SIZE: usize = 32 * 1024;

/// Flash page size for STM32F0 series
pub const FLASH_PAGE_SIZE: usize = 1024;

/// Offset of the page reserved for the configuration record
pub const CONFIG_PAGE_OFFSET: u32 = (FLASH_SIZE - FLASH_PAGE_SIZE) as u32;

/// Page flash medium backed by the STM32F0 flash controller
pub struct Stm32PageFlash<'d> {
    flash: Flash<'d, Blocking>,
}

impl<'d> Stm32PageFlash<'d> {
    /// Take ownership of the flash peripheral
    pub fn new(flash: Peri<'d, FLASH>) -> Self {
        Self {
            flash: Flash::new_blocking(flash),
        }
    }

    fn check_range(address: u32, len: usize) -> Result<(), StoreError> {
        match (address as usize).checked_add(len) {
            Some(end) if end <= FLASH_SIZE => Ok(()),
            _ => Err(StoreError::OutOfRange),
        }
    }
}

impl<'d> PageFlash for Stm32PageFlash<'d> {
    const PAGE_SIZE: usize = FLASH_PAGE_SIZE;

    fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<(), StoreError> {
        Self::check_range(address, buf.len())?;
        self.flash
            .blocking_read(address, buf)
            .map_err(|_| StoreError::Read)
    }

    fn erase_page(&mut self, page_address: u32) -> Result<(), StoreError> {
        Self::check_range(page_address, FLASH_PAGE_SIZE)?;
        if page_address as usize % FLASH_PAGE_SIZE != 0 {
            return Err(StoreError::Misaligned);
        }
        self.flash
            .blocking_erase(page_address, page_address + FLASH_PAGE_SIZE as u32)
            .map_err(|e| match e {
                FlashError::Unaligned => StoreError::Misaligned,
                _ => StoreError::Erase {
                    address: page_address,
                },
            })
    }

    fn program_word(&mut self, address: u32, word: u32) -> Result<(), StoreError> {
        Self::check_range(address, WORD_SIZE)?;
        if address as usize % WORD_SIZE != 0 {
            return Err(StoreError::Misaligned);
        }
        // The F0 programs half-words; embassy splits the word for us
        self.flash
            .blocking_write(address, &word.to_le_bytes())
            .map_err(|_| StoreError::Program { address })
    }
}
