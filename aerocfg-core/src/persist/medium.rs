//! Binding of the record to a storage medium
//!
//! A [`Medium`] reads and writes exactly one record image at one fixed
//! location. The two realizations follow the two kinds of storage:
//! [`EepromMedium`] rewrites only the bytes that changed, [`FlashMedium`]
//! erases its page and programs the image word by word.

use aerocfg_hal::{ByteStore, PageFlash, StoreError, WORD_SIZE};

use crate::config::record::RECORD_SIZE;

/// What a write physically did to the medium
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WriteReport {
    /// Bytes (EEPROM) or words (flash) physically written
    pub units_written: usize,
    /// Flash pages erased
    pub pages_erased: usize,
}

/// Fixed record location on a storage medium
pub trait Medium {
    /// Read the stored image, whatever it contains
    fn read_image(&mut self, image: &mut [u8; RECORD_SIZE]) -> Result<(), StoreError>;

    /// Replace the stored image
    fn write_image(&mut self, image: &[u8; RECORD_SIZE]) -> Result<WriteReport, StoreError>;
}

/// Record at a fixed offset of a byte-addressable store
pub struct EepromMedium<S> {
    store: S,
    offset: usize,
}

impl<S: ByteStore> EepromMedium<S> {
    /// Place the record at `offset`
    ///
    /// Fails when the record doesn't fit behind `offset`.
    pub fn new(store: S, offset: usize) -> Result<Self, StoreError> {
        match offset.checked_add(RECORD_SIZE) {
            Some(end) if end <= store.capacity() => Ok(Self { store, offset }),
            _ => Err(StoreError::OutOfRange),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S: ByteStore> Medium for EepromMedium<S> {
    fn read_image(&mut self, image: &mut [u8; RECORD_SIZE]) -> Result<(), StoreError> {
        self.store.read(self.offset, image)
    }

    fn write_image(&mut self, image: &[u8; RECORD_SIZE]) -> Result<WriteReport, StoreError> {
        let written = self.store.write_block_changes(self.offset, image)?;
        Ok(WriteReport {
            units_written: written,
            pages_erased: 0,
        })
    }
}

/// Record at the start of a reserved flash page
pub struct FlashMedium<F> {
    flash: F,
    page_address: u32,
}

impl<F: PageFlash> FlashMedium<F> {
    /// Place the record at the page starting at `page_address`
    ///
    /// Fails when the address is not page aligned or the record is larger
    /// than a page.
    pub fn new(flash: F, page_address: u32) -> Result<Self, StoreError> {
        if RECORD_SIZE > F::PAGE_SIZE {
            return Err(StoreError::OutOfRange);
        }
        if page_address as usize % F::PAGE_SIZE != 0 {
            return Err(StoreError::Misaligned);
        }
        Ok(Self {
            flash,
            page_address,
        })
    }

    pub fn flash(&self) -> &F {
        &self.flash
    }

    pub fn flash_mut(&mut self) -> &mut F {
        &mut self.flash
    }

    pub fn into_inner(self) -> F {
        self.flash
    }
}

impl<F: PageFlash> Medium for FlashMedium<F> {
    fn read_image(&mut self, image: &mut [u8; RECORD_SIZE]) -> Result<(), StoreError> {
        self.flash.read(self.page_address, image)
    }

    /// Erase the page, then program every word in order
    ///
    /// The first failure stops the sequence and is returned as is. The page
    /// is then left partly programmed, which the checksum catches on the
    /// next load.
    fn write_image(&mut self, image: &[u8; RECORD_SIZE]) -> Result<WriteReport, StoreError> {
        self.flash.erase_page(self.page_address)?;

        let mut report = WriteReport {
            units_written: 0,
            pages_erased: 1,
        };
        for (i, chunk) in image.chunks_exact(WORD_SIZE).enumerate() {
            let address = self.page_address + (i * WORD_SIZE) as u32;
            let word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            self.flash.program_word(address, word)?;
            report.units_written += 1;
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aerocfg_hal::mock::{MockEeprom, MockPageFlash};

    type Flash = MockPageFlash<4096, 1024>;

    fn pattern() -> [u8; RECORD_SIZE] {
        core::array::from_fn(|i| (i as u8) ^ 0x5A)
    }

    #[test]
    fn test_eeprom_round_trip_at_offset() {
        let mut medium = EepromMedium::new(MockEeprom::<512>::new(), 16).unwrap();
        let report = medium.write_image(&pattern()).unwrap();
        assert_eq!(report.pages_erased, 0);

        let mut image = [0u8; RECORD_SIZE];
        medium.read_image(&mut image).unwrap();
        assert_eq!(image, pattern());
        // Bytes before the record are untouched
        assert!(medium.store().contents()[..16].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_eeprom_rewrite_costs_nothing() {
        let mut medium = EepromMedium::new(MockEeprom::<512>::new(), 0).unwrap();
        medium.write_image(&pattern()).unwrap();
        medium.store_mut().reset_counters();

        let report = medium.write_image(&pattern()).unwrap();
        assert_eq!(report.units_written, 0);
        assert_eq!(medium.store().physical_writes(), 0);
    }

    #[test]
    fn test_eeprom_record_must_fit() {
        assert!(EepromMedium::new(MockEeprom::<512>::new(), 284).is_ok());
        assert_eq!(
            EepromMedium::new(MockEeprom::<512>::new(), 285).err(),
            Some(StoreError::OutOfRange)
        );
        assert_eq!(
            EepromMedium::new(MockEeprom::<128>::new(), 0).err(),
            Some(StoreError::OutOfRange)
        );
    }

    #[test]
    fn test_flash_round_trip() {
        let mut medium = FlashMedium::new(Flash::new(), 3072).unwrap();
        let report = medium.write_image(&pattern()).unwrap();
        assert_eq!(
            report,
            WriteReport {
                units_written: RECORD_SIZE / WORD_SIZE,
                pages_erased: 1
            }
        );

        let mut image = [0u8; RECORD_SIZE];
        medium.read_image(&mut image).unwrap();
        assert_eq!(image, pattern());
    }

    #[test]
    fn test_flash_overwrite_needs_no_merge() {
        let mut medium = FlashMedium::new(Flash::new(), 0).unwrap();
        medium.write_image(&[0x00; RECORD_SIZE]).unwrap();
        // Erase first, so ones can come back
        medium.write_image(&pattern()).unwrap();
        assert_eq!(medium.flash().contents(0, RECORD_SIZE), &pattern()[..]);
    }

    #[test]
    fn test_flash_placement_checks() {
        assert_eq!(
            FlashMedium::new(Flash::new(), 100).err(),
            Some(StoreError::Misaligned)
        );
        assert_eq!(
            FlashMedium::new(MockPageFlash::<512, 128>::new(), 0).err(),
            Some(StoreError::OutOfRange)
        );
    }

    #[test]
    fn test_flash_program_failure_stops_sequence() {
        let mut medium = FlashMedium::new(Flash::new(), 1024).unwrap();
        medium.flash_mut().fail_program_at(1024 + 40);

        assert_eq!(
            medium.write_image(&pattern()),
            Err(StoreError::Program { address: 1024 + 40 })
        );
        // Ten words made it, the rest of the page stays erased
        assert_eq!(medium.flash().program_count(), 10);
        assert_eq!(medium.flash().contents(1024, 40), &pattern()[..40]);
        assert!(medium.flash().contents(1024 + 40, RECORD_SIZE - 40).iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_flash_erase_failure_programs_nothing() {
        let mut medium = FlashMedium::new(Flash::new(), 0).unwrap();
        medium.flash_mut().fail_next_erase();
        assert_eq!(
            medium.write_image(&pattern()),
            Err(StoreError::Erase { address: 0 })
        );
        assert_eq!(medium.flash().program_count(), 0);
    }
}
