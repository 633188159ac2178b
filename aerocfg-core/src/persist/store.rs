//! Config store
//!
//! The store has two states. [`ConfigStore`] is bound to a medium but holds
//! no record yet; [`ConfigStore::load`] consumes it and returns a
//! [`LoadedConfig`], which owns the record and is the only way to save.
//!
//! ```text
//!   ConfigStore ──load()──▶ LoadedConfig ──save()──▶ LoadedConfig
//!                  │
//!                  ├─ valid image   → decode
//!                  └─ invalid image → defaults, save
//! ```

use aerocfg_hal::StoreError;

use crate::config::fields::{FieldError, FieldId, Step};
use crate::config::record::{ConfigRecord, RECORD_SIZE};
use crate::config::{build_defaults, HardwareVariant};
use crate::tables::DerivedTables;
use crate::traits::{Acknowledge, NoAck};

use super::medium::{Medium, WriteReport};
use super::validator::{self, Invalid};

/// Errors from [`LoadedConfig::save`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SaveError {
    /// The medium rejected the write or the read-back
    Medium(StoreError),
    /// The write completed but the stored image doesn't validate
    Verify(Invalid),
}

impl From<StoreError> for SaveError {
    fn from(e: StoreError) -> Self {
        SaveError::Medium(e)
    }
}

/// Why defaults replaced the stored record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RestoreReason {
    /// The stored image failed validation
    Invalid(Invalid),
    /// The medium could not be read
    Unreadable(StoreError),
    /// A factory reset was asked for
    Requested,
}

/// Result of [`ConfigStore::load`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadOutcome {
    /// The stored record was valid and is in use
    Stored,
    /// Defaults are in use
    Restored {
        reason: RestoreReason,
        /// Whether the defaults were written back to the medium
        persisted: bool,
    },
}

impl LoadOutcome {
    /// Check whether defaults replaced the stored record
    pub fn is_restored(&self) -> bool {
        matches!(self, LoadOutcome::Restored { .. })
    }
}

/// Config store bound to a medium, before loading
pub struct ConfigStore<M, A = NoAck> {
    medium: M,
    ack: A,
    variant: HardwareVariant,
}

impl<M: Medium> ConfigStore<M, NoAck> {
    /// Bind to a medium, without save acknowledgment
    pub fn new(medium: M) -> Self {
        Self::with_ack(medium, NoAck)
    }
}

impl<M: Medium, A: Acknowledge> ConfigStore<M, A> {
    /// Bind to a medium, signaling every successful save through `ack`
    pub fn with_ack(medium: M, ack: A) -> Self {
        Self {
            medium,
            ack,
            variant: HardwareVariant::COMPILED,
        }
    }

    /// Use the defaults of another hardware variant
    pub fn variant(mut self, variant: HardwareVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Load the stored record, falling back to defaults
    ///
    /// A record that fails validation is never exposed: defaults for the
    /// configured variant replace it and are saved immediately. The derived
    /// tables are built in both cases.
    pub fn load(self) -> (LoadedConfig<M, A>, LoadOutcome) {
        self.load_with_reset(false)
    }

    /// Like [`load`](Self::load), but `reset` skips the stored record and
    /// restores defaults unconditionally
    pub fn load_with_reset(self, reset: bool) -> (LoadedConfig<M, A>, LoadOutcome) {
        let ConfigStore {
            mut medium,
            ack,
            variant,
        } = self;

        let mut image = [0u8; RECORD_SIZE];
        let candidate = if reset {
            Err(RestoreReason::Requested)
        } else {
            match medium.read_image(&mut image) {
                Ok(()) => validator::check(&image).map_err(RestoreReason::Invalid),
                Err(e) => Err(RestoreReason::Unreadable(e)),
            }
        };

        let mut config = LoadedConfig {
            medium,
            ack,
            variant,
            record: ConfigRecord::from_bytes(&image),
            tables: DerivedTables::new(),
        };

        let outcome = match candidate {
            Ok(()) => {
                info!("config: stored record v{=u8} loaded", config.record.version);
                LoadOutcome::Stored
            }
            Err(reason) => {
                warn!("config: restoring defaults: {}", reason);
                config.record = build_defaults(variant);
                let persisted = match config.save() {
                    Ok(_) => true,
                    Err(e) => {
                        error!("config: defaults not persisted: {}", e);
                        false
                    }
                };
                LoadOutcome::Restored { reason, persisted }
            }
        };

        config.tables.rebuild(&config.record.rc);
        (config, outcome)
    }
}

/// Loaded configuration: the active record, its tables and its medium
pub struct LoadedConfig<M, A = NoAck> {
    medium: M,
    ack: A,
    variant: HardwareVariant,
    record: ConfigRecord,
    tables: DerivedTables,
}

impl<M: Medium, A: Acknowledge> LoadedConfig<M, A> {
    /// The active record
    pub fn record(&self) -> &ConfigRecord {
        &self.record
    }

    /// The active record, for editing; changes persist on the next save
    pub fn record_mut(&mut self) -> &mut ConfigRecord {
        &mut self.record
    }

    /// Shaping curves built at the last load or save
    pub fn tables(&self) -> &DerivedTables {
        &self.tables
    }

    /// Hardware variant used for defaults
    pub fn hardware_variant(&self) -> HardwareVariant {
        self.variant
    }

    /// Read a field from the in-memory record
    pub fn get_field(&self, id: FieldId) -> Result<i32, FieldError> {
        self.record.get_field(id)
    }

    /// Set a field, rejecting values outside its range
    pub fn set_field(&mut self, id: FieldId, value: i32) -> Result<(), FieldError> {
        self.record.set_field(id, value)
    }

    /// Move a field one increment, clamped to its range
    pub fn step_field(&mut self, id: FieldId, step: Step) -> Result<i32, FieldError> {
        self.record.step_field(id, step)
    }

    /// Write the record to the medium
    ///
    /// The checksum is recomputed and the write runs inside a critical
    /// section. After a successful write the medium is read back into
    /// memory and the tables are rebuilt. On any error the in-memory record
    /// is kept as it was, checksum aside.
    pub fn save(&mut self) -> Result<WriteReport, SaveError> {
        let written = critical_section::with(|_| {
            let image = self.record.seal();
            self.medium.write_image(&image)
        });
        let report = written.map_err(|e| {
            error!("config: write failed: {}", e);
            SaveError::Medium(e)
        })?;
        debug!(
            "config: wrote {=usize} units, erased {=usize} pages",
            report.units_written,
            report.pages_erased
        );

        let mut readback = [0u8; RECORD_SIZE];
        self.medium.read_image(&mut readback)?;
        if let Err(reason) = validator::check(&readback) {
            error!("config: read-back invalid: {}", reason);
            return Err(SaveError::Verify(reason));
        }

        self.record = ConfigRecord::from_bytes(&readback);
        self.tables.rebuild(&self.record.rc);
        self.ack.saved();
        Ok(report)
    }

    /// Replace the record with factory defaults and save them
    pub fn restore_defaults(&mut self) -> Result<WriteReport, SaveError> {
        info!("config: factory reset");
        self.record = build_defaults(self.variant);
        self.save()
    }

    /// Bound storage medium
    pub fn medium(&self) -> &M {
        &self.medium
    }

    /// Mutable access to the bound medium
    pub fn medium_mut(&mut self) -> &mut M {
        &mut self.medium
    }

    /// Save acknowledgment
    pub fn ack(&self) -> &A {
        &self.ack
    }

    /// Release the medium and acknowledgment, dropping the record
    pub fn into_parts(self) -> (M, A) {
        (self.medium, self.ack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::record::offsets;
    use crate::persist::checksum::{self, xor_reduce};
    use crate::persist::medium::{EepromMedium, FlashMedium};
    use aerocfg_hal::mock::{MockEeprom, MockPageFlash};
    use aerocfg_hal::{ByteStore, WORD_SIZE};
    use proptest::prelude::*;

    type Eeprom = MockEeprom<512>;
    type Flash = MockPageFlash<2048, 1024>;

    const FLASH_PAGE: u32 = 1024;

    #[derive(Default)]
    struct CountingAck {
        saves: usize,
    }

    impl Acknowledge for CountingAck {
        fn saved(&mut self) {
            self.saves += 1;
        }
    }

    fn eeprom_store() -> ConfigStore<EepromMedium<Eeprom>, CountingAck> {
        let medium = EepromMedium::new(Eeprom::new(), 0).unwrap();
        ConfigStore::with_ack(medium, CountingAck::default()).variant(HardwareVariant::Kk20)
    }

    fn flash_store(flash: Flash) -> ConfigStore<FlashMedium<Flash>, CountingAck> {
        let medium = FlashMedium::new(flash, FLASH_PAGE).unwrap();
        ConfigStore::with_ack(medium, CountingAck::default()).variant(HardwareVariant::Kk20)
    }

    fn reload<A: Acknowledge>(
        config: LoadedConfig<EepromMedium<Eeprom>, A>,
    ) -> (LoadedConfig<EepromMedium<Eeprom>, CountingAck>, LoadOutcome) {
        let (medium, _) = config.into_parts();
        ConfigStore::with_ack(medium, CountingAck::default())
            .variant(HardwareVariant::Kk20)
            .load()
    }

    fn sealed_defaults() -> ConfigRecord {
        let mut record = build_defaults(HardwareVariant::Kk20);
        record.seal();
        record
    }

    #[test]
    fn test_blank_eeprom_restores_and_persists() {
        let (config, outcome) = eeprom_store().load();

        assert_eq!(
            outcome,
            LoadOutcome::Restored {
                reason: RestoreReason::Invalid(Invalid::VersionMismatch { found: 0xFF }),
                persisted: true,
            }
        );
        assert_eq!(config.record(), &sealed_defaults());
        assert_eq!(config.ack().saves, 1);
        assert_eq!(
            &config.medium().store().contents()[..RECORD_SIZE],
            &sealed_defaults().to_bytes()[..]
        );
        assert_eq!(config.tables().throttle()[0], 1150);
    }

    #[test]
    fn test_second_load_takes_direct_path() {
        let (config, _) = eeprom_store().load();
        let first = *config.record();

        let (config, outcome) = reload(config);
        assert_eq!(outcome, LoadOutcome::Stored);
        assert_eq!(config.record(), &first);
        // Nothing saved on the direct path
        assert_eq!(config.ack().saves, 0);
        assert_eq!(config.tables().stick(), &[0, 100, 200, 300, 400, 500]);
    }

    #[test]
    fn test_edit_save_reload() {
        let (mut config, _) = eeprom_store().load();
        config.set_field(FieldId::RcRate, 50).unwrap();
        config.record_mut().servos.set_reversed(2, true);
        config.save().unwrap();
        // Tables follow the saved record
        assert_eq!(config.tables().stick()[5], 250);

        let (config, outcome) = reload(config);
        assert_eq!(outcome, LoadOutcome::Stored);
        assert_eq!(config.get_field(FieldId::RcRate), Ok(50));
        assert!(config.record().servos.is_reversed(2));
        assert_eq!(config.tables().stick()[5], 250);
    }

    #[test]
    fn test_second_save_writes_nothing() {
        let (mut config, _) = eeprom_store().load();
        config.medium_mut().store_mut().reset_counters();

        let report = config.save().unwrap();
        assert_eq!(report.units_written, 0);
        assert_eq!(config.medium().store().physical_writes(), 0);
        assert_eq!(config.ack().saves, 2);
    }

    #[test]
    fn test_single_edit_writes_two_bytes() {
        let (mut config, _) = eeprom_store().load();
        config.medium_mut().store_mut().reset_counters();

        config.set_field(FieldId::Contrast, 40).unwrap();
        let report = config.save().unwrap();
        // The field and the checksum
        assert_eq!(report.units_written, 2);
    }

    #[test]
    fn test_unknown_version_restored_despite_checksum() {
        let (config, _) = eeprom_store().load();
        let (mut medium, _) = config.into_parts();

        // Bump the version and patch the checksum so the XOR still closes
        let store = medium.store_mut();
        let version = store.contents()[offsets::VERSION];
        let sum = store.contents()[offsets::CHECKSUM];
        store.poke(offsets::VERSION, version + 1);
        store.poke(offsets::CHECKSUM, sum ^ version ^ (version + 1));
        assert_eq!(xor_reduce(&store.contents()[..RECORD_SIZE]), 0);

        let (config, outcome) = ConfigStore::new(medium).variant(HardwareVariant::Kk20).load();
        assert!(matches!(
            outcome,
            LoadOutcome::Restored {
                reason: RestoreReason::Invalid(Invalid::VersionMismatch { .. }),
                persisted: true
            }
        ));
        assert_eq!(config.record(), &sealed_defaults());
    }

    #[test]
    fn test_unreadable_medium() {
        // Reads always fail, writes succeed
        struct Broken;
        impl Medium for Broken {
            fn read_image(&mut self, _: &mut [u8; RECORD_SIZE]) -> Result<(), StoreError> {
                Err(StoreError::Read)
            }
            fn write_image(&mut self, _: &[u8; RECORD_SIZE]) -> Result<WriteReport, StoreError> {
                Ok(WriteReport::default())
            }
        }

        let (config, outcome) = ConfigStore::new(Broken).variant(HardwareVariant::Kk20).load();
        // The write went through but verification could not read it back
        assert_eq!(
            outcome,
            LoadOutcome::Restored {
                reason: RestoreReason::Unreadable(StoreError::Read),
                persisted: false,
            }
        );
        // Defaults are still in use
        assert_eq!(config.record(), &sealed_defaults());
        assert_eq!(config.tables().throttle()[10], 1850);
    }

    #[test]
    fn test_requested_reset() {
        let (mut config, _) = eeprom_store().load();
        config.set_field(FieldId::Deadband, 10).unwrap();
        config.save().unwrap();

        let (medium, ack) = config.into_parts();
        let (config, outcome) = ConfigStore::with_ack(medium, ack)
            .variant(HardwareVariant::Kk20)
            .load_with_reset(true);
        assert_eq!(
            outcome,
            LoadOutcome::Restored {
                reason: RestoreReason::Requested,
                persisted: true,
            }
        );
        assert_eq!(config.get_field(FieldId::Deadband), Ok(2));
        assert_eq!(config.ack().saves, 3);
    }

    #[test]
    fn test_restore_defaults() {
        let (mut config, _) = eeprom_store().load();
        config.set_field(FieldId::ThrottleMid, 30).unwrap();
        config.save().unwrap();

        config.restore_defaults().unwrap();
        assert_eq!(config.record(), &sealed_defaults());

        let (config, outcome) = reload(config);
        assert_eq!(outcome, LoadOutcome::Stored);
        assert_eq!(config.get_field(FieldId::ThrottleMid), Ok(50));
    }

    #[test]
    fn test_flash_blank_restores() {
        let (config, outcome) = flash_store(Flash::new()).load();
        assert!(outcome.is_restored());
        assert_eq!(config.medium().flash().erase_count(), 1);
        assert_eq!(
            config.medium().flash().program_count() as usize,
            RECORD_SIZE / WORD_SIZE
        );
        assert_eq!(
            config.medium().flash().contents(FLASH_PAGE, RECORD_SIZE),
            &sealed_defaults().to_bytes()[..]
        );
    }

    #[test]
    fn test_flash_corrupted_page_restores() {
        let (mut config, _) = flash_store(Flash::new()).load();
        config.set_field(FieldId::LaunchDelay, 20).unwrap();
        config.save().unwrap();

        let (medium, _) = config.into_parts();
        let mut flash = medium.into_inner();
        flash.corrupt(FLASH_PAGE + offsets::CONTRAST as u32, 0x10);
        flash.reset_counters();

        let (config, outcome) = flash_store(flash).load();
        assert!(matches!(
            outcome,
            LoadOutcome::Restored {
                reason: RestoreReason::Invalid(Invalid::Checksum { residue: 0x10 }),
                persisted: true
            }
        ));
        assert_eq!(config.record(), &sealed_defaults());
        assert_eq!(config.medium().flash().erase_count(), 1);
    }

    #[test]
    fn test_flash_program_failure_keeps_record() {
        let (mut config, _) = flash_store(Flash::new()).load();
        config.set_field(FieldId::LaunchDelay, 20).unwrap();
        config.medium_mut().flash_mut().fail_program_at(FLASH_PAGE + 64);

        assert_eq!(
            config.save(),
            Err(SaveError::Medium(StoreError::Program {
                address: FLASH_PAGE + 64
            }))
        );
        // In-memory edit survives, no acknowledgment
        assert_eq!(config.get_field(FieldId::LaunchDelay), Ok(20));
        assert_eq!(config.ack().saves, 1);

        // The torn page is caught on the next boot
        let (medium, _) = config.into_parts();
        let mut flash = medium.into_inner();
        flash.clear_faults();
        let (config, outcome) = flash_store(flash).load();
        assert!(matches!(
            outcome,
            LoadOutcome::Restored {
                reason: RestoreReason::Invalid(_),
                persisted: true
            }
        ));
        assert_eq!(config.record(), &sealed_defaults());
    }

    #[test]
    fn test_flash_erase_failure() {
        let (mut config, _) = flash_store(Flash::new()).load();
        config.medium_mut().flash_mut().fail_next_erase();
        assert_eq!(
            config.save(),
            Err(SaveError::Medium(StoreError::Erase {
                address: FLASH_PAGE
            }))
        );
        // Old page untouched, still valid
        let (medium, _) = config.into_parts();
        let (_, outcome) = flash_store(medium.into_inner()).load();
        assert_eq!(outcome, LoadOutcome::Stored);
    }

    #[test]
    fn test_flash_failure_during_restore_not_persisted() {
        let mut flash = Flash::new();
        flash.fail_next_erase();
        let (config, outcome) = flash_store(flash).load();
        assert!(matches!(
            outcome,
            LoadOutcome::Restored {
                persisted: false,
                ..
            }
        ));
        assert_eq!(config.record(), &sealed_defaults());
        assert_eq!(config.ack().saves, 0);
    }

    #[test]
    fn test_verify_catches_bad_readback() {
        // Stores every image with one bit flipped
        struct Lossy(EepromMedium<Eeprom>);
        impl Medium for Lossy {
            fn read_image(&mut self, image: &mut [u8; RECORD_SIZE]) -> Result<(), StoreError> {
                self.0.read_image(image)
            }
            fn write_image(&mut self, image: &[u8; RECORD_SIZE]) -> Result<WriteReport, StoreError> {
                let mut damaged = *image;
                damaged[offsets::CONTRAST] ^= 0x04;
                self.0.write_image(&damaged)
            }
        }

        let medium = Lossy(EepromMedium::new(Eeprom::new(), 0).unwrap());
        let (mut config, outcome) = ConfigStore::with_ack(medium, CountingAck::default())
            .variant(HardwareVariant::Kk20)
            .load();
        assert!(matches!(
            outcome,
            LoadOutcome::Restored {
                persisted: false,
                ..
            }
        ));

        config.set_field(FieldId::Contrast, 44).unwrap();
        assert_eq!(
            config.save(),
            Err(SaveError::Verify(Invalid::Checksum { residue: 0x04 }))
        );
        // The damaged copy is not taken over
        assert_eq!(config.get_field(FieldId::Contrast), Ok(44));
        assert_eq!(config.ack().saves, 0);
    }

    fn arbitrary_record() -> impl Strategy<Value = ConfigRecord> {
        prop::collection::vec(any::<u8>(), RECORD_SIZE).prop_map(|bytes| {
            let mut image = [0u8; RECORD_SIZE];
            image.copy_from_slice(&bytes);
            let mut record = ConfigRecord::from_bytes(&image);
            record.seal();
            record
        })
    }

    proptest! {
        #[test]
        fn prop_round_trip(record in arbitrary_record()) {
            let mut eeprom = Eeprom::new();
            eeprom.write_block_changes(0, &record.to_bytes()).unwrap();

            let medium = EepromMedium::new(eeprom, 0).unwrap();
            let (config, outcome) = ConfigStore::new(medium).load();
            prop_assert_eq!(outcome, LoadOutcome::Stored);
            prop_assert_eq!(config.record(), &record);
        }

        #[test]
        fn prop_corruption_falls_back_to_defaults(at in 0..RECORD_SIZE, mask in 1u8..=255) {
            let mut eeprom = Eeprom::new();
            let mut image = sealed_defaults().to_bytes();
            // Start from a valid record that isn't the defaults
            image[offsets::CONTRAST] = 45;
            checksum::seal(&mut image);
            eeprom.write_block_changes(0, &image).unwrap();
            eeprom.corrupt(at, mask);
            prop_assert_ne!(xor_reduce(&eeprom.contents()[..RECORD_SIZE]), 0);

            let medium = EepromMedium::new(eeprom, 0).unwrap();
            let (config, outcome) = ConfigStore::new(medium).variant(HardwareVariant::Kk20).load();
            prop_assert!(outcome.is_restored());
            prop_assert_eq!(config.record(), &sealed_defaults());

            let (config, outcome) = reload(config);
            prop_assert_eq!(outcome, LoadOutcome::Stored);
            prop_assert_eq!(config.record(), &sealed_defaults());
        }

        #[test]
        fn prop_diff_write_matches_full_overwrite(record in arbitrary_record(), fill in any::<u8>()) {
            let mut diffed = Eeprom::new();
            let mut full = Eeprom::new();
            diffed.fill(fill);
            full.fill(fill);

            let image = record.to_bytes();
            let mut medium = EepromMedium::new(diffed, 0).unwrap();
            medium.write_image(&image).unwrap();
            for (i, &b) in image.iter().enumerate() {
                full.write_byte(i, b).unwrap();
            }
            prop_assert_eq!(medium.store().contents(), full.contents());

            let report = medium.write_image(&image).unwrap();
            prop_assert_eq!(report.units_written, 0);
        }
    }
}
