//! Optional firmware features stored as bit flags

use bitflags::bitflags;

use super::record::ConfigRecord;

bitflags! {
    /// Feature switches kept in the record
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Features: u32 {
        /// Receiver delivers a combined PPM stream
        const PPM = 1 << 0;
        /// Battery voltage monitoring
        const VBAT = 1 << 1;
        /// Accelerometer trim while flying
        const INFLIGHT_ACC_CAL = 1 << 2;
        /// Spektrum satellite receiver
        const SPEKTRUM = 1 << 3;
        /// Stop motors at low throttle
        const MOTOR_STOP = 1 << 4;
        /// Camera tilt servos
        const SERVO_TILT = 1 << 5;
        const GYRO_SMOOTHING = 1 << 6;
        const LED_RING = 1 << 7;
        const GPS = 1 << 8;
        /// Drive failsafe positions on signal loss
        const FAILSAFE = 1 << 9;
        const SONAR = 1 << 10;
        const TELEMETRY = 1 << 11;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Features {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Features({=u32:#x})", self.bits())
    }
}

impl ConfigRecord {
    /// Current feature set; unknown bits are kept
    pub fn features(&self) -> Features {
        Features::from_bits_retain(self.features)
    }

    /// Check whether every flag in `mask` is enabled
    pub fn feature(&self, mask: Features) -> bool {
        self.features().contains(mask)
    }

    /// Enable the flags in `mask`
    pub fn set_feature(&mut self, mask: Features) {
        self.features |= mask.bits();
    }

    /// Disable the flags in `mask`
    pub fn clear_feature(&mut self, mask: Features) {
        self.features &= !mask.bits();
    }

    /// Disable every feature
    pub fn clear_all_features(&mut self) {
        self.features = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_set_and_clear() {
        let mut record = ConfigRecord::zeroed();
        assert!(!record.feature(Features::VBAT));

        record.set_feature(Features::VBAT | Features::FAILSAFE);
        assert!(record.feature(Features::VBAT));
        assert!(record.feature(Features::VBAT | Features::FAILSAFE));
        assert_eq!(record.features, (1 << 1) | (1 << 9));

        record.clear_feature(Features::VBAT);
        assert!(!record.feature(Features::VBAT));
        assert!(record.feature(Features::FAILSAFE));

        record.clear_all_features();
        assert_eq!(record.features(), Features::empty());
    }

    #[test]
    fn test_unknown_bits_survive() {
        let mut record = ConfigRecord::zeroed();
        record.features = 0x8000_0000;
        record.set_feature(Features::GPS);
        assert_eq!(record.features, 0x8000_0100);
        assert_eq!(record.features().bits(), 0x8000_0100);
    }
}
