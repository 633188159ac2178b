//! Stick and throttle shaping curves
//!
//! Both curves are sampled at fixed points and interpolated linearly at
//! runtime. They are never stored; they are rebuilt from the record's
//! shaping scalars on every load and save.

use crate::config::record::RcSettings;

/// Stick curve samples, one per 100 units of deflection
pub const STICK_SAMPLES: usize = 6;

/// Throttle curve samples, one per 10% of travel
pub const THROTTLE_SAMPLES: usize = 11;

/// Throttle output at zero stick (µs)
pub const MIN_THROTTLE: u16 = 1150;

/// Throttle output at full stick (µs)
pub const MAX_THROTTLE: u16 = 1850;

/// Largest stick deflection the stick curve covers
pub const MAX_DEFLECTION: i16 = 100 * (STICK_SAMPLES as i16 - 1);

/// Throttle stick position at full travel (per mille)
pub const FULL_THROTTLE: u16 = 1000;

pub type StickCurve = [i16; STICK_SAMPLES];
pub type ThrottleCurve = [u16; THROTTLE_SAMPLES];

/// Build both shaping curves
///
/// `rate` scales the stick curve (100 = 1.0) and `expo` bends it. The
/// throttle curve is centered on `throttle_mid` (%) and bent by
/// `throttle_expo`, then mapped onto `min_throttle..=max_throttle`.
/// `expo`, `throttle_mid` and `throttle_expo` are clamped to 100.
pub fn build_tables(
    rate: u8,
    expo: u8,
    throttle_mid: u8,
    throttle_expo: u8,
    min_throttle: u16,
    max_throttle: u16,
) -> (StickCurve, ThrottleCurve) {
    let rate = rate as i32;
    let expo = expo.min(100) as i32;
    let mid = throttle_mid.min(100) as i32;
    let texpo = throttle_expo.min(100) as i32;

    let mut stick = [0i16; STICK_SAMPLES];
    for (i, sample) in stick.iter_mut().enumerate() {
        let i = i as i32;
        *sample = ((2500 + expo * (i * i - 25)) * i * rate / 2500) as i16;
    }

    let min = min_throttle as i32;
    let span = max_throttle as i32 - min;
    let mut throttle = [0u16; THROTTLE_SAMPLES];
    for (i, sample) in throttle.iter_mut().enumerate() {
        let d = 10 * i as i32 - mid;
        let y = match d {
            d if d > 0 => 100 - mid,
            d if d < 0 => mid,
            _ => 1,
        }
        .max(1);
        // Position on the curve in [0, 1000]
        let v = 10 * mid + d * (100 - texpo + texpo * d * d / (y * y)) / 10;
        *sample = (min + span * v / 1000) as u16;
    }

    (stick, throttle)
}

/// Shaping curves for the control loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DerivedTables {
    stick: StickCurve,
    throttle: ThrottleCurve,
}

impl Default for DerivedTables {
    fn default() -> Self {
        Self::new()
    }
}

impl DerivedTables {
    /// Empty tables; every lookup returns zero until the first rebuild
    pub const fn new() -> Self {
        Self {
            stick: [0; STICK_SAMPLES],
            throttle: [0; THROTTLE_SAMPLES],
        }
    }

    /// Recompute both curves in place from the RC shaping settings
    pub fn rebuild(&mut self, rc: &RcSettings) {
        let (stick, throttle) = build_tables(
            rc.rc_rate,
            rc.rc_expo,
            rc.throttle_mid,
            rc.throttle_expo,
            MIN_THROTTLE,
            MAX_THROTTLE,
        );
        self.stick = stick;
        self.throttle = throttle;
    }

    pub fn stick(&self) -> &StickCurve {
        &self.stick
    }

    pub fn throttle(&self) -> &ThrottleCurve {
        &self.throttle
    }

    /// Shaped roll/pitch command for a stick deflection from center
    ///
    /// Deflection beyond [`MAX_DEFLECTION`] saturates. The sign is kept.
    pub fn stick_command(&self, deflection: i16) -> i16 {
        let magnitude = deflection.unsigned_abs().min(MAX_DEFLECTION as u16) as i32;
        let value = interpolate(&self.stick.map(i32::from), magnitude);
        if deflection < 0 {
            -value as i16
        } else {
            value as i16
        }
    }

    /// Throttle output (µs) for a stick position in per mille of travel
    pub fn throttle_command(&self, position: u16) -> u16 {
        let position = position.min(FULL_THROTTLE) as i32;
        interpolate(&self.throttle.map(i32::from), position) as u16
    }
}

/// Linear interpolation between samples spaced 100 units apart
fn interpolate<const N: usize>(samples: &[i32; N], x: i32) -> i32 {
    let index = (x / 100) as usize;
    if index + 1 >= N {
        return samples[N - 1];
    }
    let fraction = x - 100 * index as i32;
    samples[index] + (samples[index + 1] - samples[index]) * fraction / 100
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_linear_throttle() {
        let (_, throttle) = build_tables(100, 0, 50, 0, MIN_THROTTLE, MAX_THROTTLE);
        for (i, &sample) in throttle.iter().enumerate() {
            assert_eq!(sample, 1150 + 70 * i as u16);
        }
    }

    #[test]
    fn test_linear_stick() {
        let (stick, _) = build_tables(100, 0, 50, 0, MIN_THROTTLE, MAX_THROTTLE);
        assert_eq!(stick, [0, 100, 200, 300, 400, 500]);
    }

    #[test]
    fn test_stick_expo_flattens_center() {
        let (stick, _) = build_tables(100, 100, 50, 0, MIN_THROTTLE, MAX_THROTTLE);
        // Full expo: (2500 + 100 * (i² - 25)) * i / 25 = 4 * i³
        assert_eq!(stick, [0, 4, 32, 108, 256, 500]);
    }

    #[test]
    fn test_out_of_range_inputs_clamped() {
        assert_eq!(
            build_tables(100, 250, 200, 180, MIN_THROTTLE, MAX_THROTTLE),
            build_tables(100, 100, 100, 100, MIN_THROTTLE, MAX_THROTTLE)
        );
    }

    #[test]
    fn test_extreme_mids() {
        for mid in [0, 100] {
            let (_, throttle) = build_tables(100, 0, mid, 100, MIN_THROTTLE, MAX_THROTTLE);
            assert_eq!(throttle[0], MIN_THROTTLE);
            assert_eq!(throttle[THROTTLE_SAMPLES - 1], MAX_THROTTLE);
        }
    }

    #[test]
    fn test_rebuild_overwrites() {
        let mut tables = DerivedTables::new();
        let mut rc = RcSettings {
            rc_rate: 100,
            throttle_mid: 50,
            ..Default::default()
        };
        tables.rebuild(&rc);
        assert_eq!(tables.stick()[5], 500);

        rc.rc_rate = 50;
        tables.rebuild(&rc);
        assert_eq!(tables.stick()[5], 250);
    }

    #[test]
    fn test_stick_command_interpolates() {
        let mut tables = DerivedTables::new();
        tables.rebuild(&RcSettings {
            rc_rate: 100,
            rc_expo: 100,
            throttle_mid: 50,
            ..Default::default()
        });

        assert_eq!(tables.stick_command(0), 0);
        assert_eq!(tables.stick_command(200), 32);
        // Halfway between 32 and 108
        assert_eq!(tables.stick_command(250), 70);
        assert_eq!(tables.stick_command(-250), -70);
        assert_eq!(tables.stick_command(500), 500);
        assert_eq!(tables.stick_command(i16::MIN), -500);
    }

    #[test]
    fn test_throttle_command_interpolates() {
        let mut tables = DerivedTables::new();
        tables.rebuild(&RcSettings {
            rc_rate: 100,
            throttle_mid: 50,
            ..Default::default()
        });

        assert_eq!(tables.throttle_command(0), MIN_THROTTLE);
        assert_eq!(tables.throttle_command(50), 1185);
        assert_eq!(tables.throttle_command(500), 1500);
        assert_eq!(tables.throttle_command(1000), MAX_THROTTLE);
        assert_eq!(tables.throttle_command(u16::MAX), MAX_THROTTLE);
    }

    proptest! {
        #[test]
        fn prop_throttle_monotonic_with_bounds(
            mid in 0u8..=100,
            texpo in 0u8..=100,
            min in 900u16..1500,
            extra in 0u16..1000,
        ) {
            let max = min + extra;
            let (_, throttle) = build_tables(100, 0, mid, texpo, min, max);
            prop_assert_eq!(throttle[0], min);
            prop_assert_eq!(throttle[THROTTLE_SAMPLES - 1], max);
            for pair in throttle.windows(2) {
                prop_assert!(pair[0] <= pair[1], "{:?}", throttle);
            }
        }

        #[test]
        fn prop_stick_monotonic(rate in any::<u8>(), expo in 0u8..=100) {
            let (stick, _) = build_tables(rate, expo, 50, 0, MIN_THROTTLE, MAX_THROTTLE);
            prop_assert_eq!(stick[0], 0);
            for pair in stick.windows(2) {
                prop_assert!(pair[0] <= pair[1], "{:?}", stick);
            }
        }
    }
}
