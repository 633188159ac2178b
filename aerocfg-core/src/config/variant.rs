//! Hardware variants and their calibration defaults

/// Board revision the firmware is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HardwareVariant {
    /// KK2.0: analog accelerometer with a fixed mid-scale zero
    Kk20,
    /// KK2.1: digital IMU, zero offsets come from calibration
    Kk21,
}

impl HardwareVariant {
    /// Variant selected by the `variant-kk21` feature
    #[cfg(feature = "variant-kk21")]
    pub const COMPILED: Self = Self::Kk21;

    /// Variant selected by the `variant-kk21` feature
    #[cfg(not(feature = "variant-kk21"))]
    pub const COMPILED: Self = Self::Kk20;

    /// Default accelerometer zero for roll, pitch and yaw axes
    pub const fn acc_zero(self) -> [i16; 3] {
        match self {
            Self::Kk20 => [621, 623, 643],
            Self::Kk21 => [0, 0, 0],
        }
    }

    /// Default vertical accelerometer zero
    pub const fn acc_vert_zero(self) -> i16 {
        match self {
            Self::Kk20 => 765,
            Self::Kk21 => 0,
        }
    }
}

impl Default for HardwareVariant {
    fn default() -> Self {
        Self::COMPILED
    }
}
