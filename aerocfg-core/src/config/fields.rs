//! Field registry for menu editing
//!
//! Every user-editable value has an identifier resolving to its place in
//! the encoded record and the range the menu allows. Reads and writes go
//! through the record image, so the registry and the layout cannot drift
//! apart without the tests noticing.

use super::record::{
    offsets, ConfigRecord, FLIGHT_PROFILES, MAX_RC_CHANNELS, MIXER_INPUTS, RECORD_SIZE,
};
use super::variant::HardwareVariant;

/// Storage type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FieldKind {
    U8,
    I8,
    U16,
    I16,
    /// Single bit of a byte
    Bit(u8),
}

/// Menu limits of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FieldRange {
    pub min: i32,
    pub max: i32,
    /// Change applied by one menu step
    pub increment: i32,
}

impl FieldRange {
    const fn new(min: i32, max: i32, increment: i32) -> Self {
        Self {
            min,
            max,
            increment,
        }
    }

    /// Check whether a value is allowed
    pub const fn contains(&self, value: i32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Where a field lives and what it may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FieldSpec {
    /// Byte offset in the encoded record
    pub offset: usize,
    pub kind: FieldKind,
    pub range: FieldRange,
}

/// Errors from field access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FieldError {
    /// Value outside the field's range
    OutOfRange { min: i32, max: i32 },
    /// Channel, profile, axis or input index does not exist
    NoSuchIndex,
}

/// Menu step direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    Up,
    Down,
}

/// Control axis of a gain triple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    Roll = 0,
    Pitch = 1,
    Yaw = 2,
}

/// Term of a gain triple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Term {
    P = 0,
    I = 1,
    D = 2,
}

/// Identifier of an editable field
///
/// Indexed variants carry a receiver channel, a flight profile, an
/// accelerometer axis or a mixer input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FieldId {
    // RC
    ChannelOrder(u8),
    RxZeroOffset(u8),
    RxMode,
    PwmSync,
    TxSequence,
    RcRate,
    RcExpo,
    ThrottleMid,
    ThrottleExpo,
    Deadband,

    // Servos
    ServoOffset(u8),
    ServoMinTravel(u8),
    ServoMaxTravel(u8),
    ServoFailsafe(u8),
    ServoEndpointLow(u8),
    ServoEndpointHigh(u8),
    ServoTrim(u8),
    ServoReverse(u8),

    // Mixer
    MixPreset,
    MixVolume { channel: u8, input: u8 },

    // Calibration
    AccZero(u8),
    AccVertZero,

    // Profiles
    ProfileTrigger(u8),
    StabMode(u8),
    AutoMode(u8),
    Gain { profile: u8, axis: Axis, term: Term },
    LevelRollP(u8),
    LevelPitchP(u8),

    // General
    AccLpf,
    CfFactor,
    DynGainSource,
    DynGain,
    ImuType,
    FlightChannel,
    FlapChannel,
    LaunchDelay,
    Orientation,
    ServoRate,
    StickLockRate,
    BatteryType,
    MinVoltage,
    MaxVoltage,
    Contrast,
    StatusTimer,
    LmaTimeout,

    // Safety
    FailsafeThrottle,
    ArmMode,
}

const fn spec(offset: usize, kind: FieldKind, min: i32, max: i32) -> FieldSpec {
    FieldSpec {
        offset,
        kind,
        range: FieldRange::new(min, max, 1),
    }
}

const fn stepped(offset: usize, kind: FieldKind, min: i32, max: i32, increment: i32) -> FieldSpec {
    FieldSpec {
        offset,
        kind,
        range: FieldRange::new(min, max, increment),
    }
}

fn index(i: u8, count: usize) -> Result<usize, FieldError> {
    if (i as usize) < count {
        Ok(i as usize)
    } else {
        Err(FieldError::NoSuchIndex)
    }
}

fn channel(i: u8) -> Result<usize, FieldError> {
    index(i, MAX_RC_CHANNELS)
}

fn profile(i: u8, field: usize) -> Result<usize, FieldError> {
    Ok(offsets::PROFILES + index(i, FLIGHT_PROFILES)? * offsets::PROFILE_SIZE + field)
}

impl FieldId {
    /// Resolve the field's location and range
    pub fn spec(self) -> Result<FieldSpec, FieldError> {
        use FieldKind::*;

        let spec = match self {
            Self::ChannelOrder(ch) => spec(offsets::CHANNEL_ORDER + channel(ch)?, U8, 0, 7),
            Self::RxZeroOffset(ch) => spec(offsets::RX_ZERO_OFFSET + 2 * channel(ch)?, U16, 2500, 5000),
            Self::RxMode => spec(offsets::RX_MODE, U8, 0, 4),
            Self::PwmSync => spec(offsets::PWM_SYNC, U8, 0, 7),
            Self::TxSequence => spec(offsets::TX_SEQUENCE, U8, 0, 1),
            Self::RcRate => spec(offsets::RC_RATE, U8, 0, 250),
            Self::RcExpo => spec(offsets::RC_EXPO, U8, 0, 100),
            Self::ThrottleMid => spec(offsets::THROTTLE_MID, U8, 0, 100),
            Self::ThrottleExpo => spec(offsets::THROTTLE_EXPO, U8, 0, 100),
            Self::Deadband => spec(offsets::DEADBAND, U8, 0, 20),

            Self::ServoOffset(ch) => spec(offsets::SERVO_OFFSET + channel(ch)?, I8, -125, 125),
            Self::ServoMinTravel(ch) => spec(offsets::SERVO_MIN_TRAVEL + channel(ch)?, I8, -125, 0),
            Self::ServoMaxTravel(ch) => spec(offsets::SERVO_MAX_TRAVEL + channel(ch)?, I8, 0, 125),
            Self::ServoFailsafe(ch) => spec(offsets::SERVO_FAILSAFE + channel(ch)?, I8, -125, 125),
            Self::ServoEndpointLow(ch) => {
                stepped(offsets::SERVO_ENDPOINT_LOW + 2 * channel(ch)?, U16, 800, 1500, 10)
            }
            Self::ServoEndpointHigh(ch) => {
                stepped(offsets::SERVO_ENDPOINT_HIGH + 2 * channel(ch)?, U16, 1500, 2200, 10)
            }
            Self::ServoTrim(ch) => spec(offsets::SERVO_TRIM + 2 * channel(ch)?, U16, 1000, 2000),
            Self::ServoReverse(ch) => spec(offsets::SERVO_REVERSE, Bit(channel(ch)? as u8), 0, 1),

            Self::MixPreset => spec(offsets::MIX_PRESET, U8, 0, 2),
            Self::MixVolume { channel: ch, input } => spec(
                offsets::MIX_VOLUMES + channel(ch)? * MIXER_INPUTS + index(input, MIXER_INPUTS)?,
                I8,
                -125,
                125,
            ),

            Self::AccZero(axis) => spec(offsets::ACC_ZERO + 2 * index(axis, 3)?, I16, -1024, 1024),
            Self::AccVertZero => spec(offsets::ACC_VERT_ZERO, I16, -1024, 1024),

            Self::ProfileTrigger(p) => spec(profile(p, offsets::PROFILE_TRIGGER)?, I8, -100, 100),
            Self::StabMode(p) => spec(profile(p, offsets::PROFILE_STAB_MODE)?, U8, 0, 4),
            Self::AutoMode(p) => spec(profile(p, offsets::PROFILE_AUTO_MODE)?, U8, 0, 4),
            Self::Gain { profile: p, axis, term } => spec(
                profile(p, offsets::PROFILE_GAINS + 3 * axis as usize + term as usize)?,
                U8,
                0,
                250,
            ),
            Self::LevelRollP(p) => spec(profile(p, offsets::PROFILE_LEVEL_ROLL_P)?, U8, 0, 250),
            Self::LevelPitchP(p) => spec(profile(p, offsets::PROFILE_LEVEL_PITCH_P)?, U8, 0, 250),

            Self::AccLpf => spec(offsets::ACC_LPF, U8, 1, 64),
            Self::CfFactor => spec(offsets::CF_FACTOR, U8, 1, 100),
            Self::DynGainSource => spec(offsets::DYN_GAIN_SOURCE, U8, 0, 8),
            Self::DynGain => spec(offsets::DYN_GAIN, U8, 0, 100),
            Self::ImuType => spec(offsets::IMU_TYPE, U8, 0, 1),
            Self::FlightChannel => spec(offsets::FLIGHT_CHANNEL, U8, 0, 7),
            Self::FlapChannel => spec(offsets::FLAP_CHANNEL, U8, 0, 8),
            Self::LaunchDelay => spec(offsets::LAUNCH_DELAY, U8, 0, 60),
            Self::Orientation => spec(offsets::ORIENTATION, U8, 0, 1),
            Self::ServoRate => spec(offsets::SERVO_RATE, U8, 0, 1),
            Self::StickLockRate => spec(offsets::STICK_LOCK_RATE, U8, 1, 5),
            Self::BatteryType => spec(offsets::BATTERY_TYPE, U8, 0, 1),
            Self::MinVoltage => spec(offsets::MIN_VOLTAGE, U8, 0, 200),
            Self::MaxVoltage => spec(offsets::MAX_VOLTAGE, U8, 0, 200),
            Self::Contrast => spec(offsets::CONTRAST, U8, 28, 50),
            Self::StatusTimer => spec(offsets::STATUS_TIMER, U8, 3, 30),
            Self::LmaTimeout => spec(offsets::LMA_TIMEOUT, U8, 0, 30),

            Self::FailsafeThrottle => spec(offsets::FAILSAFE_THROTTLE, I8, -125, 125),
            Self::ArmMode => spec(offsets::ARM_MODE, U8, 0, 1),
        };
        Ok(spec)
    }

    /// Factory value of this field for a hardware variant
    pub fn default_value(self, variant: HardwareVariant) -> Result<i32, FieldError> {
        super::defaults::build_defaults(variant).get_field(self)
    }
}

fn read_value(image: &[u8; RECORD_SIZE], spec: &FieldSpec) -> i32 {
    let o = spec.offset;
    match spec.kind {
        FieldKind::U8 => image[o] as i32,
        FieldKind::I8 => image[o] as i8 as i32,
        FieldKind::U16 => u16::from_le_bytes([image[o], image[o + 1]]) as i32,
        FieldKind::I16 => i16::from_le_bytes([image[o], image[o + 1]]) as i32,
        FieldKind::Bit(bit) => ((image[o] >> bit) & 1) as i32,
    }
}

fn write_value(image: &mut [u8; RECORD_SIZE], spec: &FieldSpec, value: i32) {
    let o = spec.offset;
    match spec.kind {
        FieldKind::U8 | FieldKind::I8 => image[o] = value as u8,
        FieldKind::U16 | FieldKind::I16 => {
            image[o..o + 2].copy_from_slice(&(value as u16).to_le_bytes())
        }
        FieldKind::Bit(bit) => {
            if value != 0 {
                image[o] |= 1 << bit;
            } else {
                image[o] &= !(1 << bit);
            }
        }
    }
}

impl ConfigRecord {
    /// Read an editable field
    pub fn get_field(&self, id: FieldId) -> Result<i32, FieldError> {
        let spec = id.spec()?;
        Ok(read_value(&self.to_bytes(), &spec))
    }

    /// Write an editable field
    ///
    /// Values outside the field's range are rejected and leave the record
    /// unchanged.
    pub fn set_field(&mut self, id: FieldId, value: i32) -> Result<(), FieldError> {
        let spec = id.spec()?;
        if !spec.range.contains(value) {
            return Err(FieldError::OutOfRange {
                min: spec.range.min,
                max: spec.range.max,
            });
        }

        let mut image = self.to_bytes();
        write_value(&mut image, &spec, value);
        *self = ConfigRecord::from_bytes(&image);
        Ok(())
    }

    /// Move a field one increment up or down, clamped to its range
    ///
    /// Returns the new value.
    pub fn step_field(&mut self, id: FieldId, step: Step) -> Result<i32, FieldError> {
        let spec = id.spec()?;
        let current = self.get_field(id)?;
        let next = match step {
            Step::Up => current.saturating_add(spec.range.increment),
            Step::Down => current.saturating_sub(spec.range.increment),
        };
        let next = next.clamp(spec.range.min, spec.range.max);
        self.set_field(id, next)?;
        Ok(next)
    }
}
