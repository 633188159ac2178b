//! Persisted configuration record
//!
//! The record has a fixed size and fixed field offsets. Every field is a
//! plain integer so any byte image decodes, and decoding then encoding gives
//! the same bytes back. Multi-byte fields are little-endian.
//!
//! # Layout
//!
//! ```text
//! ┌──────────┬──────┬──────────┬──────────┬──────────┐
//! │ VERSION  │ SIZE │ MAGIC_BE │ MAGIC_EF │ CHECKSUM │   header, 6 bytes
//! │ 1B       │ 2B   │ 1B 0xBE  │ 1B 0xEF  │ 1B       │
//! ├──────────┴──────┴──────────┴──────────┴──────────┤
//! │ RC            6..38    channel order, shaping     │
//! │ SERVOS       38..119   travel, failsafe, trims    │
//! │ MIXER       119..152   preset, volumes            │
//! │ CALIBRATION 152..160   accelerometer zeros        │
//! │ PROFILES    160..202   3 × 14 bytes               │
//! │ GENERAL     202..219   tuning, battery, display   │
//! │ SAFETY      219..221   failsafe throttle, arming  │
//! │ FEATURES    221..225   bit flags                  │
//! │ RESERVED    225..228   padding to a flash word    │
//! └──────────────────────────────────────────────────┘
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use aerocfg_hal::WORD_SIZE;

/// Layout version; bump on any change to the layout below
pub const SCHEMA_VERSION: u8 = 37;

/// First magic marker
pub const MAGIC_BE: u8 = 0xBE;

/// Second magic marker
pub const MAGIC_EF: u8 = 0xEF;

/// Size of the encoded record in bytes
pub const RECORD_SIZE: usize = 228;

/// Receiver/servo channels
pub const MAX_RC_CHANNELS: usize = 8;

/// Selectable flight profiles
pub const FLIGHT_PROFILES: usize = 3;

/// Mixer inputs per output channel (roll, pitch, yaw, throttle)
pub const MIXER_INPUTS: usize = 4;

// Page flash programs whole words
const _: () = assert!(RECORD_SIZE % WORD_SIZE == 0);

/// Byte offsets of every group and field in the encoded record
pub mod offsets {
    pub const VERSION: usize = 0;
    pub const SIZE: usize = 1;
    pub const MAGIC_BE: usize = 3;
    pub const MAGIC_EF: usize = 4;
    pub const CHECKSUM: usize = 5;

    pub const RC: usize = 6;
    pub const CHANNEL_ORDER: usize = RC;
    pub const RX_ZERO_OFFSET: usize = RC + 8;
    pub const RX_MODE: usize = RC + 24;
    pub const PWM_SYNC: usize = RC + 25;
    pub const TX_SEQUENCE: usize = RC + 26;
    pub const RC_RATE: usize = RC + 27;
    pub const RC_EXPO: usize = RC + 28;
    pub const THROTTLE_MID: usize = RC + 29;
    pub const THROTTLE_EXPO: usize = RC + 30;
    pub const DEADBAND: usize = RC + 31;

    pub const SERVOS: usize = 38;
    pub const SERVO_OFFSET: usize = SERVOS;
    pub const SERVO_MIN_TRAVEL: usize = SERVOS + 8;
    pub const SERVO_MAX_TRAVEL: usize = SERVOS + 16;
    pub const SERVO_FAILSAFE: usize = SERVOS + 24;
    pub const SERVO_ENDPOINT_LOW: usize = SERVOS + 32;
    pub const SERVO_ENDPOINT_HIGH: usize = SERVOS + 48;
    pub const SERVO_TRIM: usize = SERVOS + 64;
    pub const SERVO_REVERSE: usize = SERVOS + 80;

    pub const MIXER: usize = 119;
    pub const MIX_PRESET: usize = MIXER;
    pub const MIX_VOLUMES: usize = MIXER + 1;

    pub const CALIBRATION: usize = 152;
    pub const ACC_ZERO: usize = CALIBRATION;
    pub const ACC_VERT_ZERO: usize = CALIBRATION + 6;

    pub const PROFILES: usize = 160;
    pub const PROFILE_SIZE: usize = 14;
    pub const PROFILE_TRIGGER: usize = 0;
    pub const PROFILE_STAB_MODE: usize = 1;
    pub const PROFILE_AUTO_MODE: usize = 2;
    pub const PROFILE_GAINS: usize = 3;
    pub const PROFILE_LEVEL_ROLL_P: usize = 12;
    pub const PROFILE_LEVEL_PITCH_P: usize = 13;

    pub const GENERAL: usize = 202;
    pub const ACC_LPF: usize = GENERAL;
    pub const CF_FACTOR: usize = GENERAL + 1;
    pub const DYN_GAIN_SOURCE: usize = GENERAL + 2;
    pub const DYN_GAIN: usize = GENERAL + 3;
    pub const IMU_TYPE: usize = GENERAL + 4;
    pub const FLIGHT_CHANNEL: usize = GENERAL + 5;
    pub const FLAP_CHANNEL: usize = GENERAL + 6;
    pub const LAUNCH_DELAY: usize = GENERAL + 7;
    pub const ORIENTATION: usize = GENERAL + 8;
    pub const SERVO_RATE: usize = GENERAL + 9;
    pub const STICK_LOCK_RATE: usize = GENERAL + 10;
    pub const BATTERY_TYPE: usize = GENERAL + 11;
    pub const MIN_VOLTAGE: usize = GENERAL + 12;
    pub const MAX_VOLTAGE: usize = GENERAL + 13;
    pub const CONTRAST: usize = GENERAL + 14;
    pub const STATUS_TIMER: usize = GENERAL + 15;
    pub const LMA_TIMEOUT: usize = GENERAL + 16;

    pub const SAFETY: usize = 219;
    pub const FAILSAFE_THROTTLE: usize = SAFETY;
    pub const ARM_MODE: usize = SAFETY + 1;

    pub const FEATURES: usize = 221;
    pub const RESERVED: usize = 225;
}

/// Receiver input and stick shaping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RcSettings {
    /// Function index for each receiver position (see [`super::channels`])
    pub channel_order: [u8; MAX_RC_CHANNELS],
    /// Per-channel receiver zero point (raw capture ticks)
    pub rx_zero_offset: [u16; MAX_RC_CHANNELS],
    /// Receiver input mode ([`RxMode`] as raw byte)
    pub rx_mode: u8,
    /// Channel whose PWM frame is used to synchronize outputs
    pub pwm_sync: u8,
    /// Transmitter channel sequence ([`TxSequence`] as raw byte)
    pub tx_sequence: u8,
    /// Roll/pitch rate (100 = 1.0)
    pub rc_rate: u8,
    /// Roll/pitch expo (0-100)
    pub rc_expo: u8,
    /// Throttle curve center (0-100 %)
    pub throttle_mid: u8,
    /// Throttle expo (0-100)
    pub throttle_expo: u8,
    /// Stick deadband (%)
    pub deadband: u8,
}

/// Servo outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ServoSettings {
    /// Output offset (%)
    pub offset: [i8; MAX_RC_CHANNELS],
    /// Lower travel limit (%)
    pub min_travel: [i8; MAX_RC_CHANNELS],
    /// Upper travel limit (%)
    pub max_travel: [i8; MAX_RC_CHANNELS],
    /// Position driven on signal loss (%)
    pub failsafe: [i8; MAX_RC_CHANNELS],
    /// Lowest pulse width (µs)
    pub endpoint_low: [u16; MAX_RC_CHANNELS],
    /// Highest pulse width (µs)
    pub endpoint_high: [u16; MAX_RC_CHANNELS],
    /// Center pulse width (µs)
    pub trim: [u16; MAX_RC_CHANNELS],
    /// Bit `n` set = channel `n` reversed
    pub reverse: u8,
}

impl ServoSettings {
    /// Check whether a channel is reversed
    pub fn is_reversed(&self, channel: usize) -> bool {
        channel < MAX_RC_CHANNELS && self.reverse & (1 << channel) != 0
    }

    /// Set the reverse flag of a channel
    pub fn set_reversed(&mut self, channel: usize, reversed: bool) {
        if channel < MAX_RC_CHANNELS {
            if reversed {
                self.reverse |= 1 << channel;
            } else {
                self.reverse &= !(1 << channel);
            }
        }
    }
}

/// Output mixer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MixerSettings {
    /// Last loaded preset ([`MixPreset`] as raw byte)
    pub preset: u8,
    /// Volume (%) of each input (roll, pitch, yaw, throttle) per output
    pub volumes: [[i8; MIXER_INPUTS]; MAX_RC_CHANNELS],
}

/// Sensor zero points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Calibration {
    /// Accelerometer zero for roll, pitch, yaw axes (raw ADC)
    pub acc_zero: [i16; 3],
    /// Vertical accelerometer zero (raw ADC)
    pub acc_vert_zero: i16,
}

/// P/I/D multipliers for one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Gains {
    pub p: u8,
    pub i: u8,
    pub d: u8,
}

impl Gains {
    /// Create a gain triple
    pub const fn new(p: u8, i: u8, d: u8) -> Self {
        Self { p, i, d }
    }
}

/// One flight profile, selected by the flight mode switch position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlightProfile {
    /// Switch position (%) above which this profile is active
    pub trigger: i8,
    /// Stability mode ([`SwitchMode`] as raw byte)
    pub stab_mode: u8,
    /// Autolevel mode ([`SwitchMode`] as raw byte)
    pub auto_mode: u8,
    pub roll: Gains,
    pub pitch: Gains,
    pub yaw: Gains,
    /// Autolevel roll P multiplier
    pub level_roll_p: u8,
    /// Autolevel pitch P multiplier
    pub level_pitch_p: u8,
}

/// Tuning, battery and display settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeneralSettings {
    /// Accelerometer low-pass filter factor
    pub acc_lpf: u8,
    /// Complementary filter factor
    pub cf_factor: u8,
    /// Channel driving dynamic gain (8 = none)
    pub dyn_gain_source: u8,
    /// Dynamic gain amount (%)
    pub dyn_gain: u8,
    /// 0 = simple IMU, 1 = advanced IMU
    pub imu_type: u8,
    /// Channel selecting the flight profile
    pub flight_channel: u8,
    /// Channel driving flaps (8 = none)
    pub flap_channel: u8,
    /// Launch mode delay (s)
    pub launch_delay: u8,
    /// 0 = horizontal, 1 = vertical mounting
    pub orientation: u8,
    /// 0 = 50Hz servos, 1 = high rate
    pub servo_rate: u8,
    /// Stick lock rate
    pub stick_lock_rate: u8,
    /// [`BatteryType`] as raw byte
    pub battery_type: u8,
    /// Low voltage alarm (units of 40mV)
    pub min_voltage: u8,
    /// Full voltage (units of 40mV)
    pub max_voltage: u8,
    /// LCD contrast
    pub contrast: u8,
    /// Status screen timeout (s)
    pub status_timer: u8,
    /// Lost model alarm timeout (min, 0 = off)
    pub lma_timeout: u8,
}

/// Failsafe and arming behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SafetySettings {
    /// Throttle position (%) on signal loss
    pub failsafe_throttle: i8,
    /// [`ArmMode`] as raw byte
    pub arm_mode: u8,
}

/// The complete persisted configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConfigRecord {
    /// Layout version, [`SCHEMA_VERSION`] when valid
    pub version: u8,
    /// Declared record size, [`RECORD_SIZE`] when valid
    pub size: u16,
    /// [`MAGIC_BE`] when valid
    pub magic_be: u8,
    /// [`MAGIC_EF`] when valid
    pub magic_ef: u8,
    /// Makes the XOR of all record bytes zero; set by [`seal`](Self::seal)
    pub checksum: u8,
    pub rc: RcSettings,
    pub servos: ServoSettings,
    pub mixer: MixerSettings,
    pub calibration: Calibration,
    pub profiles: [FlightProfile; FLIGHT_PROFILES],
    pub general: GeneralSettings,
    pub safety: SafetySettings,
    /// Raw [`Features`](super::Features) bits
    pub features: u32,
    pub reserved: [u8; 3],
}

impl ConfigRecord {
    /// Record with every byte zero
    pub fn zeroed() -> Self {
        Self::from_bytes(&[0u8; RECORD_SIZE])
    }

    /// Decode a record image
    pub fn from_bytes(image: &[u8; RECORD_SIZE]) -> Self {
        let mut r = Reader { image, pos: 0 };

        let version = r.u8();
        let size = r.u16();
        let magic_be = r.u8();
        let magic_ef = r.u8();
        let checksum = r.u8();

        debug_assert_eq!(r.pos, offsets::RC);
        let rc = RcSettings {
            channel_order: r.u8s(),
            rx_zero_offset: r.u16s(),
            rx_mode: r.u8(),
            pwm_sync: r.u8(),
            tx_sequence: r.u8(),
            rc_rate: r.u8(),
            rc_expo: r.u8(),
            throttle_mid: r.u8(),
            throttle_expo: r.u8(),
            deadband: r.u8(),
        };

        debug_assert_eq!(r.pos, offsets::SERVOS);
        let servos = ServoSettings {
            offset: r.i8s(),
            min_travel: r.i8s(),
            max_travel: r.i8s(),
            failsafe: r.i8s(),
            endpoint_low: r.u16s(),
            endpoint_high: r.u16s(),
            trim: r.u16s(),
            reverse: r.u8(),
        };

        debug_assert_eq!(r.pos, offsets::MIXER);
        let preset = r.u8();
        let mut volumes = [[0i8; MIXER_INPUTS]; MAX_RC_CHANNELS];
        for channel in &mut volumes {
            *channel = r.i8s();
        }
        let mixer = MixerSettings { preset, volumes };

        debug_assert_eq!(r.pos, offsets::CALIBRATION);
        let calibration = Calibration {
            acc_zero: [r.i16(), r.i16(), r.i16()],
            acc_vert_zero: r.i16(),
        };

        debug_assert_eq!(r.pos, offsets::PROFILES);
        let mut profiles = [FlightProfile::default(); FLIGHT_PROFILES];
        for profile in &mut profiles {
            *profile = FlightProfile {
                trigger: r.i8(),
                stab_mode: r.u8(),
                auto_mode: r.u8(),
                roll: r.gains(),
                pitch: r.gains(),
                yaw: r.gains(),
                level_roll_p: r.u8(),
                level_pitch_p: r.u8(),
            };
        }

        debug_assert_eq!(r.pos, offsets::GENERAL);
        let general = GeneralSettings {
            acc_lpf: r.u8(),
            cf_factor: r.u8(),
            dyn_gain_source: r.u8(),
            dyn_gain: r.u8(),
            imu_type: r.u8(),
            flight_channel: r.u8(),
            flap_channel: r.u8(),
            launch_delay: r.u8(),
            orientation: r.u8(),
            servo_rate: r.u8(),
            stick_lock_rate: r.u8(),
            battery_type: r.u8(),
            min_voltage: r.u8(),
            max_voltage: r.u8(),
            contrast: r.u8(),
            status_timer: r.u8(),
            lma_timeout: r.u8(),
        };

        debug_assert_eq!(r.pos, offsets::SAFETY);
        let safety = SafetySettings {
            failsafe_throttle: r.i8(),
            arm_mode: r.u8(),
        };

        debug_assert_eq!(r.pos, offsets::FEATURES);
        let features = r.u32();

        debug_assert_eq!(r.pos, offsets::RESERVED);
        let reserved = r.u8s();
        debug_assert_eq!(r.pos, RECORD_SIZE);

        Self {
            version,
            size,
            magic_be,
            magic_ef,
            checksum,
            rc,
            servos,
            mixer,
            calibration,
            profiles,
            general,
            safety,
            features,
            reserved,
        }
    }

    /// Encode the record exactly as it is, checksum field included
    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        let mut image = [0u8; RECORD_SIZE];
        let mut w = Writer {
            image: &mut image,
            pos: 0,
        };

        w.u8(self.version);
        w.u16(self.size);
        w.u8(self.magic_be);
        w.u8(self.magic_ef);
        w.u8(self.checksum);

        let rc = &self.rc;
        w.u8s(&rc.channel_order);
        w.u16s(&rc.rx_zero_offset);
        w.u8(rc.rx_mode);
        w.u8(rc.pwm_sync);
        w.u8(rc.tx_sequence);
        w.u8(rc.rc_rate);
        w.u8(rc.rc_expo);
        w.u8(rc.throttle_mid);
        w.u8(rc.throttle_expo);
        w.u8(rc.deadband);

        let servos = &self.servos;
        w.i8s(&servos.offset);
        w.i8s(&servos.min_travel);
        w.i8s(&servos.max_travel);
        w.i8s(&servos.failsafe);
        w.u16s(&servos.endpoint_low);
        w.u16s(&servos.endpoint_high);
        w.u16s(&servos.trim);
        w.u8(servos.reverse);

        w.u8(self.mixer.preset);
        for channel in &self.mixer.volumes {
            w.i8s(channel);
        }

        for &zero in &self.calibration.acc_zero {
            w.i16(zero);
        }
        w.i16(self.calibration.acc_vert_zero);

        for profile in &self.profiles {
            w.i8(profile.trigger);
            w.u8(profile.stab_mode);
            w.u8(profile.auto_mode);
            for gains in [&profile.roll, &profile.pitch, &profile.yaw] {
                w.u8(gains.p);
                w.u8(gains.i);
                w.u8(gains.d);
            }
            w.u8(profile.level_roll_p);
            w.u8(profile.level_pitch_p);
        }

        let g = &self.general;
        w.u8s(&[
            g.acc_lpf,
            g.cf_factor,
            g.dyn_gain_source,
            g.dyn_gain,
            g.imu_type,
            g.flight_channel,
            g.flap_channel,
            g.launch_delay,
            g.orientation,
            g.servo_rate,
            g.stick_lock_rate,
            g.battery_type,
            g.min_voltage,
            g.max_voltage,
            g.contrast,
            g.status_timer,
            g.lma_timeout,
        ]);

        w.i8(self.safety.failsafe_throttle);
        w.u8(self.safety.arm_mode);
        w.u32(self.features);
        w.u8s(&self.reserved);
        debug_assert_eq!(w.pos, RECORD_SIZE);

        image
    }

    /// Set version, size and magic markers to the compiled constants
    pub fn stamp_header(&mut self) {
        self.version = SCHEMA_VERSION;
        self.size = RECORD_SIZE as u16;
        self.magic_be = MAGIC_BE;
        self.magic_ef = MAGIC_EF;
    }

    /// Stamp the header, recompute the checksum and return the image to write
    pub fn seal(&mut self) -> [u8; RECORD_SIZE] {
        self.stamp_header();
        self.checksum = 0;
        let mut image = self.to_bytes();
        self.checksum = crate::persist::checksum::seal(&mut image);
        image
    }
}

/// Little-endian cursor over a record image
struct Reader<'a> {
    image: &'a [u8; RECORD_SIZE],
    pos: usize,
}

impl Reader<'_> {
    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.image[self.pos..self.pos + N]);
        self.pos += N;
        bytes
    }

    fn u8(&mut self) -> u8 {
        self.take::<1>()[0]
    }

    fn i8(&mut self) -> i8 {
        self.u8() as i8
    }

    fn u16(&mut self) -> u16 {
        u16::from_le_bytes(self.take())
    }

    fn i16(&mut self) -> i16 {
        i16::from_le_bytes(self.take())
    }

    fn u32(&mut self) -> u32 {
        u32::from_le_bytes(self.take())
    }

    fn u8s<const N: usize>(&mut self) -> [u8; N] {
        self.take()
    }

    fn i8s<const N: usize>(&mut self) -> [i8; N] {
        self.take::<N>().map(|b| b as i8)
    }

    fn u16s<const N: usize>(&mut self) -> [u16; N] {
        core::array::from_fn(|_| self.u16())
    }

    fn gains(&mut self) -> Gains {
        Gains::new(self.u8(), self.u8(), self.u8())
    }
}

/// Little-endian writer into a record image
struct Writer<'a> {
    image: &'a mut [u8; RECORD_SIZE],
    pos: usize,
}

impl Writer<'_> {
    fn put(&mut self, bytes: &[u8]) {
        self.image[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }

    fn u8(&mut self, value: u8) {
        self.put(&[value]);
    }

    fn i8(&mut self, value: i8) {
        self.put(&[value as u8]);
    }

    fn u16(&mut self, value: u16) {
        self.put(&value.to_le_bytes());
    }

    fn i16(&mut self, value: i16) {
        self.put(&value.to_le_bytes());
    }

    fn u32(&mut self, value: u32) {
        self.put(&value.to_le_bytes());
    }

    fn u8s(&mut self, values: &[u8]) {
        self.put(values);
    }

    fn i8s(&mut self, values: &[i8]) {
        for &v in values {
            self.i8(v);
        }
    }

    fn u16s(&mut self, values: &[u16]) {
        for &v in values {
            self.u16(v);
        }
    }
}

/// Receiver input decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum RxMode {
    /// Combined PPM stream on one pin
    Cppm = 0,
    /// One PWM signal per channel
    Pwm = 1,
    /// Spektrum XtremeLink serial
    Xtreme = 2,
    /// Futaba S.Bus serial
    Sbus = 3,
    /// Spektrum satellite serial
    Spektrum = 4,
}

impl RxMode {
    /// Decode a raw field value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Cppm),
            1 => Some(Self::Pwm),
            2 => Some(Self::Xtreme),
            3 => Some(Self::Sbus),
            4 => Some(Self::Spektrum),
            _ => None,
        }
    }
}

/// Transmitter channel sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TxSequence {
    /// JR/Spektrum (TAER...)
    Jr = 0,
    /// Futaba (AETR...)
    Futaba = 1,
}

/// When a stability or autolevel function is engaged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SwitchMode {
    Disabled = 0,
    /// Follows the autolevel channel
    AutoChannel = 1,
    /// Follows the stability channel
    StabChannel = 2,
    /// Follows the three-position switch
    ThreePosition = 3,
    AlwaysOn = 4,
}

impl SwitchMode {
    /// Decode a raw field value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Disabled),
            1 => Some(Self::AutoChannel),
            2 => Some(Self::StabChannel),
            3 => Some(Self::ThreePosition),
            4 => Some(Self::AlwaysOn),
            _ => None,
        }
    }
}

/// Battery chemistry for voltage alarms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum BatteryType {
    LiPo = 0,
    NiMh = 1,
}

/// Stick arming behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ArmMode {
    /// Outputs are always live; stick arming/disarming disabled
    Disabled = 0,
    /// Arm and disarm with a held stick gesture
    Stick = 1,
}

/// Mixer presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MixPreset {
    /// Throttle, aileron, elevator, rudder on separate outputs
    Aeroplane = 0,
    /// Elevons mixing roll and pitch, throttle and rudder separate
    FlyingWing = 1,
    /// Camera stabilizer, roll and pitch only
    CamStab = 2,
}

impl MixPreset {
    /// Decode a raw field value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Aeroplane),
            1 => Some(Self::FlyingWing),
            2 => Some(Self::CamStab),
            _ => None,
        }
    }

    /// Mixer volumes for this preset
    pub fn volumes(self) -> [[i8; MIXER_INPUTS]; MAX_RC_CHANNELS] {
        //             roll pitch  yaw  thr
        let mut v = [[0i8; MIXER_INPUTS]; MAX_RC_CHANNELS];
        match self {
            Self::Aeroplane => {
                v[0] = [0, 0, 0, 100];
                v[1] = [100, 0, 0, 0];
                v[2] = [0, 100, 0, 0];
                v[3] = [0, 0, 100, 0];
            }
            Self::FlyingWing => {
                v[0] = [0, 0, 0, 100];
                v[1] = [100, 100, 0, 0];
                v[2] = [-100, 100, 0, 0];
                v[3] = [0, 0, 100, 0];
            }
            Self::CamStab => {
                v[0] = [100, 0, 0, 0];
                v[1] = [0, 100, 0, 0];
            }
        }
        v
    }
}

impl ConfigRecord {
    /// Receiver mode, if the stored value is known
    pub fn rx_mode(&self) -> Option<RxMode> {
        RxMode::from_u8(self.rc.rx_mode)
    }

    /// Arming behavior; unknown values read as the safe [`ArmMode::Disabled`]
    pub fn arm_mode(&self) -> ArmMode {
        match self.safety.arm_mode {
            1 => ArmMode::Stick,
            _ => ArmMode::Disabled,
        }
    }

    /// Replace the mixer volumes with a preset
    pub fn load_mix_preset(&mut self, preset: MixPreset) {
        self.mixer.preset = preset as u8;
        self.mixer.volumes = preset.volumes();
    }
}
