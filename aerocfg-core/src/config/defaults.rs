//! Factory defaults

use super::channels::{ChannelOrder, GEAR, NOCHAN, THROTTLE};
use super::record::{
    ArmMode, BatteryType, ConfigRecord, Gains, MixPreset, RxMode, SwitchMode, TxSequence,
    FLIGHT_PROFILES, MAX_RC_CHANNELS,
};
use super::variant::HardwareVariant;

/// Neutral receiver zero point (raw capture ticks)
pub const DEFAULT_RX_ZERO: u16 = 3750;

/// Lowest servo pulse width (µs)
pub const DEFAULT_ENDPOINT_LOW: u16 = 1000;

/// Highest servo pulse width (µs)
pub const DEFAULT_ENDPOINT_HIGH: u16 = 2000;

/// Servo center pulse width (µs)
pub const DEFAULT_TRIM: u16 = 1500;

/// Flight mode switch positions (%) selecting each profile
const PROFILE_TRIGGERS: [i8; FLIGHT_PROFILES] = [-90, -50, 90];

/// Build the factory configuration for a hardware variant
///
/// The result has a valid header but its checksum is left at zero; it is
/// computed when the record is saved.
pub fn build_defaults(variant: HardwareVariant) -> ConfigRecord {
    let mut config = ConfigRecord::zeroed();
    config.stamp_header();

    // Receiver
    let rc = &mut config.rc;
    rc.channel_order = ChannelOrder::JR.0;
    rc.rx_zero_offset = [DEFAULT_RX_ZERO; MAX_RC_CHANNELS];
    rc.rx_mode = RxMode::Pwm as u8;
    rc.pwm_sync = GEAR;
    rc.tx_sequence = TxSequence::Jr as u8;
    rc.rc_rate = 100;
    rc.rc_expo = 0;
    rc.throttle_mid = 50;
    rc.throttle_expo = 0;
    rc.deadband = 2;

    // Servos
    let servos = &mut config.servos;
    servos.min_travel = [-100; MAX_RC_CHANNELS];
    servos.max_travel = [100; MAX_RC_CHANNELS];
    // Throttle fails safe to minimum
    servos.failsafe[THROTTLE as usize] = -100;
    servos.endpoint_low = [DEFAULT_ENDPOINT_LOW; MAX_RC_CHANNELS];
    servos.endpoint_high = [DEFAULT_ENDPOINT_HIGH; MAX_RC_CHANNELS];
    servos.trim = [DEFAULT_TRIM; MAX_RC_CHANNELS];

    config.load_mix_preset(MixPreset::Aeroplane);

    config.calibration.acc_zero = variant.acc_zero();
    config.calibration.acc_vert_zero = variant.acc_vert_zero();

    // Same gains everywhere, profiles differ only by trigger and modes
    for (profile, &trigger) in config.profiles.iter_mut().zip(&PROFILE_TRIGGERS) {
        profile.trigger = trigger;
        profile.roll = Gains::new(80, 50, 0);
        profile.pitch = Gains::new(80, 50, 0);
        profile.yaw = Gains::new(80, 80, 0);
        profile.level_roll_p = 60;
        profile.level_pitch_p = 60;
    }
    config.profiles[1].stab_mode = SwitchMode::AlwaysOn as u8;
    config.profiles[2].stab_mode = SwitchMode::AlwaysOn as u8;
    config.profiles[2].auto_mode = SwitchMode::AlwaysOn as u8;

    let general = &mut config.general;
    general.acc_lpf = 8;
    general.cf_factor = 30;
    general.dyn_gain_source = NOCHAN;
    general.dyn_gain = 100;
    general.imu_type = 1;
    general.flight_channel = GEAR;
    general.flap_channel = NOCHAN;
    general.launch_delay = 10;
    general.orientation = 0;
    general.servo_rate = 0;
    general.stick_lock_rate = 3;
    general.battery_type = BatteryType::LiPo as u8;
    general.min_voltage = 83;
    general.max_voltage = 105;
    general.contrast = 38;
    general.status_timer = 10;
    general.lma_timeout = 3;

    config.safety.failsafe_throttle = -100;
    config.safety.arm_mode = ArmMode::Disabled as u8;

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::record::{MAGIC_BE, MAGIC_EF, RECORD_SIZE, SCHEMA_VERSION};
    use crate::persist::validator::validate;

    #[test]
    fn test_defaults_are_deterministic() {
        assert_eq!(
            build_defaults(HardwareVariant::Kk20).to_bytes(),
            build_defaults(HardwareVariant::Kk20).to_bytes()
        );
    }

    #[test]
    fn test_defaults_header() {
        let config = build_defaults(HardwareVariant::Kk20);
        assert_eq!(config.version, SCHEMA_VERSION);
        assert_eq!(config.size, RECORD_SIZE as u16);
        assert_eq!(config.magic_be, MAGIC_BE);
        assert_eq!(config.magic_ef, MAGIC_EF);
        assert_eq!(config.checksum, 0);
    }

    #[test]
    fn test_defaults_valid_once_sealed() {
        let mut config = build_defaults(HardwareVariant::Kk21);
        let image = config.seal();
        assert!(validate(&image));
    }

    #[test]
    fn test_calibration_per_variant() {
        let kk20 = build_defaults(HardwareVariant::Kk20);
        assert_eq!(kk20.calibration.acc_zero, [621, 623, 643]);
        assert_eq!(kk20.calibration.acc_vert_zero, 765);

        let kk21 = build_defaults(HardwareVariant::Kk21);
        assert_eq!(kk21.calibration.acc_zero, [0, 0, 0]);
        assert_eq!(kk21.calibration.acc_vert_zero, 0);

        // Nothing else depends on the variant
        let mut patched = kk21;
        patched.calibration = kk20.calibration;
        assert_eq!(patched, kk20);
    }

    #[test]
    fn test_safety_defaults() {
        let config = build_defaults(HardwareVariant::Kk20);
        assert_eq!(config.safety.failsafe_throttle, -100);
        assert_eq!(config.servos.failsafe[THROTTLE as usize], -100);
        assert!(config.servos.failsafe[1..].iter().all(|&f| f == 0));
        assert_eq!(config.arm_mode(), ArmMode::Disabled);
    }

    #[test]
    fn test_rc_defaults() {
        let config = build_defaults(HardwareVariant::Kk20);
        assert_eq!(config.rc.channel_order, ChannelOrder::JR.0);
        assert_eq!(config.rx_mode(), Some(RxMode::Pwm));
        assert!(config.servos.min_travel.iter().all(|&t| t == -100));
        assert!(config.servos.max_travel.iter().all(|&t| t == 100));
        assert_eq!(config.servos.reverse, 0);
        assert_eq!(config.mixer.volumes, MixPreset::Aeroplane.volumes());
    }

    #[test]
    fn test_profiles_share_gains() {
        let config = build_defaults(HardwareVariant::Kk20);
        let [a, b, c] = config.profiles;
        assert_eq!(a.roll, b.roll);
        assert_eq!(b.yaw, c.yaw);
        assert_eq!(a.trigger, -90);
        assert_eq!(SwitchMode::from_u8(a.stab_mode), Some(SwitchMode::Disabled));
        assert_eq!(SwitchMode::from_u8(c.auto_mode), Some(SwitchMode::AlwaysOn));
    }
}
