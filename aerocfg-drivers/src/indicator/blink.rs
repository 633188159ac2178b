//! Blink acknowledgment
//!
//! Flips an output for a fixed time after each save. Works for a status LED
//! and for a beeper driven from a GPIO.

use aerocfg_core::traits::Acknowledge;
use aerocfg_hal::OutputPin;
use embedded_hal::delay::DelayNs;

/// Default pulse length
pub const BLINK_MS: u32 = 500;

/// Toggles a pin, waits, and toggles it back
pub struct BlinkAck<P, D> {
    pin: P,
    delay: D,
    duration_ms: u32,
}

impl<P: OutputPin, D: DelayNs> BlinkAck<P, D> {
    pub fn new(pin: P, delay: D) -> Self {
        Self::with_duration(pin, delay, BLINK_MS)
    }

    pub fn with_duration(pin: P, delay: D, duration_ms: u32) -> Self {
        Self {
            pin,
            delay,
            duration_ms,
        }
    }

    pub fn release(self) -> (P, D) {
        (self.pin, self.delay)
    }
}

impl<P: OutputPin, D: DelayNs> Acknowledge for BlinkAck<P, D> {
    fn saved(&mut self) {
        self.pin.toggle();
        self.delay.delay_ms(self.duration_ms);
        self.pin.toggle();
    }
}
