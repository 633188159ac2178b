//! Status output for STM32F0
//!
//! Wraps an embassy output pin so it can drive save acknowledgments.

use aerocfg_hal::OutputPin;
use embassy_stm32::gpio::Output;

/// Status LED or beeper on a push-pull output
pub struct StatusPin<'d> {
    pin: Output<'d>,
}

impl<'d> StatusPin<'d> {
    /// Wrap a configured output pin
    pub fn new(pin: Output<'d>) -> Self {
        Self { pin }
    }
}

impl<'d> OutputPin for StatusPin<'d> {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn toggle(&mut self) {
        self.pin.toggle();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}
