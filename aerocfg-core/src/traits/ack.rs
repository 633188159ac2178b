//! Save acknowledgment

/// User-visible signal that the configuration was written
///
/// Called once after every successful save, including the save of restored
/// defaults at boot. Typically blinks an LED or sounds the beeper.
pub trait Acknowledge {
    fn saved(&mut self);
}

/// No acknowledgment
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAck;

impl Acknowledge for NoAck {
    fn saved(&mut self) {}
}

impl<T: Acknowledge + ?Sized> Acknowledge for &mut T {
    fn saved(&mut self) {
        (**self).saved()
    }
}
