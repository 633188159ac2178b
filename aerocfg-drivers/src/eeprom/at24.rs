//! 24Cxx I2C EEPROM
//!
//! Devices from 24C32 upward take a two-byte memory address. After every
//! byte write the device runs an internal write cycle and NACKs its address
//! until the cycle completes. The driver polls for that ACK instead of
//! sleeping, so a write needs no timer and is safe with interrupts masked.

use aerocfg_hal::{ByteStore, I2cBus, StoreError};

/// Default device address (A2..A0 tied low)
pub const AT24_ADDRESS: u8 = 0x50;

/// Largest device reachable with two-byte addressing
pub const AT24_MAX_CAPACITY: usize = 0x1_0000;

/// Address polls allowed while waiting out one write cycle
///
/// A 5 ms cycle is roughly 200 NACKed address bytes at 400 kHz.
pub const AT24_ACK_POLL_LIMIT: u32 = 1000;

/// Byte-addressable store on a 24Cxx EEPROM
pub struct At24Eeprom<B> {
    bus: B,
    address: u8,
    capacity: usize,
}

impl<B: I2cBus> At24Eeprom<B> {
    /// Create a driver for a device of `capacity` bytes at `address`
    ///
    /// Fails with `OutOfRange` above 64 KiB, which two address bytes can't
    /// reach.
    pub fn new(bus: B, address: u8, capacity: usize) -> Result<Self, StoreError> {
        if capacity > AT24_MAX_CAPACITY {
            return Err(StoreError::OutOfRange);
        }
        Ok(Self {
            bus,
            address,
            capacity,
        })
    }

    /// 24C32 (4 KiB) at the default address
    pub fn at24c32(bus: B) -> Self {
        Self {
            bus,
            address: AT24_ADDRESS,
            capacity: 4096,
        }
    }

    /// Release the bus
    pub fn release(self) -> B {
        self.bus
    }

    fn check(&self, offset: usize, len: usize) -> Result<[u8; 2], StoreError> {
        match offset.checked_add(len) {
            Some(end) if end <= self.capacity => u16::try_from(offset)
                .map(u16::to_be_bytes)
                .map_err(|_| StoreError::OutOfRange),
            _ => Err(StoreError::OutOfRange),
        }
    }

    /// Poll the device until it ACKs again after a write
    ///
    /// Each poll re-sends the memory address, leaving the pointer where the
    /// next access expects it.
    fn wait_write_cycle(&mut self, mem_address: [u8; 2]) -> Result<(), StoreError> {
        for _ in 0..AT24_ACK_POLL_LIMIT {
            if self.bus.write(self.address, &mem_address).is_ok() {
                return Ok(());
            }
        }
        Err(StoreError::Bus)
    }
}

impl<B: I2cBus> ByteStore for At24Eeprom<B> {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), StoreError> {
        let mem_address = self.check(offset, buf.len())?;
        self.bus
            .write_read(self.address, &mem_address, buf)
            .map_err(|_| StoreError::Bus)
    }

    fn write_byte(&mut self, offset: usize, value: u8) -> Result<(), StoreError> {
        let [hi, lo] = self.check(offset, 1)?;
        self.bus
            .write(self.address, &[hi, lo, value])
            .map_err(|_| StoreError::Bus)?;
        self.wait_write_cycle([hi, lo])
    }
}
