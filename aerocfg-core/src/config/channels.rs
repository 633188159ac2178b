//! Receiver channel functions and channel order
//!
//! The stored channel order maps each receiver position to the function it
//! carries. Orders are written as eight letters, one per position, from the
//! alphabet `TAERG123`.

use heapless::String;

/// Number of channel functions
pub const CHANNEL_FUNCTIONS: usize = 8;

pub const THROTTLE: u8 = 0;
pub const AILERON: u8 = 1;
pub const ELEVATOR: u8 = 2;
pub const RUDDER: u8 = 3;
pub const GEAR: u8 = 4;
pub const AUX1: u8 = 5;
pub const AUX2: u8 = 6;
pub const AUX3: u8 = 7;

/// "No channel" selector for optional channel fields
pub const NOCHAN: u8 = 8;

/// One letter per function, indexed by function
const LETTERS: &[u8; CHANNEL_FUNCTIONS] = b"TAERG123";

/// Errors from [`parse_channel_order`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelOrderError {
    /// Input is not exactly one letter per position
    Length,
    /// Letter outside `TAERG123`
    UnknownLetter {
        /// Receiver position of the letter
        position: u8,
    },
    /// A function appears at more than one position
    Duplicate {
        /// The repeated function
        function: u8,
    },
}

/// Function assigned to each receiver position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelOrder(pub [u8; CHANNEL_FUNCTIONS]);

impl ChannelOrder {
    /// JR/Spektrum sequence (TAERG123)
    pub const JR: Self = Self([0, 1, 2, 3, 4, 5, 6, 7]);

    /// Futaba sequence (AETRG123)
    pub const FUTABA: Self = Self([1, 2, 0, 3, 4, 5, 6, 7]);

    /// Function carried by a receiver position
    pub fn function_at(&self, position: usize) -> Option<u8> {
        self.0.get(position).copied()
    }

    /// Receiver position carrying a function
    pub fn position_of(&self, function: u8) -> Option<usize> {
        self.0.iter().position(|&f| f == function)
    }

    /// Check that every function appears exactly once
    pub fn is_permutation(&self) -> bool {
        let mut seen = 0u8;
        for &function in &self.0 {
            if function as usize >= CHANNEL_FUNCTIONS || seen & (1 << function) != 0 {
                return false;
            }
            seen |= 1 << function;
        }
        true
    }

    /// Render as letters; functions out of range render as `?`
    pub fn letters(&self) -> String<CHANNEL_FUNCTIONS> {
        let mut out = String::new();
        for &function in &self.0 {
            let c = LETTERS
                .get(function as usize)
                .map(|&b| b as char)
                .unwrap_or('?');
            // Capacity matches the number of positions
            let _ = out.push(c);
        }
        out
    }
}

impl Default for ChannelOrder {
    fn default() -> Self {
        Self::JR
    }
}

/// Parse an eight-letter channel order such as `"AETRG123"`
pub fn parse_channel_order(input: &str) -> Result<ChannelOrder, ChannelOrderError> {
    let bytes = input.as_bytes();
    if bytes.len() != CHANNEL_FUNCTIONS {
        return Err(ChannelOrderError::Length);
    }

    let mut order = [0u8; CHANNEL_FUNCTIONS];
    let mut seen = 0u8;
    for (position, &letter) in bytes.iter().enumerate() {
        let function = LETTERS
            .iter()
            .position(|&l| l == letter.to_ascii_uppercase())
            .ok_or(ChannelOrderError::UnknownLetter {
                position: position as u8,
            })? as u8;
        if seen & (1 << function) != 0 {
            return Err(ChannelOrderError::Duplicate { function });
        }
        seen |= 1 << function;
        order[position] = function;
    }
    Ok(ChannelOrder(order))
}
