//! Runtime lookup tables derived from the record

pub mod curves;

pub use curves::*;
