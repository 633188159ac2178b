//! Configuration record
//!
//! Layout, factory defaults and typed access to the single persisted
//! record.

pub mod channels;
pub mod defaults;
pub mod features;
pub mod fields;
pub mod record;
pub mod variant;

pub use channels::{parse_channel_order, ChannelOrder, ChannelOrderError};
pub use defaults::build_defaults;
pub use features::Features;
pub use fields::{Axis, FieldError, FieldId, FieldKind, FieldRange, FieldSpec, Step, Term};
pub use record::*;
pub use variant::HardwareVariant;
