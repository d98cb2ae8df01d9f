//! Remap table representation and the shared rule write policy.
//!
//! A [`Lut`] holds one [`Slot`] per output channel. Slots are decoded into a
//! tagged state as soon as they enter the crate and are only re-encoded into
//! the integer form (`index` = identity, `0..=512` = source channel,
//! `1000 + k` = constant `k`) at the storage boundary.

mod builder;
mod table;

pub use builder::LutBuilder;
pub use table::{Channel, Lut, Slot, CHANNEL_COUNT, CONSTANT_OFFSET, MAX_CHANNEL, MAX_CONSTANT};
