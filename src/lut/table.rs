//! The remap table and its slot encoding.

use std::fmt;

use crate::error::{LutError, Result};

/// Number of slots in a table (channel 0 plus DMX channels 1..=512).
pub const CHANNEL_COUNT: usize = 513;

/// Highest addressable channel.
pub const MAX_CHANNEL: u16 = 512;

/// Encoded slot values at or above this offset are constants.
pub const CONSTANT_OFFSET: u16 = 1000;

/// Largest constant a slot can inject.
pub const MAX_CONSTANT: u16 = 255;

/// A channel index, guaranteed to be within `0..=512`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Channel(u16);

impl Channel {
    /// Create a channel, returning `None` when `index` is out of bounds.
    pub fn new(index: u32) -> Option<Self> {
        if index <= u32::from(MAX_CHANNEL) {
            Some(Self(index as u16))
        } else {
            None
        }
    }

    /// The channel number.
    pub fn get(self) -> u16 {
        self.0
    }

    /// The channel as a table index.
    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    /// The channel `offset` positions further, if still in bounds.
    pub fn offset(self, offset: u32) -> Option<Self> {
        Self::new(u32::from(self.0).saturating_add(offset))
    }

    /// Iterate over every channel in ascending order.
    pub fn all() -> impl Iterator<Item = Channel> {
        (0..=MAX_CHANNEL).map(Channel)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Decoded state of one output channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Output passes its own input channel through
    Identity,
    /// Output sources from another input channel
    MappedFrom(Channel),
    /// Output is held at a fixed value
    Constant(u8),
}

impl Slot {
    /// Slot for output `output` sourcing from `input`.
    ///
    /// A map onto itself is indistinguishable from identity once encoded,
    /// so it is normalised here.
    pub fn mapped(output: Channel, input: Channel) -> Self {
        if output == input {
            Self::Identity
        } else {
            Self::MappedFrom(input)
        }
    }

    /// Decode a stored value for slot `output`.
    pub fn decode(output: Channel, value: u16) -> Option<Self> {
        if value == output.get() {
            Some(Self::Identity)
        } else if value <= MAX_CHANNEL {
            Some(Self::MappedFrom(Channel(value)))
        } else if (CONSTANT_OFFSET..=CONSTANT_OFFSET + MAX_CONSTANT).contains(&value) {
            Some(Self::Constant((value - CONSTANT_OFFSET) as u8))
        } else {
            None
        }
    }

    /// Encode this slot as stored for output `output`.
    pub fn encode(self, output: Channel) -> u16 {
        match self {
            Self::Identity => output.get(),
            Self::MappedFrom(input) => input.get(),
            Self::Constant(value) => CONSTANT_OFFSET + u16::from(value),
        }
    }

    /// Whether the slot still holds its initial identity state.
    pub fn is_identity(self) -> bool {
        matches!(self, Self::Identity)
    }
}

/// A 513-slot output channel remap table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lut {
    slots: [Slot; CHANNEL_COUNT],
}

impl Lut {
    /// Create a table with every slot at identity.
    pub fn identity() -> Self {
        Self {
            slots: [Slot::Identity; CHANNEL_COUNT],
        }
    }

    /// Build a table from encoded slot values.
    pub fn from_raw(raw: &[u16; CHANNEL_COUNT]) -> Result<Self> {
        let mut lut = Self::identity();
        for channel in Channel::all() {
            let value = raw[channel.index()];
            lut.slots[channel.index()] =
                Slot::decode(channel, value).ok_or(LutError::InvalidSlot {
                    channel: channel.index(),
                    value,
                })?;
        }
        Ok(lut)
    }

    /// Encoded slot values, index = output channel.
    pub fn to_raw(&self) -> [u16; CHANNEL_COUNT] {
        let mut raw = [0u16; CHANNEL_COUNT];
        for channel in Channel::all() {
            raw[channel.index()] = self.slot(channel).encode(channel);
        }
        raw
    }

    /// The state of `channel`.
    pub fn slot(&self, channel: Channel) -> Slot {
        self.slots[channel.index()]
    }

    /// Encoded value of `channel`.
    pub fn raw(&self, channel: Channel) -> u16 {
        self.slot(channel).encode(channel)
    }

    /// Overwrite the state of `channel`.
    pub fn set(&mut self, channel: Channel, slot: Slot) {
        self.slots[channel.index()] = slot;
    }

    /// Whether every slot is at identity.
    pub fn is_identity(&self) -> bool {
        self.slots.iter().all(|slot| slot.is_identity())
    }

    /// Iterate over the slots that are not identity.
    pub fn rules(&self) -> impl Iterator<Item = (Channel, Slot)> + '_ {
        Channel::all()
            .map(move |channel| (channel, self.slot(channel)))
            .filter(|(_, slot)| !slot.is_identity())
    }

    /// Apply the table to a frame of channel values.
    ///
    /// `output[n]` receives the constant of slot `n`, or `input[source]`
    /// for mapped and identity slots. Sources beyond the end of `input`
    /// read as zero. At most [`CHANNEL_COUNT`] output values are written.
    pub fn remap(&self, input: &[u8], output: &mut [u8]) {
        for (channel, out) in Channel::all().zip(output.iter_mut()) {
            *out = match self.slot(channel) {
                Slot::Identity => input.get(channel.index()).copied().unwrap_or(0),
                Slot::MappedFrom(source) => input.get(source.index()).copied().unwrap_or(0),
                Slot::Constant(value) => value,
            };
        }
    }
}

impl Default for Lut {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ch(n: u32) -> Channel {
        Channel::new(n).unwrap()
    }

    #[test]
    fn test_channel_bounds() {
        assert!(Channel::new(0).is_some());
        assert!(Channel::new(512).is_some());
        assert!(Channel::new(513).is_none());
        assert_eq!(ch(510).offset(2), Some(ch(512)));
        assert_eq!(ch(510).offset(3), None);
        assert_eq!(Channel::all().count(), CHANNEL_COUNT);
    }

    #[test]
    fn test_identity_table() {
        let lut = Lut::identity();
        assert!(lut.is_identity());
        let raw = lut.to_raw();
        for (index, value) in raw.iter().enumerate() {
            assert_eq!(usize::from(*value), index);
        }
    }

    #[test]
    fn test_slot_decoding() {
        assert_eq!(Slot::decode(ch(5), 5), Some(Slot::Identity));
        assert_eq!(Slot::decode(ch(5), 9), Some(Slot::MappedFrom(ch(9))));
        assert_eq!(Slot::decode(ch(5), 1000), Some(Slot::Constant(0)));
        assert_eq!(Slot::decode(ch(5), 1255), Some(Slot::Constant(255)));
        assert_eq!(Slot::decode(ch(5), 600), None);
        assert_eq!(Slot::decode(ch(5), 1256), None);
    }

    #[test]
    fn test_constant_encoding() {
        for k in [0u8, 1, 128, 255] {
            let slot = Slot::Constant(k);
            let encoded = slot.encode(ch(40));
            assert_eq!(encoded, u16::from(k) + 1000);
            assert_eq!(encoded - CONSTANT_OFFSET, u16::from(k));
        }
    }

    #[test]
    fn test_self_map_is_identity() {
        assert_eq!(Slot::mapped(ch(3), ch(3)), Slot::Identity);
        assert_eq!(Slot::mapped(ch(3), ch(4)), Slot::MappedFrom(ch(4)));
    }

    #[test]
    fn test_from_raw_rejects_invalid() {
        let mut raw = Lut::identity().to_raw();
        raw[10] = 20;
        raw[11] = 1042;
        let lut = Lut::from_raw(&raw).unwrap();
        assert_eq!(lut.slot(ch(10)), Slot::MappedFrom(ch(20)));
        assert_eq!(lut.slot(ch(11)), Slot::Constant(42));
        assert_eq!(lut.rules().count(), 2);

        raw[12] = 700;
        assert!(matches!(
            Lut::from_raw(&raw),
            Err(LutError::InvalidSlot { channel: 12, value: 700 })
        ));
    }

    #[test]
    fn test_remap_frame() {
        let mut lut = Lut::identity();
        lut.set(ch(1), Slot::MappedFrom(ch(3)));
        lut.set(ch(2), Slot::Constant(77));

        let input = [0u8, 10, 20, 30, 40];
        let mut output = [0u8; 5];
        lut.remap(&input, &mut output);
        assert_eq!(output, [0, 30, 77, 30, 40]);
    }
}
