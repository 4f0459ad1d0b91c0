use bitflags::bitflags;
use wbs_data::math::BoundingSphere;
use wbs_data::{wow_flags, wow_record};

bitflags! {
    /// Sequence flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct M2SequenceFlags: u32 {
        /// Set by the client once the sequence is loaded
        const LOADED = 0x01;
        const UNKNOWN_2 = 0x02;
        const UNKNOWN_4 = 0x04;
        const UNKNOWN_8 = 0x08;
        /// Track data lives in the model file instead of an `.anim` file
        const EMBEDDED = 0x20;
        /// The sequence reuses the data of `alias_next`
        const ALIAS = 0x40;
        /// Blended with the next sequence
        const BLENDED = 0x800;
    }
}
wow_flags!(M2SequenceFlags, u32);

wow_record! {
    /// One animation of the model
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct M2Sequence {
        /// Animation id from `AnimationData.dbc`
        pub id: u16,
        pub variation_index: u16,
        /// Length in milliseconds
        pub duration: u32,
        pub movement_speed: f32,
        pub flags: M2SequenceFlags,
        /// Chance to play among variations, out of 0x7FFF
        pub frequency: i16,
        pub padding: u16,
        pub replay_min: u32,
        pub replay_max: u32,
        pub blend_time: u32,
        pub bounds: BoundingSphere,
        /// Index of the next variation, -1 for the last one
        pub variation_next: i16,
        pub alias_next: u16,
    }
}

impl M2Sequence {
    pub fn new(id: u16, variation_index: u16, duration: u32) -> Self {
        Self {
            id,
            variation_index,
            duration,
            frequency: 0x7FFF,
            blend_time: 150,
            variation_next: -1,
            ..Self::default()
        }
    }

    pub fn is_alias(&self) -> bool {
        self.flags.contains(M2SequenceFlags::ALIAS)
    }

    /// Whether the track keys of this sequence live in an `.anim` file
    pub fn is_external(&self) -> bool {
        !self
            .flags
            .intersects(M2SequenceFlags::EMBEDDED | M2SequenceFlags::ALIAS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wbs_data::types::WowStruct;

    #[test]
    fn test_sequence_size() {
        assert_eq!(M2Sequence::SIZE, 64);
    }

    #[test]
    fn test_external_sequences() {
        let mut sequence = M2Sequence::new(4, 0, 1000);
        assert!(sequence.is_external());

        sequence.flags = M2SequenceFlags::EMBEDDED;
        assert!(!sequence.is_external());

        sequence.flags = M2SequenceFlags::ALIAS;
        assert!(sequence.is_alias());
        assert!(!sequence.is_external());
    }
}
