use wbs_data::math::C3Vector;
use wbs_data::prelude::*;

use crate::block::{BlockReader, BlockWriter, M2Record};
use crate::error::Result;
use crate::track::{M2Track, M2TrackHeader};

wow_record! {
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct M2AttachmentHeader {
        pub id: u32,
        pub bone: u16,
        pub unknown: u16,
        pub position: C3Vector,
        pub animate_attached: M2TrackHeader<u8>,
    }
}

/// A point where items and effects attach to the model
#[derive(Debug, Clone, PartialEq, Default)]
pub struct M2Attachment {
    /// Attachment id, for example 0 for the shield slot
    pub id: u32,
    pub bone: u16,
    pub unknown: u16,
    /// Position relative to `bone`
    pub position: C3Vector,
    /// Whether attached models are shown
    pub animate_attached: M2Track<u8>,
}

impl M2Record for M2Attachment {
    type Raw = M2AttachmentHeader;

    fn resolve<R: Read + Seek>(raw: &Self::Raw, blocks: &mut BlockReader<'_, R>) -> Result<Self> {
        Ok(Self {
            id: raw.id,
            bone: raw.bone,
            unknown: raw.unknown,
            position: raw.position,
            animate_attached: blocks.track(&raw.animate_attached)?,
        })
    }

    fn store(&self, blocks: &mut BlockWriter) -> Result<Self::Raw> {
        Ok(M2AttachmentHeader {
            id: self.id,
            bone: self.bone,
            unknown: self.unknown,
            position: self.position,
            animate_attached: blocks.track(&self.animate_attached)?,
        })
    }
}
