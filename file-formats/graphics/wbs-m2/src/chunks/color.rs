use wbs_data::math::{C3Vector, Quaternion};
use wbs_data::prelude::*;

use crate::block::{BlockReader, BlockWriter, M2Record};
use crate::error::Result;
use crate::track::{M2Track, M2TrackHeader};

/// Fixed point opacity, 0x7FFF is opaque
pub const OPAQUE: i16 = 0x7FFF;

wow_record! {
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct M2ColorHeader {
        pub color: M2TrackHeader<C3Vector>,
        pub alpha: M2TrackHeader<i16>,
    }
}

/// An animated vertex colour referenced by skin texture units
#[derive(Debug, Clone, PartialEq, Default)]
pub struct M2Color {
    /// RGB in 0.0..=1.0
    pub color: M2Track<C3Vector>,
    pub alpha: M2Track<i16>,
}

impl M2Record for M2Color {
    type Raw = M2ColorHeader;

    fn resolve<R: Read + Seek>(raw: &Self::Raw, blocks: &mut BlockReader<'_, R>) -> Result<Self> {
        Ok(Self {
            color: blocks.track(&raw.color)?,
            alpha: blocks.track(&raw.alpha)?,
        })
    }

    fn store(&self, blocks: &mut BlockWriter) -> Result<Self::Raw> {
        Ok(M2ColorHeader {
            color: blocks.track(&self.color)?,
            alpha: blocks.track(&self.alpha)?,
        })
    }
}

/// Animated texture opacity
pub type M2TextureWeight = M2Track<i16>;

wow_record! {
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct M2TextureTransformHeader {
        pub translation: M2TrackHeader<C3Vector>,
        pub rotation: M2TrackHeader<Quaternion>,
        pub scaling: M2TrackHeader<C3Vector>,
    }
}

/// Animated UV transform
#[derive(Debug, Clone, PartialEq, Default)]
pub struct M2TextureTransform {
    pub translation: M2Track<C3Vector>,
    pub rotation: M2Track<Quaternion>,
    pub scaling: M2Track<C3Vector>,
}

impl M2Record for M2TextureTransform {
    type Raw = M2TextureTransformHeader;

    fn resolve<R: Read + Seek>(raw: &Self::Raw, blocks: &mut BlockReader<'_, R>) -> Result<Self> {
        Ok(Self {
            translation: blocks.track(&raw.translation)?,
            rotation: blocks.track(&raw.rotation)?,
            scaling: blocks.track(&raw.scaling)?,
        })
    }

    fn store(&self, blocks: &mut BlockWriter) -> Result<Self::Raw> {
        Ok(M2TextureTransformHeader {
            translation: blocks.track(&self.translation)?,
            rotation: blocks.track(&self.rotation)?,
            scaling: blocks.track(&self.scaling)?,
        })
    }
}
