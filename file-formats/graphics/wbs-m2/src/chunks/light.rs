use wbs_data::math::C3Vector;
use wbs_data::prelude::*;

use crate::block::{BlockReader, BlockWriter, M2Record};
use crate::error::Result;
use crate::track::{M2Track, M2TrackHeader};

/// Light kind
pub mod light_type {
    pub const DIRECTIONAL: u16 = 0;
    pub const POINT: u16 = 1;
}

wow_record! {
    /// On-disk light, 156 bytes
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct M2LightHeader {
        pub light_type: u16,
        pub bone: i16,
        pub position: C3Vector,
        pub ambient_color: M2TrackHeader<C3Vector>,
        pub ambient_intensity: M2TrackHeader<f32>,
        pub diffuse_color: M2TrackHeader<C3Vector>,
        pub diffuse_intensity: M2TrackHeader<f32>,
        pub attenuation_start: M2TrackHeader<f32>,
        pub attenuation_end: M2TrackHeader<f32>,
        pub visibility: M2TrackHeader<u8>,
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct M2Light {
    pub light_type: u16,
    /// Bone the light follows, -1 for none
    pub bone: i16,
    pub position: C3Vector,
    pub ambient_color: M2Track<C3Vector>,
    pub ambient_intensity: M2Track<f32>,
    pub diffuse_color: M2Track<C3Vector>,
    pub diffuse_intensity: M2Track<f32>,
    pub attenuation_start: M2Track<f32>,
    pub attenuation_end: M2Track<f32>,
    pub visibility: M2Track<u8>,
}

impl M2Record for M2Light {
    type Raw = M2LightHeader;

    fn resolve<R: Read + Seek>(raw: &Self::Raw, blocks: &mut BlockReader<'_, R>) -> Result<Self> {
        Ok(Self {
            light_type: raw.light_type,
            bone: raw.bone,
            position: raw.position,
            ambient_color: blocks.track(&raw.ambient_color)?,
            ambient_intensity: blocks.track(&raw.ambient_intensity)?,
            diffuse_color: blocks.track(&raw.diffuse_color)?,
            diffuse_intensity: blocks.track(&raw.diffuse_intensity)?,
            attenuation_start: blocks.track(&raw.attenuation_start)?,
            attenuation_end: blocks.track(&raw.attenuation_end)?,
            visibility: blocks.track(&raw.visibility)?,
        })
    }

    fn store(&self, blocks: &mut BlockWriter) -> Result<Self::Raw> {
        Ok(M2LightHeader {
            light_type: self.light_type,
            bone: self.bone,
            position: self.position,
            ambient_color: blocks.track(&self.ambient_color)?,
            ambient_intensity: blocks.track(&self.ambient_intensity)?,
            diffuse_color: blocks.track(&self.diffuse_color)?,
            diffuse_intensity: blocks.track(&self.diffuse_intensity)?,
            attenuation_start: blocks.track(&self.attenuation_start)?,
            attenuation_end: blocks.track(&self.attenuation_end)?,
            visibility: blocks.track(&self.visibility)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_header_size() {
        assert_eq!(M2LightHeader::SIZE, 156);
    }
}
