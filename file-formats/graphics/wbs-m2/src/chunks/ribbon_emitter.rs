use wbs_data::math::C3Vector;
use wbs_data::prelude::*;

use crate::block::{BlockReader, BlockWriter, M2Record};
use crate::error::Result;
use crate::track::{M2Track, M2TrackHeader};

wow_record! {
    /// On-disk ribbon emitter, 176 bytes
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct M2RibbonEmitterHeader {
        pub id: u32,
        pub bone: u32,
        pub position: C3Vector,
        pub texture_indices: WowArray<u16>,
        pub material_indices: WowArray<u16>,
        pub color: M2TrackHeader<C3Vector>,
        pub alpha: M2TrackHeader<i16>,
        pub height_above: M2TrackHeader<f32>,
        pub height_below: M2TrackHeader<f32>,
        pub edges_per_second: f32,
        pub edge_lifetime: f32,
        pub gravity: f32,
        pub texture_rows: u16,
        pub texture_cols: u16,
        pub texture_slot: M2TrackHeader<u16>,
        pub visibility: M2TrackHeader<u8>,
        pub priority_plane: i16,
        pub color_index: u8,
        pub texture_transform_lookup: u8,
    }
}

/// A trail of quads left behind a bone, such as a sword swing
#[derive(Debug, Clone, PartialEq, Default)]
pub struct M2RibbonEmitter {
    pub id: u32,
    pub bone: u32,
    /// Position relative to `bone`
    pub position: C3Vector,
    pub texture_indices: Vec<u16>,
    pub material_indices: Vec<u16>,
    pub color: M2Track<C3Vector>,
    /// Fixed point alpha, 0x7FFF is opaque
    pub alpha: M2Track<i16>,
    pub height_above: M2Track<f32>,
    pub height_below: M2Track<f32>,
    pub edges_per_second: f32,
    /// Seconds an edge stays visible
    pub edge_lifetime: f32,
    pub gravity: f32,
    pub texture_rows: u16,
    pub texture_cols: u16,
    pub texture_slot: M2Track<u16>,
    pub visibility: M2Track<u8>,
    pub priority_plane: i16,
    pub color_index: u8,
    pub texture_transform_lookup: u8,
}

impl M2Record for M2RibbonEmitter {
    type Raw = M2RibbonEmitterHeader;

    fn resolve<R: Read + Seek>(raw: &Self::Raw, blocks: &mut BlockReader<'_, R>) -> Result<Self> {
        Ok(Self {
            id: raw.id,
            bone: raw.bone,
            position: raw.position,
            texture_indices: blocks.array(raw.texture_indices)?,
            material_indices: blocks.array(raw.material_indices)?,
            color: blocks.track(&raw.color)?,
            alpha: blocks.track(&raw.alpha)?,
            height_above: blocks.track(&raw.height_above)?,
            height_below: blocks.track(&raw.height_below)?,
            edges_per_second: raw.edges_per_second,
            edge_lifetime: raw.edge_lifetime,
            gravity: raw.gravity,
            texture_rows: raw.texture_rows,
            texture_cols: raw.texture_cols,
            texture_slot: blocks.track(&raw.texture_slot)?,
            visibility: blocks.track(&raw.visibility)?,
            priority_plane: raw.priority_plane,
            color_index: raw.color_index,
            texture_transform_lookup: raw.texture_transform_lookup,
        })
    }

    fn store(&self, blocks: &mut BlockWriter) -> Result<Self::Raw> {
        Ok(M2RibbonEmitterHeader {
            id: self.id,
            bone: self.bone,
            position: self.position,
            texture_indices: blocks.data.push_slice(&self.texture_indices)?,
            material_indices: blocks.data.push_slice(&self.material_indices)?,
            color: blocks.track(&self.color)?,
            alpha: blocks.track(&self.alpha)?,
            height_above: blocks.track(&self.height_above)?,
            height_below: blocks.track(&self.height_below)?,
            edges_per_second: self.edges_per_second,
            edge_lifetime: self.edge_lifetime,
            gravity: self.gravity,
            texture_rows: self.texture_rows,
            texture_cols: self.texture_cols,
            texture_slot: blocks.track(&self.texture_slot)?,
            visibility: blocks.track(&self.visibility)?,
            priority_plane: self.priority_plane,
            color_index: self.color_index,
            texture_transform_lookup: self.texture_transform_lookup,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::TrackSource;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    #[test]
    fn test_ribbon_header_size() {
        assert_eq!(M2RibbonEmitterHeader::SIZE, 176);
    }

    #[test]
    fn test_ribbon_round_trip() {
        let ribbon = M2RibbonEmitter {
            id: 1,
            bone: 3,
            position: C3Vector::new(0.0, 0.5, 1.0),
            texture_indices: vec![0],
            material_indices: vec![1],
            color: M2Track::constant(C3Vector::new(1.0, 0.5, 0.0), 2),
            alpha: M2Track::constant(0x7FFF, 2),
            height_above: M2Track::constant(0.25, 2),
            height_below: M2Track::constant(0.25, 2),
            edges_per_second: 30.0,
            edge_lifetime: 0.4,
            texture_rows: 1,
            texture_cols: 1,
            visibility: M2Track::constant(1, 2),
            priority_plane: -1,
            ..M2RibbonEmitter::default()
        };

        let mut writer = BlockWriter::new(0, &[false, false]);
        let raw = writer.records(std::slice::from_ref(&ribbon)).unwrap();
        let mut cursor = Cursor::new(writer.finish().0.into_bytes());
        let sources = vec![TrackSource::Model; 2];
        let decoded: Vec<M2RibbonEmitter> =
            BlockReader::new(&mut cursor, sources).records(raw).unwrap();
        assert_eq!(decoded, vec![ribbon]);
    }
}
