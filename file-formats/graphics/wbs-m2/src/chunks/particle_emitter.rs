use bitflags::bitflags;
use wbs_data::math::{C2Vector, C3Vector};
use wbs_data::prelude::*;

use crate::block::{BlockReader, BlockWriter, M2Record};
use crate::error::Result;
use crate::track::{M2FakeTrack, M2FakeTrackHeader, M2Track, M2TrackHeader};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct M2ParticleFlags: u32 {
        const AFFECTED_BY_LIGHTING = 0x0000_0001;
        const WORLD_SPACE = 0x0000_0008;
        const DO_NOT_TRAIL = 0x0000_0010;
        const UNLIGHTED = 0x0000_0020;
        const USE_BURST_MULTIPLIER = 0x0000_0040;
        const MODEL_SPACE = 0x0000_0080;
        const RANDOM_SPAWN_POSITION = 0x0000_0200;
        const PINNED = 0x0000_0400;
        const RANDOM_TEXTURE = 0x0001_0000;
        const OUTWARD = 0x0002_0000;
        const INWARD = 0x0004_0000;
        const SCALE_VARIATION_XY = 0x0008_0000;
        const RANDOM_FLIP_BOOK_START = 0x0020_0000;
        const NO_THROTTLE = 0x0040_0000;
        const GRAVITY_VECTOR = 0x0080_0000;
    }
}
wow_flags!(M2ParticleFlags, u32);

/// Shape particles are spawned from
pub mod emitter_type {
    pub const PLANE: u16 = 1;
    pub const SPHERE: u16 = 2;
    pub const SPLINE: u16 = 3;
}

wow_record! {
    /// On-disk particle emitter, 476 bytes
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct M2ParticleEmitterHeader {
        pub id: u32,
        pub flags: M2ParticleFlags,
        pub position: C3Vector,
        pub bone: u16,
        pub texture: u16,
        pub geometry_model: WowArray<u8>,
        pub recursion_model: WowArray<u8>,
        pub blending_type: u16,
        pub emitter_type: u16,
        pub particle_type: u8,
        pub head_or_tail: u8,
        pub texture_tile_rotation: i16,
        pub texture_rows: u16,
        pub texture_cols: u16,
        pub emission_speed: M2TrackHeader<f32>,
        pub speed_variation: M2TrackHeader<f32>,
        pub vertical_range: M2TrackHeader<f32>,
        pub horizontal_range: M2TrackHeader<f32>,
        pub gravity: M2TrackHeader<f32>,
        pub lifespan: M2TrackHeader<f32>,
        pub lifespan_variation: f32,
        pub emission_rate: M2TrackHeader<f32>,
        pub emission_rate_variation: f32,
        pub emission_area_length: M2TrackHeader<f32>,
        pub emission_area_width: M2TrackHeader<f32>,
        pub z_source: M2TrackHeader<f32>,
        pub color: M2FakeTrackHeader<C3Vector>,
        pub alpha: M2FakeTrackHeader<i16>,
        pub scale: M2FakeTrackHeader<C2Vector>,
        pub scale_variation: C2Vector,
        pub head_cell: M2FakeTrackHeader<u16>,
        pub tail_cell: M2FakeTrackHeader<u16>,
        pub motion: M2ParticleMotion,
        pub spline_points: WowArray<C3Vector>,
        pub enabled_in: M2TrackHeader<u8>,
    }
}

wow_record! {
    /// Fixed parameters of a particle's flight, stored inline
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct M2ParticleMotion {
        pub tail_length: f32,
        pub twinkle_speed: f32,
        pub twinkle_percent: f32,
        pub twinkle_scale_min: f32,
        pub twinkle_scale_max: f32,
        pub burst_multiplier: f32,
        pub drag: f32,
        pub base_spin: f32,
        pub base_spin_variation: f32,
        pub spin: f32,
        pub spin_variation: f32,
        pub tumble_min: C3Vector,
        pub tumble_max: C3Vector,
        pub wind_vector: C3Vector,
        pub wind_time: f32,
        pub follow_speed1: f32,
        pub follow_scale1: f32,
        pub follow_speed2: f32,
        pub follow_scale2: f32,
    }
}

/// A particle system attached to a bone
#[derive(Debug, Clone, PartialEq, Default)]
pub struct M2ParticleEmitter {
    pub id: u32,
    pub flags: M2ParticleFlags,
    /// Position relative to `bone`
    pub position: C3Vector,
    pub bone: u16,
    pub texture: u16,
    /// Model spawned in place of sprites, if any
    pub geometry_model: String,
    pub recursion_model: String,
    pub blending_type: u16,
    pub emitter_type: u16,
    pub particle_type: u8,
    pub head_or_tail: u8,
    pub texture_tile_rotation: i16,
    pub texture_rows: u16,
    pub texture_cols: u16,
    pub emission_speed: M2Track<f32>,
    pub speed_variation: M2Track<f32>,
    pub vertical_range: M2Track<f32>,
    pub horizontal_range: M2Track<f32>,
    pub gravity: M2Track<f32>,
    pub lifespan: M2Track<f32>,
    pub lifespan_variation: f32,
    pub emission_rate: M2Track<f32>,
    pub emission_rate_variation: f32,
    pub emission_area_length: M2Track<f32>,
    pub emission_area_width: M2Track<f32>,
    pub z_source: M2Track<f32>,
    /// Color over the particle's lifetime
    pub color: M2FakeTrack<C3Vector>,
    pub alpha: M2FakeTrack<i16>,
    pub scale: M2FakeTrack<C2Vector>,
    pub scale_variation: C2Vector,
    pub head_cell: M2FakeTrack<u16>,
    pub tail_cell: M2FakeTrack<u16>,
    pub motion: M2ParticleMotion,
    /// Only used by [`emitter_type::SPLINE`] emitters
    pub spline_points: Vec<C3Vector>,
    pub enabled_in: M2Track<u8>,
}

impl M2Record for M2ParticleEmitter {
    type Raw = M2ParticleEmitterHeader;

    fn resolve<R: Read + Seek>(raw: &Self::Raw, blocks: &mut BlockReader<'_, R>) -> Result<Self> {
        Ok(Self {
            id: raw.id,
            flags: raw.flags,
            position: raw.position,
            bone: raw.bone,
            texture: raw.texture,
            geometry_model: blocks.string(raw.geometry_model)?,
            recursion_model: blocks.string(raw.recursion_model)?,
            blending_type: raw.blending_type,
            emitter_type: raw.emitter_type,
            particle_type: raw.particle_type,
            head_or_tail: raw.head_or_tail,
            texture_tile_rotation: raw.texture_tile_rotation,
            texture_rows: raw.texture_rows,
            texture_cols: raw.texture_cols,
            emission_speed: blocks.track(&raw.emission_speed)?,
            speed_variation: blocks.track(&raw.speed_variation)?,
            vertical_range: blocks.track(&raw.vertical_range)?,
            horizontal_range: blocks.track(&raw.horizontal_range)?,
            gravity: blocks.track(&raw.gravity)?,
            lifespan: blocks.track(&raw.lifespan)?,
            lifespan_variation: raw.lifespan_variation,
            emission_rate: blocks.track(&raw.emission_rate)?,
            emission_rate_variation: raw.emission_rate_variation,
            emission_area_length: blocks.track(&raw.emission_area_length)?,
            emission_area_width: blocks.track(&raw.emission_area_width)?,
            z_source: blocks.track(&raw.z_source)?,
            color: blocks.fake_track(&raw.color)?,
            alpha: blocks.fake_track(&raw.alpha)?,
            scale: blocks.fake_track(&raw.scale)?,
            scale_variation: raw.scale_variation,
            head_cell: blocks.fake_track(&raw.head_cell)?,
            tail_cell: blocks.fake_track(&raw.tail_cell)?,
            motion: raw.motion,
            spline_points: blocks.array(raw.spline_points)?,
            enabled_in: blocks.track(&raw.enabled_in)?,
        })
    }

    fn store(&self, blocks: &mut BlockWriter) -> Result<Self::Raw> {
        Ok(M2ParticleEmitterHeader {
            id: self.id,
            flags: self.flags,
            position: self.position,
            bone: self.bone,
            texture: self.texture,
            geometry_model: blocks.data.push_str(&self.geometry_model)?,
            recursion_model: blocks.data.push_str(&self.recursion_model)?,
            blending_type: self.blending_type,
            emitter_type: self.emitter_type,
            particle_type: self.particle_type,
            head_or_tail: self.head_or_tail,
            texture_tile_rotation: self.texture_tile_rotation,
            texture_rows: self.texture_rows,
            texture_cols: self.texture_cols,
            emission_speed: blocks.track(&self.emission_speed)?,
            speed_variation: blocks.track(&self.speed_variation)?,
            vertical_range: blocks.track(&self.vertical_range)?,
            horizontal_range: blocks.track(&self.horizontal_range)?,
            gravity: blocks.track(&self.gravity)?,
            lifespan: blocks.track(&self.lifespan)?,
            lifespan_variation: self.lifespan_variation,
            emission_rate: blocks.track(&self.emission_rate)?,
            emission_rate_variation: self.emission_rate_variation,
            emission_area_length: blocks.track(&self.emission_area_length)?,
            emission_area_width: blocks.track(&self.emission_area_width)?,
            z_source: blocks.track(&self.z_source)?,
            color: blocks.fake_track(&self.color)?,
            alpha: blocks.fake_track(&self.alpha)?,
            scale: blocks.fake_track(&self.scale)?,
            scale_variation: self.scale_variation,
            head_cell: blocks.fake_track(&self.head_cell)?,
            tail_cell: blocks.fake_track(&self.tail_cell)?,
            motion: self.motion,
            spline_points: blocks.data.push_slice(&self.spline_points)?,
            enabled_in: blocks.track(&self.enabled_in)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::TrackSource;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn sparks() -> M2ParticleEmitter {
        M2ParticleEmitter {
            id: 7,
            flags: M2ParticleFlags::PINNED | M2ParticleFlags::from_bits_retain(0x8000_0000),
            position: C3Vector::new(0.0, 0.0, 1.5),
            bone: 2,
            geometry_model: "Spells/Spark.mdx".to_string(),
            blending_type: 4,
            emitter_type: emitter_type::SPLINE,
            texture_rows: 2,
            texture_cols: 2,
            emission_speed: M2Track::constant(3.0, 1),
            lifespan: M2Track::constant(1.2, 1),
            lifespan_variation: 0.1,
            emission_rate: M2Track::constant(20.0, 1),
            color: M2FakeTrack::three_point(
                C3Vector::new(255.0, 200.0, 0.0),
                C3Vector::new(255.0, 100.0, 0.0),
                C3Vector::new(64.0, 0.0, 0.0),
            ),
            alpha: M2FakeTrack::three_point(0x7FFF, 0x4000, 0),
            scale: M2FakeTrack::three_point(
                C2Vector::new(0.1, 0.1),
                C2Vector::new(0.2, 0.2),
                C2Vector::new(0.05, 0.05),
            ),
            motion: M2ParticleMotion {
                tail_length: 1.0,
                drag: 0.5,
                wind_vector: C3Vector::new(0.0, 1.0, 0.0),
                ..M2ParticleMotion::default()
            },
            spline_points: vec![C3Vector::default(), C3Vector::new(0.0, 0.0, 2.0)],
            enabled_in: M2Track::constant(1, 1),
            ..M2ParticleEmitter::default()
        }
    }

    #[test]
    fn test_particle_header_size() {
        assert_eq!(M2ParticleMotion::SIZE, 100);
        assert_eq!(M2ParticleEmitterHeader::SIZE, 476);
    }

    #[test]
    fn test_particle_round_trip() {
        let emitter = sparks();
        let mut writer = BlockWriter::new(0, &[false]);
        let raw = writer.records(std::slice::from_ref(&emitter)).unwrap();
        let mut cursor = Cursor::new(writer.finish().0.into_bytes());
        let decoded: Vec<M2ParticleEmitter> =
            BlockReader::new(&mut cursor, vec![TrackSource::Model]).records(raw).unwrap();
        assert_eq!(decoded, vec![emitter]);
    }
}
