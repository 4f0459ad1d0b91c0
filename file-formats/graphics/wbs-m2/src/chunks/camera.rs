use wbs_data::math::C3Vector;
use wbs_data::prelude::*;

use crate::block::{BlockReader, BlockWriter, M2Record};
use crate::error::Result;
use crate::track::{M2SplineKey, M2Track, M2TrackHeader};

wow_record! {
    /// On-disk camera, 100 bytes
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct M2CameraHeader {
        pub camera_type: u32,
        pub field_of_view: f32,
        pub far_clip: f32,
        pub near_clip: f32,
        pub positions: M2TrackHeader<M2SplineKey<C3Vector>>,
        pub position_base: C3Vector,
        pub target_positions: M2TrackHeader<M2SplineKey<C3Vector>>,
        pub target_position_base: C3Vector,
        pub roll: M2TrackHeader<M2SplineKey<f32>>,
    }
}

/// A camera used for portraits and character selection
#[derive(Debug, Clone, PartialEq, Default)]
pub struct M2Camera {
    /// 0 portrait, 1 character info, `u32::MAX` flyby
    pub camera_type: u32,
    pub field_of_view: f32,
    pub far_clip: f32,
    pub near_clip: f32,
    /// Offsets from `position_base`
    pub positions: M2Track<M2SplineKey<C3Vector>>,
    pub position_base: C3Vector,
    pub target_positions: M2Track<M2SplineKey<C3Vector>>,
    pub target_position_base: C3Vector,
    pub roll: M2Track<M2SplineKey<f32>>,
}

impl M2Record for M2Camera {
    type Raw = M2CameraHeader;

    fn resolve<R: Read + Seek>(raw: &Self::Raw, blocks: &mut BlockReader<'_, R>) -> Result<Self> {
        Ok(Self {
            camera_type: raw.camera_type,
            field_of_view: raw.field_of_view,
            far_clip: raw.far_clip,
            near_clip: raw.near_clip,
            positions: blocks.track(&raw.positions)?,
            position_base: raw.position_base,
            target_positions: blocks.track(&raw.target_positions)?,
            target_position_base: raw.target_position_base,
            roll: blocks.track(&raw.roll)?,
        })
    }

    fn store(&self, blocks: &mut BlockWriter) -> Result<Self::Raw> {
        Ok(M2CameraHeader {
            camera_type: self.camera_type,
            field_of_view: self.field_of_view,
            far_clip: self.far_clip,
            near_clip: self.near_clip,
            positions: blocks.track(&self.positions)?,
            position_base: self.position_base,
            target_positions: blocks.track(&self.target_positions)?,
            target_position_base: self.target_position_base,
            roll: blocks.track(&self.roll)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::M2InterpolationType;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    #[test]
    fn test_camera_header_size() {
        assert_eq!(M2CameraHeader::SIZE, 100);
    }

    #[test]
    fn test_camera_round_trip() {
        let mut camera = M2Camera {
            field_of_view: 0.7,
            far_clip: 27.7,
            near_clip: 0.22,
            position_base: C3Vector::new(3.0, 0.0, 1.5),
            ..M2Camera::default()
        };
        camera.positions = M2Track::new(M2InterpolationType::Hermite);
        camera.positions.push_sequence(
            vec![0, 2000],
            vec![
                M2SplineKey::default(),
                M2SplineKey {
                    value: C3Vector::new(0.0, 1.0, 0.0),
                    ..M2SplineKey::default()
                },
            ],
        );

        let mut blocks = BlockWriter::new(0, &[false]);
        let raw = blocks.records(std::slice::from_ref(&camera)).unwrap();
        let mut cursor = Cursor::new(blocks.finish().0.into_bytes());
        let decoded: Vec<M2Camera> = BlockReader::new(&mut cursor, Vec::new())
            .records(raw)
            .unwrap();
        assert_eq!(decoded, vec![camera]);
    }
}
