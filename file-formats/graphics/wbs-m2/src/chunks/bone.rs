use bitflags::bitflags;
use wbs_data::math::{C3Vector, Quaternion16};
use wbs_data::prelude::*;

use crate::block::{BlockReader, BlockWriter, M2Record};
use crate::error::Result;
use crate::track::{M2Track, M2TrackHeader};

bitflags! {
    /// Bone flags as defined in the M2 format
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct M2BoneFlags: u32 {
        const IGNORE_PARENT_TRANSLATE = 0x1;
        const IGNORE_PARENT_SCALE = 0x2;
        const IGNORE_PARENT_ROTATION = 0x4;
        /// Spherical billboard
        const SPHERICAL_BILLBOARD = 0x8;
        /// Cylindrical billboard lock X
        const CYLINDRICAL_BILLBOARD_LOCK_X = 0x10;
        /// Cylindrical billboard lock Y
        const CYLINDRICAL_BILLBOARD_LOCK_Y = 0x20;
        /// Cylindrical billboard lock Z
        const CYLINDRICAL_BILLBOARD_LOCK_Z = 0x40;
        /// Set when any of the transform tracks is animated
        const TRANSFORMED = 0x200;
        /// Kinematic bone (requires physics)
        const KINEMATIC_BONE = 0x400;
        const HELMET_ANIM_SCALED = 0x1000;
    }
}
wow_flags!(M2BoneFlags, u32);

wow_record! {
    /// On-disk compressed bone, 88 bytes
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct M2BoneHeader {
        pub key_bone_id: i32,
        pub flags: M2BoneFlags,
        pub parent_bone: i16,
        pub submesh_id: u16,
        pub bone_name_crc: u32,
        pub translation: M2TrackHeader<C3Vector>,
        pub rotation: M2TrackHeader<Quaternion16>,
        pub scale: M2TrackHeader<C3Vector>,
        pub pivot: C3Vector,
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct M2Bone {
    /// Key bone id, -1 for bones that are not key bones
    pub key_bone_id: i32,
    pub flags: M2BoneFlags,
    /// Index of the parent bone, -1 for roots
    pub parent_bone: i16,
    pub submesh_id: u16,
    pub bone_name_crc: u32,
    pub translation: M2Track<C3Vector>,
    pub rotation: M2Track<Quaternion16>,
    pub scale: M2Track<C3Vector>,
    pub pivot: C3Vector,
}

impl M2Bone {
    /// A static bone at `pivot`
    pub fn new(parent_bone: i16, pivot: C3Vector) -> Self {
        Self {
            key_bone_id: -1,
            parent_bone,
            pivot,
            ..Self::default()
        }
    }

    pub fn is_animated(&self) -> bool {
        self.translation.is_animated() || self.rotation.is_animated() || self.scale.is_animated()
    }
}

impl M2Record for M2Bone {
    type Raw = M2BoneHeader;

    fn resolve<R: Read + Seek>(raw: &Self::Raw, blocks: &mut BlockReader<'_, R>) -> Result<Self> {
        Ok(Self {
            key_bone_id: raw.key_bone_id,
            flags: raw.flags,
            parent_bone: raw.parent_bone,
            submesh_id: raw.submesh_id,
            bone_name_crc: raw.bone_name_crc,
            translation: blocks.track(&raw.translation)?,
            rotation: blocks.track(&raw.rotation)?,
            scale: blocks.track(&raw.scale)?,
            pivot: raw.pivot,
        })
    }

    fn store(&self, blocks: &mut BlockWriter) -> Result<Self::Raw> {
        let mut flags = self.flags;
        flags.set(M2BoneFlags::TRANSFORMED, self.is_animated());

        Ok(M2BoneHeader {
            key_bone_id: self.key_bone_id,
            flags,
            parent_bone: self.parent_bone,
            submesh_id: self.submesh_id,
            bone_name_crc: self.bone_name_crc,
            translation: blocks.track(&self.translation)?,
            rotation: blocks.track(&self.rotation)?,
            scale: blocks.track(&self.scale)?,
            pivot: self.pivot,
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
    fn test_bone_header_size() {
        assert_eq!(M2BoneHeader::SIZE, 88);
    }

    #[test]
    fn test_bone_round_trip_sets_transformed() {
        let mut bone = M2Bone::new(-1, C3Vector::new(0.0, 0.0, 1.0));
        bone.rotation = M2Track::new(M2InterpolationType::Linear);
        bone.rotation
            .push_sequence(vec![0, 1000], vec![Quaternion16::identity(); 2]);

        let mut blocks = BlockWriter::new(0, &[false]);
        let raw = blocks.records(std::slice::from_ref(&bone)).unwrap();
        let bytes = blocks.finish().0.into_bytes();

        let mut cursor = Cursor::new(bytes);
        let decoded: Vec<M2Bone> = BlockReader::new(&mut cursor, Vec::new())
            .records(raw)
            .unwrap();

        assert!(decoded[0].flags.contains(M2BoneFlags::TRANSFORMED));
        bone.flags |= M2BoneFlags::TRANSFORMED;
        assert_eq!(decoded, vec![bone]);
    }
}
