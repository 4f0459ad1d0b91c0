use bitflags::bitflags;
use wbs_data::math::{BoundingSphere, C3Vector};
use wbs_data::prelude::*;

use crate::chunks::{
    M2AttachmentHeader, M2BoneHeader, M2CameraHeader, M2ColorHeader, M2EventHeader,
    M2LightHeader, M2Material, M2ParticleEmitterHeader, M2RibbonEmitterHeader, M2Sequence,
    M2TextureHeader, M2TextureTransformHeader, M2Vertex,
};
use crate::error::{M2Error, Result};
use crate::track::M2TrackHeader;

/// Magic signature for M2 files ("MD20")
pub const M2_MAGIC: [u8; 4] = *b"MD20";

/// Wrath of the Lich King model version
pub const M2_VERSION: u32 = 264;

/// Header size without the texture combiner combos block
pub const HEADER_SIZE: usize = 304;

bitflags! {
    /// Model flags as defined in the M2 format
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct M2ModelFlags: u32 {
        /// Tilt on X axis
        const TILT_X = 0x0001;
        /// Tilt on Y axis
        const TILT_Y = 0x0002;
        /// Add a back-reference to the model
        const ADD_BACK_REFERENCE = 0x0004;
        /// Use texture combiners; adds the combos block to the header
        const USE_TEXTURE_COMBINERS = 0x0008;
        /// Is it a camera?
        const IS_CAMERA = 0x0010;
        /// Unused flag
        const UNUSED = 0x0020;
        /// No particle trails
        const NO_PARTICLE_TRAILS = 0x0040;
        /// Unknown
        const UNKNOWN_0x80 = 0x0080;
    }
}
wow_flags!(M2ModelFlags, u32);

/// The `MD20` header: every block of the model as a `(count, offset)` pair
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct M2Header {
    pub version: u32,
    pub name: WowArray<u8>,
    pub flags: M2ModelFlags,
    pub global_loops: WowArray<u32>,
    pub sequences: WowArray<M2Sequence>,
    pub sequence_lookup: WowArray<i16>,
    pub bones: WowArray<M2BoneHeader>,
    pub key_bone_lookup: WowArray<i16>,
    pub vertices: WowArray<M2Vertex>,
    pub skin_profile_count: u32,
    pub colors: WowArray<M2ColorHeader>,
    pub textures: WowArray<M2TextureHeader>,
    pub texture_weights: WowArray<M2TrackHeader<i16>>,
    pub texture_transforms: WowArray<M2TextureTransformHeader>,
    pub replaceable_texture_lookup: WowArray<i16>,
    pub materials: WowArray<M2Material>,
    pub bone_lookup: WowArray<u16>,
    pub texture_lookup: WowArray<u16>,
    pub texture_unit_lookup: WowArray<i16>,
    pub transparency_lookup: WowArray<u16>,
    pub texture_transform_lookup: WowArray<i16>,
    pub bounds: BoundingSphere,
    pub collision_bounds: BoundingSphere,
    pub collision_indices: WowArray<u16>,
    pub collision_vertices: WowArray<C3Vector>,
    pub collision_normals: WowArray<C3Vector>,
    pub attachments: WowArray<M2AttachmentHeader>,
    pub attachment_lookup: WowArray<i16>,
    pub events: WowArray<M2EventHeader>,
    pub lights: WowArray<M2LightHeader>,
    pub cameras: WowArray<M2CameraHeader>,
    pub camera_lookup: WowArray<i16>,
    pub ribbon_emitters: WowArray<M2RibbonEmitterHeader>,
    pub particle_emitters: WowArray<M2ParticleEmitterHeader>,
    /// Only present with [`M2ModelFlags::USE_TEXTURE_COMBINERS`]
    pub texture_combiner_combos: WowArray<u16>,
}

impl M2Header {
    /// Parse the header, checking magic and version
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let magic: [u8; 4] = reader.wow_read()?;
        if magic != M2_MAGIC {
            return Err(M2Error::InvalidMagic {
                expected: M2_MAGIC,
                actual: magic,
            });
        }

        let version: u32 = reader.wow_read()?;
        if version != M2_VERSION {
            return Err(M2Error::UnsupportedVersion(version));
        }

        let name = reader.wow_read()?;
        let flags: M2ModelFlags = reader.wow_read()?;

        let mut header = Self {
            version,
            name,
            flags,
            global_loops: reader.wow_read()?,
            sequences: reader.wow_read()?,
            sequence_lookup: reader.wow_read()?,
            bones: reader.wow_read()?,
            key_bone_lookup: reader.wow_read()?,
            vertices: reader.wow_read()?,
            skin_profile_count: reader.wow_read()?,
            colors: reader.wow_read()?,
            textures: reader.wow_read()?,
            texture_weights: reader.wow_read()?,
            texture_transforms: reader.wow_read()?,
            replaceable_texture_lookup: reader.wow_read()?,
            materials: reader.wow_read()?,
            bone_lookup: reader.wow_read()?,
            texture_lookup: reader.wow_read()?,
            texture_unit_lookup: reader.wow_read()?,
            transparency_lookup: reader.wow_read()?,
            texture_transform_lookup: reader.wow_read()?,
            bounds: reader.wow_read()?,
            collision_bounds: reader.wow_read()?,
            collision_indices: reader.wow_read()?,
            collision_vertices: reader.wow_read()?,
            collision_normals: reader.wow_read()?,
            attachments: reader.wow_read()?,
            attachment_lookup: reader.wow_read()?,
            events: reader.wow_read()?,
            lights: reader.wow_read()?,
            cameras: reader.wow_read()?,
            camera_lookup: reader.wow_read()?,
            ribbon_emitters: reader.wow_read()?,
            particle_emitters: reader.wow_read()?,
            texture_combiner_combos: WowArray::default(),
        };

        if flags.contains(M2ModelFlags::USE_TEXTURE_COMBINERS) {
            header.texture_combiner_combos = reader.wow_read()?;
        }

        Ok(header)
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.wow_write(&M2_MAGIC)?;
        writer.wow_write(&self.version)?;
        writer.wow_write(&self.name)?;
        writer.wow_write(&self.flags)?;
        writer.wow_write(&self.global_loops)?;
        writer.wow_write(&self.sequences)?;
        writer.wow_write(&self.sequence_lookup)?;
        writer.wow_write(&self.bones)?;
        writer.wow_write(&self.key_bone_lookup)?;
        writer.wow_write(&self.vertices)?;
        writer.wow_write(&self.skin_profile_count)?;
        writer.wow_write(&self.colors)?;
        writer.wow_write(&self.textures)?;
        writer.wow_write(&self.texture_weights)?;
        writer.wow_write(&self.texture_transforms)?;
        writer.wow_write(&self.replaceable_texture_lookup)?;
        writer.wow_write(&self.materials)?;
        writer.wow_write(&self.bone_lookup)?;
        writer.wow_write(&self.texture_lookup)?;
        writer.wow_write(&self.texture_unit_lookup)?;
        writer.wow_write(&self.transparency_lookup)?;
        writer.wow_write(&self.texture_transform_lookup)?;
        writer.wow_write(&self.bounds)?;
        writer.wow_write(&self.collision_bounds)?;
        writer.wow_write(&self.collision_indices)?;
        writer.wow_write(&self.collision_vertices)?;
        writer.wow_write(&self.collision_normals)?;
        writer.wow_write(&self.attachments)?;
        writer.wow_write(&self.attachment_lookup)?;
        writer.wow_write(&self.events)?;
        writer.wow_write(&self.lights)?;
        writer.wow_write(&self.cameras)?;
        writer.wow_write(&self.camera_lookup)?;
        writer.wow_write(&self.ribbon_emitters)?;
        writer.wow_write(&self.particle_emitters)?;

        if self.flags.contains(M2ModelFlags::USE_TEXTURE_COMBINERS) {
            writer.wow_write(&self.texture_combiner_combos)?;
        }

        Ok(())
    }

    /// Serialized size, which depends on the flags
    pub fn size(flags: M2ModelFlags) -> usize {
        if flags.contains(M2ModelFlags::USE_TEXTURE_COMBINERS) {
            HEADER_SIZE + 8
        } else {
            HEADER_SIZE
        }
    }
}
