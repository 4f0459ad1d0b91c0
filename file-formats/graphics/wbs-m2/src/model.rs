use log::{debug, warn};
use wbs_data::math::{BoundingBox, BoundingSphere, C3Vector};
use wbs_data::prelude::*;

use crate::anim::{AnimFile, AnimFileProvider, M2WriteOptions};
use crate::block::{BlockReader, BlockWriter, TrackSource};
use crate::chunks::{
    M2Attachment, M2Bone, M2Camera, M2Color, M2Event, M2Light, M2Material, M2ParticleEmitter,
    M2RibbonEmitter, M2Sequence, M2SequenceFlags, M2Texture, M2TextureFlags, M2TextureTransform,
    M2TextureType, M2TextureWeight, M2Vertex,
};
use crate::data_section::read_string;
use crate::error::Result;
use crate::header::{M2_VERSION, M2Header, M2ModelFlags};

/// A decoded WotLK M2 model.
///
/// All blocks are held decoded; offsets and counts are recomputed on write.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct M2Model {
    pub name: String,
    pub flags: M2ModelFlags,
    /// Durations of the global loops in milliseconds
    pub global_loops: Vec<u32>,
    pub sequences: Vec<M2Sequence>,
    pub sequence_lookup: Vec<i16>,
    pub bones: Vec<M2Bone>,
    pub key_bone_lookup: Vec<i16>,
    pub vertices: Vec<M2Vertex>,
    /// Number of `.skin` files that belong to the model
    pub skin_profile_count: u32,
    pub colors: Vec<M2Color>,
    pub textures: Vec<M2Texture>,
    pub texture_weights: Vec<M2TextureWeight>,
    pub texture_transforms: Vec<M2TextureTransform>,
    pub replaceable_texture_lookup: Vec<i16>,
    pub materials: Vec<M2Material>,
    pub bone_lookup: Vec<u16>,
    pub texture_lookup: Vec<u16>,
    pub texture_unit_lookup: Vec<i16>,
    pub transparency_lookup: Vec<u16>,
    pub texture_transform_lookup: Vec<i16>,
    pub bounds: BoundingSphere,
    pub collision_bounds: BoundingSphere,
    pub collision_indices: Vec<u16>,
    pub collision_vertices: Vec<C3Vector>,
    pub collision_normals: Vec<C3Vector>,
    pub attachments: Vec<M2Attachment>,
    pub attachment_lookup: Vec<i16>,
    pub events: Vec<M2Event>,
    pub lights: Vec<M2Light>,
    pub cameras: Vec<M2Camera>,
    pub camera_lookup: Vec<i16>,
    pub ribbon_emitters: Vec<M2RibbonEmitter>,
    pub particle_emitters: Vec<M2ParticleEmitter>,
    /// Only written with [`M2ModelFlags::USE_TEXTURE_COMBINERS`]
    pub texture_combiner_combos: Vec<u16>,
}

impl M2Model {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Read a model. Keys of sequences stored in `.anim` files are loaded
    /// through `anims`.
    pub fn read<R, P>(reader: &mut R, anims: &P) -> Result<Self>
    where
        R: Read + Seek,
        P: AnimFileProvider + ?Sized,
    {
        let header = M2Header::read(reader)?;
        debug!(
            "M2 header: {} sequences, {} bones, {} vertices, {} skin profiles",
            header.sequences.count,
            header.bones.count,
            header.vertices.count,
            header.skin_profile_count
        );

        let name = read_string(reader, header.name)?;
        let sequences = header.sequences.wow_read_to_vec(reader)?;
        let sources = sequences
            .iter()
            .map(|sequence| track_source(sequence, anims))
            .collect::<Result<Vec<_>>>()?;

        let mut blocks = BlockReader::new(reader, sources);
        Ok(Self {
            name,
            flags: header.flags,
            global_loops: blocks.array(header.global_loops)?,
            sequences,
            sequence_lookup: blocks.array(header.sequence_lookup)?,
            bones: blocks.records(header.bones)?,
            key_bone_lookup: blocks.array(header.key_bone_lookup)?,
            vertices: blocks.array(header.vertices)?,
            skin_profile_count: header.skin_profile_count,
            colors: blocks.records(header.colors)?,
            textures: blocks.records(header.textures)?,
            texture_weights: blocks.records(header.texture_weights)?,
            texture_transforms: blocks.records(header.texture_transforms)?,
            replaceable_texture_lookup: blocks.array(header.replaceable_texture_lookup)?,
            materials: blocks.array(header.materials)?,
            bone_lookup: blocks.array(header.bone_lookup)?,
            texture_lookup: blocks.array(header.texture_lookup)?,
            texture_unit_lookup: blocks.array(header.texture_unit_lookup)?,
            transparency_lookup: blocks.array(header.transparency_lookup)?,
            texture_transform_lookup: blocks.array(header.texture_transform_lookup)?,
            bounds: header.bounds,
            collision_bounds: header.collision_bounds,
            collision_indices: blocks.array(header.collision_indices)?,
            collision_vertices: blocks.array(header.collision_vertices)?,
            collision_normals: blocks.array(header.collision_normals)?,
            attachments: blocks.records(header.attachments)?,
            attachment_lookup: blocks.array(header.attachment_lookup)?,
            events: blocks.records(header.events)?,
            lights: blocks.records(header.lights)?,
            cameras: blocks.records(header.cameras)?,
            camera_lookup: blocks.array(header.camera_lookup)?,
            ribbon_emitters: blocks.records(header.ribbon_emitters)?,
            particle_emitters: blocks.records(header.particle_emitters)?,
            texture_combiner_combos: blocks.array(header.texture_combiner_combos)?,
        })
    }

    /// The sequences as written: without anim splitting every sequence that
    /// is not an alias is embedded
    fn written_sequences(&self, options: &M2WriteOptions) -> Vec<M2Sequence> {
        let mut sequences = self.sequences.clone();
        if !options.split_anims {
            for sequence in sequences.iter_mut().filter(|sequence| !sequence.is_alias()) {
                sequence.flags |= M2SequenceFlags::EMBEDDED;
            }
        }
        sequences
    }

    /// Write the model in two passes: every block goes to a data section
    /// first, then the header with the final offsets is written followed by
    /// that section.
    ///
    /// Returns the `.anim` files of the external sequences, which is empty
    /// unless `options.split_anims` is set.
    pub fn write<W: Write>(
        &self,
        writer: &mut W,
        options: &M2WriteOptions,
    ) -> Result<Vec<AnimFile>> {
        let sequences = self.written_sequences(options);
        let external: Vec<bool> = sequences.iter().map(M2Sequence::is_external).collect();

        let mut header = M2Header {
            version: M2_VERSION,
            flags: self.flags,
            skin_profile_count: self.skin_profile_count,
            bounds: self.bounds,
            collision_bounds: self.collision_bounds,
            ..M2Header::default()
        };

        let mut blocks = BlockWriter::new(M2Header::size(self.flags), &external);
        header.name = blocks.data.push_str(&self.name)?;
        header.global_loops = blocks.data.push_slice(&self.global_loops)?;
        header.sequences = blocks.data.push_slice(&sequences)?;
        header.sequence_lookup = blocks.data.push_slice(&self.sequence_lookup)?;
        header.bones = blocks.records(&self.bones)?;
        header.key_bone_lookup = blocks.data.push_slice(&self.key_bone_lookup)?;
        header.vertices = blocks.data.push_slice(&self.vertices)?;
        header.colors = blocks.records(&self.colors)?;
        header.textures = blocks.records(&self.textures)?;
        header.texture_weights = blocks.records(&self.texture_weights)?;
        header.texture_transforms = blocks.records(&self.texture_transforms)?;
        header.replaceable_texture_lookup =
            blocks.data.push_slice(&self.replaceable_texture_lookup)?;
        header.materials = blocks.data.push_slice(&self.materials)?;
        header.bone_lookup = blocks.data.push_slice(&self.bone_lookup)?;
        header.texture_lookup = blocks.data.push_slice(&self.texture_lookup)?;
        header.texture_unit_lookup = blocks.data.push_slice(&self.texture_unit_lookup)?;
        header.transparency_lookup = blocks.data.push_slice(&self.transparency_lookup)?;
        header.texture_transform_lookup =
            blocks.data.push_slice(&self.texture_transform_lookup)?;
        header.collision_indices = blocks.data.push_slice(&self.collision_indices)?;
        header.collision_vertices = blocks.data.push_slice(&self.collision_vertices)?;
        header.collision_normals = blocks.data.push_slice(&self.collision_normals)?;
        header.attachments = blocks.records(&self.attachments)?;
        header.attachment_lookup = blocks.data.push_slice(&self.attachment_lookup)?;
        header.events = blocks.records(&self.events)?;
        header.lights = blocks.records(&self.lights)?;
        header.cameras = blocks.records(&self.cameras)?;
        header.camera_lookup = blocks.data.push_slice(&self.camera_lookup)?;
        header.ribbon_emitters = blocks.records(&self.ribbon_emitters)?;
        header.particle_emitters = blocks.records(&self.particle_emitters)?;

        if self.flags.contains(M2ModelFlags::USE_TEXTURE_COMBINERS) {
            header.texture_combiner_combos =
                blocks.data.push_slice(&self.texture_combiner_combos)?;
        } else if !self.texture_combiner_combos.is_empty() {
            warn!(
                "Dropping {} texture combiner combos: USE_TEXTURE_COMBINERS is not set",
                self.texture_combiner_combos.len()
            );
        }

        let (data, anims) = blocks.finish();
        header.write(writer)?;
        writer.write_all(&data.into_bytes())?;

        Ok(anims
            .into_iter()
            .zip(&sequences)
            .enumerate()
            .filter_map(|(sequence_index, (section, sequence))| {
                section.map(|section| AnimFile {
                    sequence_index,
                    id: sequence.id,
                    variation: sequence.variation_index,
                    data: section.into_bytes(),
                })
            })
            .collect())
    }

    /// Serialize with every sequence embedded
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        self.write(&mut data, &M2WriteOptions::default())?;
        Ok(data)
    }

    /// Index of the texture with these properties, added if not present
    pub fn add_texture(
        &mut self,
        filename: &str,
        texture_type: M2TextureType,
        flags: M2TextureFlags,
    ) -> usize {
        if let Some(index) = self.textures.iter().position(|texture| {
            texture.texture_type == texture_type
                && texture.flags == flags
                && texture.filename == filename
        }) {
            return index;
        }

        self.textures.push(M2Texture {
            texture_type,
            flags,
            filename: filename.to_string(),
        });
        self.textures.len() - 1
    }

    /// Recompute the bounding and collision volumes from the vertices.
    ///
    /// Sequences without bounds get the model's bounding volume.
    pub fn compute_bounds(&mut self) {
        self.bounds = volume_of(self.vertices.iter().map(|vertex| vertex.position));
        self.collision_bounds = volume_of(self.collision_vertices.iter().copied());

        for sequence in &mut self.sequences {
            if sequence.bounds == BoundingSphere::default() {
                sequence.bounds = self.bounds;
            }
        }
    }
}

fn volume_of<I: IntoIterator<Item = C3Vector>>(points: I) -> BoundingSphere {
    BoundingBox::from_points(points)
        .map_or_else(BoundingSphere::default, BoundingSphere::from_box)
}

fn track_source<P: AnimFileProvider + ?Sized>(
    sequence: &M2Sequence,
    anims: &P,
) -> Result<TrackSource> {
    if !sequence.is_external() {
        return Ok(TrackSource::Model);
    }

    match anims.load_anim(sequence.id, sequence.variation_index)? {
        Some(data) => Ok(TrackSource::Anim(data)),
        None => {
            warn!(
                "Keys of sequence {}-{} are in an .anim file that was not provided",
                sequence.id, sequence.variation_index
            );
            Ok(TrackSource::Unavailable)
        }
    }
}
