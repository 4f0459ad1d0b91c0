use std::path::{Path, PathBuf};

use wbs_data::math::{BoundingBox, C3Vector};
use wbs_data::prelude::*;

use crate::chunks::M2Vertex;
use crate::data_section::DataSection;
use crate::error::{M2Error, Result};

/// Magic signature for skin files ("SKIN")
pub const SKIN_MAGIC: [u8; 4] = *b"SKIN";

pub const SKIN_HEADER_SIZE: usize = 48;

/// Path of skin profile `index` of `model`
pub fn skin_filename(model: impl AsRef<Path>, index: usize) -> PathBuf {
    let model = model.as_ref();
    let stem = model
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    model.with_file_name(format!("{stem}{index:02}.skin"))
}

wow_record! {
    /// A contiguous range of vertices and triangle indices, 48 bytes
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct SkinSubmesh {
        /// Mesh part id, `geoset group * 100 + variation`
        pub id: u16,
        /// Carries the upper bits of `index_start` on very large skins
        pub level: u16,
        pub vertex_start: u16,
        pub vertex_count: u16,
        pub index_start: u16,
        pub index_count: u16,
        pub bone_count: u16,
        pub bone_combo_index: u16,
        /// Largest number of non-zero weights per vertex
        pub bone_influences: u16,
        pub center_bone_index: u16,
        pub center_position: C3Vector,
        pub sort_center_position: C3Vector,
        pub sort_radius: f32,
    }
}

wow_record! {
    /// A draw call binding a submesh to a material and textures, 24 bytes
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SkinTextureUnit {
        pub flags: u8,
        pub priority_plane: i8,
        pub shader_id: u16,
        pub submesh_index: u16,
        pub geoset_index: u16,
        /// Index into the model colours, -1 for none
        pub color_index: i16,
        pub material_index: u16,
        pub material_layer: u16,
        pub texture_count: u16,
        pub texture_combo_index: u16,
        pub texture_coord_combo_index: u16,
        pub texture_weight_combo_index: u16,
        pub texture_transform_combo_index: u16,
    }
}

wow_record! {
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct SkinHeader {
        pub vertices: WowArray<u16>,
        pub indices: WowArray<u16>,
        pub bones: WowArray<[u8; 4]>,
        pub submeshes: WowArray<SkinSubmesh>,
        pub texture_units: WowArray<SkinTextureUnit>,
        pub bone_count_max: u32,
    }
}

/// A skin profile: how the model's vertices are split into draw calls
#[derive(Debug, Clone, PartialEq, Default)]
pub struct M2Skin {
    /// Model vertex index of every skin vertex
    pub vertex_lookup: Vec<u16>,
    /// Triangle list over skin vertices
    pub indices: Vec<u16>,
    /// Bone indices of every skin vertex
    pub bones: Vec<[u8; 4]>,
    pub submeshes: Vec<SkinSubmesh>,
    pub texture_units: Vec<SkinTextureUnit>,
    pub bone_count_max: u32,
}

impl M2Skin {
    pub fn new() -> Self {
        Self {
            bone_count_max: 21,
            ..Self::default()
        }
    }

    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let magic: [u8; 4] = reader.wow_read()?;
        if magic != SKIN_MAGIC {
            return Err(M2Error::InvalidMagic {
                expected: SKIN_MAGIC,
                actual: magic,
            });
        }

        let header: SkinHeader = reader.wow_read()?;
        Ok(Self {
            vertex_lookup: header.vertices.wow_read_to_vec(reader)?,
            indices: header.indices.wow_read_to_vec(reader)?,
            bones: header.bones.wow_read_to_vec(reader)?,
            submeshes: header.submeshes.wow_read_to_vec(reader)?,
            texture_units: header.texture_units.wow_read_to_vec(reader)?,
            bone_count_max: header.bone_count_max,
        })
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut data = DataSection::new(SKIN_HEADER_SIZE);
        let header = SkinHeader {
            vertices: data.push_slice(&self.vertex_lookup)?,
            indices: data.push_slice(&self.indices)?,
            bones: data.push_slice(&self.bones)?,
            submeshes: data.push_slice(&self.submeshes)?,
            texture_units: data.push_slice(&self.texture_units)?,
            bone_count_max: self.bone_count_max,
        };

        writer.wow_write(&SKIN_MAGIC)?;
        writer.wow_write(&header)?;
        writer.write_all(&data.into_bytes())?;
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        self.write(&mut data)?;
        Ok(data)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Append a submesh.
    ///
    /// `vertices` are model vertex indices and `triangles` index into
    /// `vertices`. The submesh's placement, bone data and sort volume are
    /// computed from `model_vertices`. Returns the submesh index.
    pub fn push_submesh(
        &mut self,
        id: u16,
        vertices: &[u16],
        triangles: &[u16],
        model_vertices: &[M2Vertex],
    ) -> Result<usize> {
        let corrupt = |reason: String| M2Error::CorruptBlock {
            block: "skin submesh",
            reason,
        };

        if triangles.len() % 3 != 0 {
            return Err(corrupt(format!(
                "{} indices do not form whole triangles",
                triangles.len()
            )));
        }
        if let Some(&bad) = triangles.iter().find(|&&i| usize::from(i) >= vertices.len()) {
            return Err(corrupt(format!(
                "triangle index {bad} outside {} submesh vertices",
                vertices.len()
            )));
        }
        let mut positions = Vec::with_capacity(vertices.len());
        let mut influences = 0_u16;
        for &vertex in vertices {
            let vertex = model_vertices.get(usize::from(vertex)).ok_or_else(|| {
                corrupt(format!(
                    "vertex {vertex} outside {} model vertices",
                    model_vertices.len()
                ))
            })?;
            positions.push(vertex.position.to_glam());
            let weights = vertex.bone_weights.iter().filter(|&&w| w > 0).count() as u16;
            influences = influences.max(weights);
        }

        let vertex_start = self.vertex_lookup.len();
        let index_start = self.indices.len();
        let vertex_end = vertex_start + vertices.len();
        let index_end = index_start + triangles.len();
        if vertex_end > usize::from(u16::MAX) + 1 || index_end > usize::from(u16::MAX) + 1 {
            return Err(corrupt(format!(
                "skin would hold {vertex_end} vertices and {index_end} indices (at most 65536)"
            )));
        }

        let bounds = BoundingBox::from_points(positions.iter().copied());
        let (center, sort_center, sort_radius) = match bounds {
            Some(bounds) => {
                let center = positions.iter().sum::<glam::Vec3>() / positions.len() as f32;
                let sort_center = bounds.center();
                let radius = positions
                    .iter()
                    .map(|p| p.distance(sort_center))
                    .fold(0.0_f32, f32::max);
                (center, sort_center, radius)
            }
            None => (glam::Vec3::ZERO, glam::Vec3::ZERO, 0.0),
        };

        self.vertex_lookup.extend_from_slice(vertices);
        self.bones.extend(
            vertices
                .iter()
                .map(|&v| model_vertices[usize::from(v)].bone_indices),
        );
        self.indices
            .extend(triangles.iter().map(|&i| i + vertex_start as u16));

        self.submeshes.push(SkinSubmesh {
            id,
            vertex_start: vertex_start as u16,
            vertex_count: vertices.len() as u16,
            index_start: index_start as u16,
            index_count: triangles.len() as u16,
            bone_influences: influences,
            center_position: center.into(),
            sort_center_position: sort_center.into(),
            sort_radius,
            ..SkinSubmesh::default()
        });
        Ok(self.submeshes.len() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use wbs_data::math::C2Vector;

    fn quad_vertices() -> Vec<M2Vertex> {
        [[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [2.0, 2.0, 0.0], [0.0, 2.0, 0.0]]
            .into_iter()
            .map(|p| {
                M2Vertex::rigid(
                    p.into(),
                    C3Vector::new(0.0, 0.0, 1.0),
                    C2Vector::default(),
                    1,
                )
            })
            .collect()
    }

    #[test]
    fn test_record_sizes() {
        assert_eq!(SkinSubmesh::SIZE, 48);
        assert_eq!(SkinTextureUnit::SIZE, 24);
        assert_eq!(SkinHeader::SIZE + 4, SKIN_HEADER_SIZE);
    }

    #[test]
    fn test_skin_filename() {
        assert_eq!(
            skin_filename("Creature/Kobold/Kobold.m2", 0),
            PathBuf::from("Creature/Kobold/Kobold00.skin")
        );
        assert_eq!(skin_filename("Wolf.m2", 3), PathBuf::from("Wolf03.skin"));
    }

    #[test]
    fn test_push_submesh() {
        let vertices = quad_vertices();
        let mut skin = M2Skin::new();
        skin.push_submesh(0, &[0, 1, 2], &[0, 1, 2], &vertices).unwrap();
        let second = skin
            .push_submesh(1, &[0, 2, 3], &[0, 1, 2], &vertices)
            .unwrap();

        assert_eq!(second, 1);
        assert_eq!(skin.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(skin.vertex_lookup, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(skin.bones, vec![[1, 0, 0, 0]; 6]);

        let submesh = skin.submeshes[1];
        assert_eq!((submesh.vertex_start, submesh.vertex_count), (3, 3));
        assert_eq!((submesh.index_start, submesh.index_count), (3, 3));
        assert_eq!(submesh.bone_influences, 1);
        assert_eq!(submesh.sort_center_position, C3Vector::new(1.0, 1.0, 0.0));
        assert_eq!(submesh.sort_radius, 2.0_f32.sqrt());
    }

    #[test]
    fn test_push_submesh_rejects_bad_indices() {
        let vertices = quad_vertices();
        let mut skin = M2Skin::new();
        assert!(skin.push_submesh(0, &[0, 1], &[0, 1, 2], &vertices).is_err());
        assert!(skin.push_submesh(0, &[0, 9, 1], &[0, 1, 2], &vertices).is_err());
        assert!(skin.push_submesh(0, &[0, 1, 2], &[0, 1], &vertices).is_err());
        assert_eq!(skin, M2Skin::new());
    }

    #[test]
    fn test_skin_round_trip() {
        let vertices = quad_vertices();
        let mut skin = M2Skin::new();
        skin.push_submesh(0, &[0, 1, 2, 3], &[0, 1, 2, 0, 2, 3], &vertices)
            .unwrap();
        skin.texture_units.push(SkinTextureUnit {
            color_index: -1,
            texture_count: 1,
            ..SkinTextureUnit::default()
        });

        let bytes = skin.to_bytes().unwrap();
        assert_eq!(&bytes[..4], b"SKIN");
        let decoded = M2Skin::read(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(decoded, skin);
        assert_eq!(decoded.triangle_count(), 2);
    }

    #[test]
    fn test_bad_skin_magic() {
        let bytes = vec![0_u8; SKIN_HEADER_SIZE];
        assert!(matches!(
            M2Skin::read(&mut Cursor::new(bytes)),
            Err(M2Error::InvalidMagic { .. })
        ));
    }
}
