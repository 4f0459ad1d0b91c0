//! Group files: geometry, batches, collision tree and liquid of one group

use std::io::{Cursor, Read, Seek, SeekFrom, Write};

use log::{debug, trace};
use wbs_data::math::{BoundingBox, C2Vector, C3Vector, Color};
use wbs_data::prelude::{WowReader, WowStruct, WowWriter};

use crate::bsp::{BspOptions, BspTree};
use crate::chunk::{
    ChunkHeader, ChunkId, ChunkPatch, chunks, decode_records, read_chunk, read_chunk_payload,
    read_record_chunk, write_chunk, write_record_chunk,
};
use crate::error::{Result, WmoError};
use crate::wmo_group_types::{
    BspNode, LiquidCategory, LiquidVertices, MagmaVertex, WaterVertex, WmoBatch, WmoGroupFlags,
    WmoGroupHeader, WmoLiquid, WmoLiquidHeader, WmoPolyFlags, WmoPolyMaterial,
};
use crate::wmo_types::{DISABLED_MATERIAL, WMO_VERSION};

/// Largest vertex count a group can address with 16-bit indices
pub const MAX_GROUP_VERTICES: usize = u16::MAX as usize;

/// A decoded or assembled group file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WmoGroupFile {
    pub version: u32,
    pub header: WmoGroupHeader,
    /// `MOPY`, one per triangle
    pub poly_materials: Vec<WmoPolyMaterial>,
    /// `MOVI`
    pub indices: Vec<u16>,
    /// `MOVT`
    pub vertices: Vec<C3Vector>,
    /// `MONR`
    pub normals: Vec<C3Vector>,
    /// `MOTV`
    pub tex_coords: Vec<C2Vector>,
    /// `MOBA`
    pub batches: Vec<WmoBatch>,
    /// `MOLR`, indices into the root's lights
    pub light_refs: Vec<u16>,
    /// `MODR`, indices into the root's doodad definitions
    pub doodad_refs: Vec<u16>,
    /// `MOBN` and `MOBR`
    pub bsp: BspTree,
    /// `MOCV`
    pub vertex_colors: Vec<Color>,
    /// `MLIQ`
    pub liquid: Option<WmoLiquid>,
    /// Second `MOTV`
    pub tex_coords2: Vec<C2Vector>,
    /// Second `MOCV`
    pub vertex_colors2: Vec<Color>,
}

/// Header of the optional chunk announced by `flag`. The chunk must start
/// before `end`, the end of `MOGP`.
fn gated_header<R: Read + Seek>(
    reader: &mut R,
    end: u64,
    flag: WmoGroupFlags,
    id: ChunkId,
) -> Result<ChunkHeader> {
    if reader.stream_position()? + ChunkHeader::SIZE as u64 > end {
        return Err(WmoError::CorruptChunk {
            chunk: id,
            reason: format!("announced by group flag {flag:?} but missing"),
        });
    }

    let header = ChunkHeader::read(reader)?;
    if header.id != id {
        return Err(WmoError::CorruptChunk {
            chunk: id,
            reason: format!("announced by group flag {flag:?} but {} found instead", header.id),
        });
    }
    Ok(header)
}

/// Read an optional chunk announced by `flag`
fn read_gated<R: Read + Seek, T: WowStruct>(
    reader: &mut R,
    end: u64,
    flags: WmoGroupFlags,
    flag: WmoGroupFlags,
    id: ChunkId,
) -> Result<Vec<T>> {
    if !flags.contains(flag) {
        return Ok(Vec::new());
    }

    let header = gated_header(reader, end, flag, id)?;
    let data = read_chunk_payload(reader, &header)?;
    decode_records(&header, &data)
}

fn write_gated<W: Write, T: WowStruct>(
    writer: &mut W,
    flags: WmoGroupFlags,
    flag: WmoGroupFlags,
    id: ChunkId,
    records: &[T],
) -> Result<()> {
    if flags.contains(flag) {
        write_chunk(writer, id, records)?;
    } else if !records.is_empty() {
        return Err(WmoError::CorruptChunk {
            chunk: id,
            reason: format!("{} records present but group flag {flag:?} is not set", records.len()),
        });
    }
    Ok(())
}

impl WmoLiquid {
    /// Decode an `MLIQ` payload; the vertex layout follows from the group liquid id
    pub fn decode(data: &[u8], group_liquid: u32) -> Result<Self> {
        let mut cursor = Cursor::new(data);
        let header: WmoLiquidHeader = cursor.wow_read()?;

        let vertex_count = header.x_verts as usize * header.y_verts as usize;
        let tile_count = header.x_tiles as usize * header.y_tiles as usize;
        let expected = WmoLiquidHeader::SIZE + vertex_count * WaterVertex::SIZE + tile_count;
        if data.len() < expected {
            return Err(WmoError::CorruptChunk {
                chunk: chunks::MLIQ,
                reason: format!(
                    "{}x{} vertices and {}x{} tiles need {expected} bytes, chunk has {}",
                    header.x_verts,
                    header.y_verts,
                    header.x_tiles,
                    header.y_tiles,
                    data.len()
                ),
            });
        }

        let vertices = if LiquidCategory::from_liquid_id(group_liquid).has_texture_coords() {
            LiquidVertices::Magma(cursor.wow_read_vec::<MagmaVertex>(vertex_count)?)
        } else {
            LiquidVertices::Water(cursor.wow_read_vec::<WaterVertex>(vertex_count)?)
        };

        let mut tiles = vec![0_u8; tile_count];
        cursor.read_exact(&mut tiles)?;

        if data.len() > expected {
            trace!("Ignoring {} trailing MLIQ bytes", data.len() - expected);
        }

        Ok(Self {
            header,
            vertices,
            tiles,
        })
    }

    /// Check that the vertex layout is the one `group_liquid` selects on read
    /// and that the grids match the header
    pub fn check(&self, group_liquid: u32) -> Result<()> {
        let category = LiquidCategory::from_liquid_id(group_liquid);
        let magma = matches!(self.vertices, LiquidVertices::Magma(_));
        if magma != category.has_texture_coords() {
            return Err(WmoError::CorruptChunk {
                chunk: chunks::MLIQ,
                reason: format!(
                    "{} vertices in a group with liquid {group_liquid} ({category:?})",
                    if magma { "magma" } else { "water" }
                ),
            });
        }

        let vertex_count = self.header.x_verts as usize * self.header.y_verts as usize;
        let tile_count = self.header.x_tiles as usize * self.header.y_tiles as usize;
        if self.vertices.len() != vertex_count || self.tiles.len() != tile_count {
            return Err(WmoError::CorruptChunk {
                chunk: chunks::MLIQ,
                reason: format!(
                    "{} vertices and {} tiles for a {}x{} grid of {}x{} tiles",
                    self.vertices.len(),
                    self.tiles.len(),
                    self.header.x_verts,
                    self.header.y_verts,
                    self.header.x_tiles,
                    self.header.y_tiles
                ),
            });
        }
        Ok(())
    }

    pub fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.wow_write(&self.header)?;
        match &self.vertices {
            LiquidVertices::Water(vertices) => writer.wow_write_slice(vertices)?,
            LiquidVertices::Magma(vertices) => writer.wow_write_slice(vertices)?,
        }
        writer.write_all(&self.tiles)?;
        Ok(())
    }

    pub fn encoded_size(&self) -> usize {
        WmoLiquidHeader::SIZE + self.vertices.len() * WaterVertex::SIZE + self.tiles.len()
    }
}

impl WmoGroupFile {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Decode a group file
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let version: u32 = read_record_chunk(reader, chunks::MVER)?;
        if version != WMO_VERSION {
            return Err(WmoError::UnsupportedVersion(version));
        }

        let mogp = ChunkHeader::read(reader)?;
        if mogp.id != chunks::MOGP {
            return Err(WmoError::UnrecognizedFormat { found: mogp.id });
        }
        let mogp_end = reader.stream_position()? + u64::from(mogp.size);

        let header: WmoGroupHeader = reader.wow_read()?;
        let flags = header.flags;
        debug!("Reading group with flags {flags:?}");

        let poly_materials = read_chunk(reader, chunks::MOPY)?;
        let indices = read_chunk(reader, chunks::MOVI)?;
        let vertices = read_chunk(reader, chunks::MOVT)?;
        let normals = read_chunk(reader, chunks::MONR)?;
        let tex_coords = read_chunk(reader, chunks::MOTV)?;
        let batches = read_chunk(reader, chunks::MOBA)?;

        let light_refs =
            read_gated(reader, mogp_end, flags, WmoGroupFlags::HAS_LIGHTS, chunks::MOLR)?;
        let doodad_refs =
            read_gated(reader, mogp_end, flags, WmoGroupFlags::HAS_DOODADS, chunks::MODR)?;
        let bsp_nodes: Vec<BspNode> =
            read_gated(reader, mogp_end, flags, WmoGroupFlags::HAS_COLLISION, chunks::MOBN)?;
        let bsp_faces =
            read_gated(reader, mogp_end, flags, WmoGroupFlags::HAS_COLLISION, chunks::MOBR)?;
        let vertex_colors =
            read_gated(reader, mogp_end, flags, WmoGroupFlags::HAS_VERTEX_COLORS, chunks::MOCV)?;

        let liquid = if flags.contains(WmoGroupFlags::HAS_WATER) {
            let chunk = gated_header(reader, mogp_end, WmoGroupFlags::HAS_WATER, chunks::MLIQ)?;
            let data = read_chunk_payload(reader, &chunk)?;
            Some(WmoLiquid::decode(&data, header.group_liquid)?)
        } else {
            None
        };

        let tex_coords2 =
            read_gated(reader, mogp_end, flags, WmoGroupFlags::HAS_TWO_TEX_COORDS, chunks::MOTV)?;
        let vertex_colors2 = read_gated(
            reader,
            mogp_end,
            flags,
            WmoGroupFlags::HAS_TWO_VERTEX_COLORS,
            chunks::MOCV,
        )?;

        let position = reader.stream_position()?;
        if position < mogp_end {
            let extra = ChunkHeader::read(reader)?;
            return Err(WmoError::CorruptChunk {
                chunk: extra.id,
                reason: "present but not announced by the group flags".to_string(),
            });
        }
        if position > mogp_end {
            return Err(WmoError::CorruptChunk {
                chunk: chunks::MOGP,
                reason: format!(
                    "sub-chunks run {} bytes past the declared size",
                    position - mogp_end
                ),
            });
        }
        reader.seek(SeekFrom::Start(mogp_end))?;

        Ok(Self {
            version,
            header,
            poly_materials,
            indices,
            vertices,
            normals,
            tex_coords,
            batches,
            light_refs,
            doodad_refs,
            bsp: BspTree::new(bsp_nodes, bsp_faces),
            vertex_colors,
            liquid,
            tex_coords2,
            vertex_colors2,
        })
    }

    /// Encode the group. `MOGP`'s size is patched once its sub-chunks are written.
    pub fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        if self.vertices.len() > MAX_GROUP_VERTICES {
            return Err(WmoError::VertexLimitExceeded {
                count: self.vertices.len(),
            });
        }

        let flags = self.header.flags;
        match (&self.liquid, flags.contains(WmoGroupFlags::HAS_WATER)) {
            (Some(liquid), true) => liquid.check(self.header.group_liquid)?,
            (None, true) => {
                return Err(WmoError::CorruptChunk {
                    chunk: chunks::MLIQ,
                    reason: "HAS_WATER is set but the group has no liquid".to_string(),
                });
            }
            (Some(_), false) => {
                return Err(WmoError::CorruptChunk {
                    chunk: chunks::MLIQ,
                    reason: "liquid present but group flag HAS_WATER is not set".to_string(),
                });
            }
            (None, false) => {}
        }

        write_record_chunk(writer, chunks::MVER, &self.version)?;

        let mogp = ChunkPatch::begin(writer, chunks::MOGP)?;
        writer.wow_write(&self.header)?;

        write_chunk(writer, chunks::MOPY, &self.poly_materials)?;
        write_chunk(writer, chunks::MOVI, &self.indices)?;
        write_chunk(writer, chunks::MOVT, &self.vertices)?;
        write_chunk(writer, chunks::MONR, &self.normals)?;
        write_chunk(writer, chunks::MOTV, &self.tex_coords)?;
        write_chunk(writer, chunks::MOBA, &self.batches)?;

        write_gated(writer, flags, WmoGroupFlags::HAS_LIGHTS, chunks::MOLR, &self.light_refs)?;
        write_gated(writer, flags, WmoGroupFlags::HAS_DOODADS, chunks::MODR, &self.doodad_refs)?;
        write_gated(writer, flags, WmoGroupFlags::HAS_COLLISION, chunks::MOBN, &self.bsp.nodes)?;
        write_gated(writer, flags, WmoGroupFlags::HAS_COLLISION, chunks::MOBR, &self.bsp.faces)?;
        write_gated(
            writer,
            flags,
            WmoGroupFlags::HAS_VERTEX_COLORS,
            chunks::MOCV,
            &self.vertex_colors,
        )?;

        if let Some(liquid) = &self.liquid {
            ChunkHeader::new(chunks::MLIQ, liquid.encoded_size() as u32).write(writer)?;
            liquid.encode(writer)?;
        }

        write_gated(
            writer,
            flags,
            WmoGroupFlags::HAS_TWO_TEX_COORDS,
            chunks::MOTV,
            &self.tex_coords2,
        )?;
        write_gated(
            writer,
            flags,
            WmoGroupFlags::HAS_TWO_VERTEX_COLORS,
            chunks::MOCV,
            &self.vertex_colors2,
        )?;

        let size = mogp.finish(writer)?;
        trace!("Wrote MOGP ({size} bytes)");
        Ok(())
    }

    /// Encode into a byte vector
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Build a group from host mesh data.
    ///
    /// Triangles are sorted into batches by class then material, vertices are
    /// duplicated so that every batch owns a contiguous vertex range, and
    /// collision-only triangles (material `0xFF`) follow the last batch. The
    /// collision tree covers the collidable triangles and every gating flag is
    /// derived from the data present.
    pub fn from_mesh(
        mesh: &WmoGroupMesh,
        header: WmoGroupHeader,
        options: &BspOptions,
    ) -> Result<Self> {
        mesh.check()?;
        if let Some(liquid) = &mesh.liquid {
            liquid.check(header.group_liquid).map_err(|error| {
                WmoError::InvalidMesh(format!("liquid does not fit the group: {error}"))
            })?;
        }

        let mut order: Vec<usize> = (0..mesh.triangles.len())
            .filter(|&i| mesh.triangles[i].material_id != DISABLED_MATERIAL)
            .collect();
        order.sort_by_key(|&i| (mesh.triangles[i].batch_class, mesh.triangles[i].material_id));
        let collision_only: Vec<usize> = (0..mesh.triangles.len())
            .filter(|&i| mesh.triangles[i].material_id == DISABLED_MATERIAL)
            .collect();

        let mut group = Self {
            version: WMO_VERSION,
            header,
            light_refs: mesh.light_refs.clone(),
            doodad_refs: mesh.doodad_refs.clone(),
            liquid: mesh.liquid.clone(),
            ..Self::default()
        };
        group.header.trans_batch_count = 0;
        group.header.int_batch_count = 0;
        group.header.ext_batch_count = 0;

        let mut runs: Vec<(BatchClass, u8, Vec<usize>)> = Vec::new();
        for &i in &order {
            let triangle = &mesh.triangles[i];
            match runs.last_mut() {
                Some((class, material, members))
                    if *class == triangle.batch_class
                        && *material == triangle.material_id
                        && members.len() < MAX_BATCH_TRIANGLES =>
                {
                    members.push(i);
                }
                _ => runs.push((triangle.batch_class, triangle.material_id, vec![i])),
            }
        }

        for (class, material, members) in &runs {
            let start_index = group.indices.len();
            let (start_vertex, last_vertex) = group.append_triangles(mesh, members)?;
            let bounds = BoundingBox::from_points(
                group.vertices[start_vertex..=last_vertex].iter().copied(),
            )
            .unwrap_or_default();

            group.batches.push(WmoBatch {
                bounding_box: coarse_box(&bounds),
                start_index: start_index as u32,
                index_count: (group.indices.len() - start_index) as u16,
                start_vertex: start_vertex as u16,
                last_vertex: last_vertex as u16,
                flags: 0,
                material_id: *material,
            });
            match class {
                BatchClass::Transition => group.header.trans_batch_count += 1,
                BatchClass::Interior => group.header.int_batch_count += 1,
                BatchClass::Exterior => group.header.ext_batch_count += 1,
            }
        }

        if !collision_only.is_empty() {
            group.append_triangles(mesh, &collision_only)?;
        }

        if group.vertices.len() > MAX_GROUP_VERTICES {
            return Err(WmoError::VertexLimitExceeded {
                count: group.vertices.len(),
            });
        }

        group.header.bounding_box =
            BoundingBox::from_points(group.vertices.iter().copied()).unwrap_or_default();

        let collidable: Vec<u16> = group
            .poly_materials
            .iter()
            .enumerate()
            .filter(|(_, poly)| poly.is_collidable())
            .map(|(face, _)| face as u16)
            .collect();
        if !collidable.is_empty() {
            group.bsp =
                BspTree::build_with_faces(&group.vertices, &group.indices, collidable, options)?;
        }

        group.header.flags = derive_gating_flags(&group, header.flags);
        debug!(
            "Assembled group: {} vertices, {} triangles, {} batches, {} BSP nodes",
            group.vertices.len(),
            group.triangle_count(),
            group.batches.len(),
            group.bsp.nodes.len()
        );
        Ok(group)
    }

    /// Append triangles with a fresh vertex range; returns the inclusive range
    fn append_triangles(
        &mut self,
        mesh: &WmoGroupMesh,
        members: &[usize],
    ) -> Result<(usize, usize)> {
        let start_vertex = self.vertices.len();
        let mut remap = std::collections::HashMap::new();

        for &i in members {
            let triangle = &mesh.triangles[i];
            for &source in &triangle.indices {
                let source = usize::from(source);
                let next = self.vertices.len();
                let target = *remap.entry(source).or_insert(next);
                if target == next {
                    self.push_vertex(mesh, source);
                }
                let target = u16::try_from(target)
                    .map_err(|_| WmoError::VertexLimitExceeded { count: target + 1 })?;
                self.indices.push(target);
            }
            self.poly_materials.push(WmoPolyMaterial {
                flags: triangle.flags,
                material_id: triangle.material_id,
            });
        }

        Ok((start_vertex, self.vertices.len().saturating_sub(1).max(start_vertex)))
    }

    fn push_vertex(&mut self, mesh: &WmoGroupMesh, source: usize) {
        self.vertices.push(mesh.positions[source]);
        self.normals.push(mesh.normals[source]);
        self.tex_coords.push(mesh.tex_coords[source]);
        if let Some(uv2) = &mesh.tex_coords2 {
            self.tex_coords2.push(uv2[source]);
        }
        if let Some(colors) = &mesh.vertex_colors {
            self.vertex_colors.push(colors[source]);
        }
        if let Some(colors) = &mesh.vertex_colors2 {
            self.vertex_colors2.push(colors[source]);
        }
    }
}

/// `MOBA` index counts are 16-bit
const MAX_BATCH_TRIANGLES: usize = u16::MAX as usize / 3;

fn coarse_box(bounds: &BoundingBox) -> [i16; 6] {
    let lo = |v: f32| v.floor().clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16;
    let hi = |v: f32| v.ceil().clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16;
    [
        lo(bounds.min.x),
        lo(bounds.min.y),
        lo(bounds.min.z),
        hi(bounds.max.x),
        hi(bounds.max.y),
        hi(bounds.max.z),
    ]
}

/// Replace the gating bits of `base` with the ones implied by the group's data
pub fn derive_gating_flags(group: &WmoGroupFile, base: WmoGroupFlags) -> WmoGroupFlags {
    let mut flags = base.difference(WmoGroupFlags::GATING);
    flags.set(WmoGroupFlags::HAS_COLLISION, !group.bsp.nodes.is_empty());
    flags.set(WmoGroupFlags::HAS_VERTEX_COLORS, !group.vertex_colors.is_empty());
    flags.set(WmoGroupFlags::HAS_LIGHTS, !group.light_refs.is_empty());
    flags.set(WmoGroupFlags::HAS_DOODADS, !group.doodad_refs.is_empty());
    flags.set(WmoGroupFlags::HAS_WATER, group.liquid.is_some());
    flags.set(WmoGroupFlags::HAS_TWO_TEX_COORDS, !group.tex_coords2.is_empty());
    flags.set(WmoGroupFlags::HAS_TWO_VERTEX_COLORS, !group.vertex_colors2.is_empty());
    flags
}

/// Render pass a triangle is batched into; batches are ordered by class
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum BatchClass {
    Transition,
    Interior,
    #[default]
    Exterior,
}

/// A triangle as supplied by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeshTriangle {
    pub indices: [u16; 3],
    /// Root material index, `0xFF` for collision-only faces
    pub material_id: u8,
    pub flags: WmoPolyFlags,
    pub batch_class: BatchClass,
}

/// Plain mesh data handed over by the host for one group
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WmoGroupMesh {
    pub positions: Vec<C3Vector>,
    pub normals: Vec<C3Vector>,
    pub tex_coords: Vec<C2Vector>,
    pub tex_coords2: Option<Vec<C2Vector>>,
    pub vertex_colors: Option<Vec<Color>>,
    pub vertex_colors2: Option<Vec<Color>>,
    pub triangles: Vec<MeshTriangle>,
    pub light_refs: Vec<u16>,
    pub doodad_refs: Vec<u16>,
    pub liquid: Option<WmoLiquid>,
}

impl WmoGroupMesh {
    fn check(&self) -> Result<()> {
        let count = self.positions.len();
        let attribute = |name: &str, len: Option<usize>| -> Result<()> {
            match len {
                Some(len) if len != count => Err(WmoError::InvalidMesh(format!(
                    "{name} has {len} entries for {count} vertices"
                ))),
                _ => Ok(()),
            }
        };
        attribute("normals", Some(self.normals.len()))?;
        attribute("tex_coords", Some(self.tex_coords.len()))?;
        attribute("tex_coords2", self.tex_coords2.as_ref().map(Vec::len))?;
        attribute("vertex_colors", self.vertex_colors.as_ref().map(Vec::len))?;
        attribute("vertex_colors2", self.vertex_colors2.as_ref().map(Vec::len))?;

        if let Some((i, _)) = self
            .triangles
            .iter()
            .enumerate()
            .find(|(_, t)| t.indices.iter().any(|&v| usize::from(v) >= count))
        {
            return Err(WmoError::InvalidMesh(format!(
                "triangle {i} references a vertex past {count}"
            )));
        }
        Ok(())
    }
}
