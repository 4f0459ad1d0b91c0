//! Root file: materials, group directory, portals, lights, doodads and fog

use std::borrow::Cow;
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek, SeekFrom, Write};

use log::{debug, trace, warn};
use wbs_data::math::{BoundingBox, C3Vector, Plane};

use crate::chunk::{
    ChunkHeader, chunks, decode_records, read_chunk, read_chunk_payload, read_raw_chunk,
    read_record_chunk, write_chunk, write_raw_chunk, write_record_chunk,
};
use crate::error::{Result, WmoError};
use crate::group::WmoGroupFile;
use crate::string_table::StringTable;
use crate::wmo_group_types::{WmoGroupFlags, WmoGroupHeader};
use crate::wmo_types::{
    DEFAULT_DOODAD_SET, DISABLED_MATERIAL, WMO_VERSION, WmoDoodadDef, WmoDoodadPlacement,
    WmoDoodadSet, WmoFog, WmoGroupInfo, WmoHeader, WmoLight, WmoMaterial, WmoMaterialDefinition,
    WmoPortal, WmoPortalRef, WmoVisibleBatch,
};

/// Materials are addressed by `u8` and `0xFF` is reserved
pub const MAX_MATERIALS: usize = DISABLED_MATERIAL as usize;

/// A decoded or accumulated root file.
///
/// A root is either read from disk or built up through the `add_*` methods
/// and completed with [`WmoRootFile::finalize`] once its groups are known.
/// The de-duplication maps behind `add_texture`, `add_material` and
/// `add_doodad_set` are rebuilt after a read, so a decoded root can be
/// extended further.
#[derive(Debug, Clone)]
pub struct WmoRootFile {
    pub version: u32,
    pub header: WmoHeader,
    /// `MOTX`
    pub textures: StringTable,
    /// `MOMT`
    pub materials: Vec<WmoMaterial>,
    /// `MOGN`
    pub group_names: StringTable,
    /// `MOGI`
    pub group_infos: Vec<WmoGroupInfo>,
    /// `MOSB`
    pub skybox: Option<String>,
    /// `MOPV`
    pub portal_vertices: Vec<C3Vector>,
    /// `MOPT`
    pub portals: Vec<WmoPortal>,
    /// `MOPR`
    pub portal_refs: Vec<WmoPortalRef>,
    /// `MOVV`
    pub visible_vertices: Vec<C3Vector>,
    /// `MOVB`
    pub visible_batches: Vec<WmoVisibleBatch>,
    /// `MOLT`
    pub lights: Vec<WmoLight>,
    /// `MODS`
    pub doodad_sets: Vec<WmoDoodadSet>,
    /// `MODN`
    pub doodad_names: StringTable,
    /// `MODD`
    pub doodad_defs: Vec<WmoDoodadDef>,
    /// `MFOG`
    pub fogs: Vec<WmoFog>,
    /// `MCVP`, only present in some files
    pub convex_volume_planes: Option<Vec<Plane>>,

    texture_lookup: HashMap<String, u32>,
    material_lookup: HashMap<WmoMaterialDefinition, u8>,
    doodad_name_lookup: HashMap<String, u32>,
    group_descriptions: Vec<u32>,
}

impl Default for WmoRootFile {
    fn default() -> Self {
        Self::new()
    }
}

fn pooled_strings(table: &StringTable) -> HashMap<String, u32> {
    let mut lookup = HashMap::new();
    for (offset, s) in table.entries() {
        lookup.entry(s).or_insert(offset);
    }
    lookup
}

impl WmoRootFile {
    /// An empty root ready for accumulation
    pub fn new() -> Self {
        Self {
            version: WMO_VERSION,
            header: WmoHeader::default(),
            textures: StringTable::new(),
            materials: Vec::new(),
            group_names: StringTable::new(),
            group_infos: Vec::new(),
            skybox: None,
            portal_vertices: Vec::new(),
            portals: Vec::new(),
            portal_refs: Vec::new(),
            visible_vertices: Vec::new(),
            visible_batches: Vec::new(),
            lights: Vec::new(),
            doodad_sets: Vec::new(),
            doodad_names: StringTable::new(),
            doodad_defs: Vec::new(),
            fogs: Vec::new(),
            convex_volume_planes: None,
            texture_lookup: HashMap::new(),
            material_lookup: HashMap::new(),
            doodad_name_lookup: HashMap::new(),
            group_descriptions: Vec::new(),
        }
    }

    /// Decode a root file. Trailing chunks after `MFOG` other than `MCVP`
    /// are skipped with a warning.
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let start = reader.stream_position()?;
        let end = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(start))?;

        let version: u32 = read_record_chunk(reader, chunks::MVER)?;
        if version != WMO_VERSION {
            return Err(WmoError::UnsupportedVersion(version));
        }

        let mohd = ChunkHeader::read(reader)?;
        if mohd.id != chunks::MOHD {
            return Err(WmoError::UnrecognizedFormat { found: mohd.id });
        }
        let payload = read_chunk_payload(reader, &mohd)?;
        let header = decode_records::<WmoHeader>(&mohd, &payload)?
            .into_iter()
            .next()
            .ok_or_else(|| WmoError::CorruptChunk {
                chunk: chunks::MOHD,
                reason: "empty header".to_string(),
            })?;
        debug!(
            "Reading root: {} groups, {} materials, {} portals",
            header.n_groups, header.n_materials, header.n_portals
        );

        let textures = StringTable::from_bytes(read_raw_chunk(reader, chunks::MOTX)?);
        let materials = read_chunk(reader, chunks::MOMT)?;
        let group_names = StringTable::from_bytes(read_raw_chunk(reader, chunks::MOGN)?);
        let group_infos = read_chunk(reader, chunks::MOGI)?;
        let skybox = StringTable::from_bytes(read_raw_chunk(reader, chunks::MOSB)?);
        let skybox = Some(skybox.get_string(0).into_owned()).filter(|name| !name.is_empty());
        let portal_vertices = read_chunk(reader, chunks::MOPV)?;
        let portals = read_chunk(reader, chunks::MOPT)?;
        let portal_refs = read_chunk(reader, chunks::MOPR)?;
        let visible_vertices = read_chunk(reader, chunks::MOVV)?;
        let visible_batches = read_chunk(reader, chunks::MOVB)?;
        let lights = read_chunk(reader, chunks::MOLT)?;
        let doodad_sets = read_chunk(reader, chunks::MODS)?;
        let doodad_names = StringTable::from_bytes(read_raw_chunk(reader, chunks::MODN)?);
        let doodad_defs = read_chunk(reader, chunks::MODD)?;
        let fogs = read_chunk(reader, chunks::MFOG)?;

        let mut convex_volume_planes = None;
        loop {
            let position = reader.stream_position()?;
            let remaining = end.saturating_sub(position);
            if remaining < ChunkHeader::SIZE as u64 {
                if remaining > 0 {
                    trace!("Ignoring {remaining} trailing bytes");
                }
                break;
            }

            let chunk = ChunkHeader::read(reader)?;
            if chunk.id == chunks::MCVP && convex_volume_planes.is_none() {
                let data = read_chunk_payload(reader, &chunk)?;
                convex_volume_planes = Some(decode_records(&chunk, &data)?);
            } else {
                warn!("Skipping unknown root chunk {} ({} bytes)", chunk.id, chunk.size);
                reader.seek(SeekFrom::Current(i64::from(chunk.size)))?;
            }
        }

        let mut root = Self {
            version,
            header,
            textures,
            materials,
            group_names,
            group_infos,
            skybox,
            portal_vertices,
            portals,
            portal_refs,
            visible_vertices,
            visible_batches,
            lights,
            doodad_sets,
            doodad_names,
            doodad_defs,
            fogs,
            convex_volume_planes,
            ..Self::new()
        };
        root.rebuild_lookups();
        Ok(root)
    }

    fn rebuild_lookups(&mut self) {
        self.texture_lookup = pooled_strings(&self.textures);
        self.doodad_name_lookup = pooled_strings(&self.doodad_names);

        self.material_lookup.clear();
        for index in 0..self.materials.len().min(MAX_MATERIALS) {
            if let Some(definition) = self.material_definition(index) {
                self.material_lookup.entry(definition).or_insert(index as u8);
            }
        }
    }

    /// Encode the root in chunk order
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_record_chunk(writer, chunks::MVER, &self.version)?;
        write_record_chunk(writer, chunks::MOHD, &self.header)?;
        write_raw_chunk(writer, chunks::MOTX, self.textures.as_bytes())?;
        write_chunk(writer, chunks::MOMT, &self.materials)?;
        write_raw_chunk(writer, chunks::MOGN, self.group_names.as_bytes())?;
        write_chunk(writer, chunks::MOGI, &self.group_infos)?;

        let mut skybox = self.skybox.as_deref().unwrap_or_default().as_bytes().to_vec();
        skybox.push(0);
        skybox.resize(skybox.len().next_multiple_of(4), 0);
        write_raw_chunk(writer, chunks::MOSB, &skybox)?;

        write_chunk(writer, chunks::MOPV, &self.portal_vertices)?;
        write_chunk(writer, chunks::MOPT, &self.portals)?;
        write_chunk(writer, chunks::MOPR, &self.portal_refs)?;
        write_chunk(writer, chunks::MOVV, &self.visible_vertices)?;
        write_chunk(writer, chunks::MOVB, &self.visible_batches)?;
        write_chunk(writer, chunks::MOLT, &self.lights)?;
        write_chunk(writer, chunks::MODS, &self.doodad_sets)?;
        write_raw_chunk(writer, chunks::MODN, self.doodad_names.as_bytes())?;
        write_chunk(writer, chunks::MODD, &self.doodad_defs)?;
        write_chunk(writer, chunks::MFOG, &self.fogs)?;

        if let Some(planes) = &self.convex_volume_planes {
            write_chunk(writer, chunks::MCVP, planes)?;
        }
        Ok(())
    }

    /// Encode into a byte vector
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Pool a texture path in `MOTX`, returning its offset. Repeated paths
    /// share one entry.
    pub fn add_texture(&mut self, path: &str) -> u32 {
        if let Some(&offset) = self.texture_lookup.get(path) {
            return offset;
        }
        let offset = self.textures.add_string(path);
        self.texture_lookup.insert(path.to_string(), offset);
        offset
    }

    pub fn texture_name(&self, offset: u32) -> Cow<'_, str> {
        self.textures.get_string(offset)
    }

    /// Add a material and return its index. Equal definitions share an index
    /// and disabled materials map to `0xFF`.
    pub fn add_material(&mut self, definition: &WmoMaterialDefinition) -> Result<u8> {
        if definition.disabled {
            return Ok(DISABLED_MATERIAL);
        }
        if let Some(&index) = self.material_lookup.get(definition) {
            return Ok(index);
        }
        if self.materials.len() >= MAX_MATERIALS {
            return Err(WmoError::MaterialLimitExceeded {
                count: self.materials.len() + 1,
            });
        }

        let material = WmoMaterial {
            flags: definition.flags,
            shader: definition.shader,
            blend_mode: definition.blend_mode,
            texture1: self.add_texture(&definition.texture1),
            emissive_color: definition.emissive_color,
            texture2: self.add_texture(&definition.texture2),
            diffuse_color: definition.diffuse_color,
            ground_type: definition.ground_type,
            texture3: self.add_texture(&definition.texture3),
            color2: definition.color2,
            flags2: definition.flags2,
            ..WmoMaterial::default()
        };

        let index = self.materials.len() as u8;
        self.materials.push(material);
        self.material_lookup.insert(definition.clone(), index);
        Ok(index)
    }

    /// Attribute tuple of a stored material, with texture paths resolved
    pub fn material_definition(&self, index: usize) -> Option<WmoMaterialDefinition> {
        let material = self.materials.get(index)?;
        Some(WmoMaterialDefinition {
            flags: material.flags,
            shader: material.shader,
            blend_mode: material.blend_mode,
            texture1: self.texture_name(material.texture1).into_owned(),
            texture2: self.texture_name(material.texture2).into_owned(),
            texture3: self.texture_name(material.texture3).into_owned(),
            emissive_color: material.emissive_color,
            diffuse_color: material.diffuse_color,
            color2: material.color2,
            ground_type: material.ground_type,
            flags2: material.flags2,
            disabled: false,
        })
    }

    /// Register a group and return its index. Flags and bounding box are
    /// refreshed from the group itself by [`WmoRootFile::finalize`].
    pub fn add_group(
        &mut self,
        name: &str,
        description: &str,
        flags: WmoGroupFlags,
        bounding_box: BoundingBox,
    ) -> usize {
        let name_offset = self.group_names.add_string(name);
        let description_offset = self.group_names.add_string(description);

        self.group_infos.push(WmoGroupInfo {
            flags,
            bounding_box,
            name_offset: name_offset as i32,
        });
        self.group_descriptions.push(description_offset);
        self.group_infos.len() - 1
    }

    pub fn group_name(&self, index: usize) -> Cow<'_, str> {
        match self.group_infos.get(index) {
            Some(info) if info.name_offset >= 0 => {
                self.group_names.get_string(info.name_offset as u32)
            }
            _ => Cow::Borrowed(""),
        }
    }

    /// A group header pre-filled with the name offsets, flags and bounding
    /// box registered for group `index`.
    ///
    /// `MOGI` does not store the description offset. A decoded root only knows
    /// it once [`WmoRootFile::restore_group_descriptions`] has seen the group
    /// files; until then it is 0.
    pub fn group_header(&self, index: usize) -> Option<WmoGroupHeader> {
        let info = self.group_infos.get(index)?;
        Some(WmoGroupHeader {
            group_name: info.name_offset.max(0) as u32,
            descriptive_group_name: self.group_descriptions.get(index).copied().unwrap_or(0),
            flags: info.flags,
            bounding_box: info.bounding_box,
            ..WmoGroupHeader::default()
        })
    }

    /// Take the description offsets of decoded groups from their `MOGP` headers
    pub fn restore_group_descriptions(&mut self, groups: &[WmoGroupFile]) {
        self.group_descriptions = (0..self.group_infos.len())
            .map(|index| {
                groups
                    .get(index)
                    .map_or(0, |group| group.header.descriptive_group_name)
            })
            .collect();
    }

    /// Add a portal polygon and return its index. The plane is derived from
    /// the first three vertices.
    pub fn add_portal(&mut self, vertices: &[C3Vector]) -> Result<usize> {
        let start_vertex = u16::try_from(self.portal_vertices.len())
            .map_err(|_| WmoError::InvalidMesh("too many portal vertices".to_string()))?;
        let vertex_count = u16::try_from(vertices.len()).map_err(|_| {
            WmoError::InvalidMesh(format!("portal with {} vertices", vertices.len()))
        })?;

        let plane = match vertices {
            [a, b, c, ..] => Plane::from_points(a.to_glam(), b.to_glam(), c.to_glam()),
            _ => None,
        };
        let plane = plane.unwrap_or_else(|| {
            warn!(
                "Portal {} is degenerate, storing an empty plane",
                self.portals.len()
            );
            Plane::default()
        });

        self.portal_vertices.extend_from_slice(vertices);
        self.portals.push(WmoPortal {
            start_vertex,
            vertex_count,
            plane,
        });
        Ok(self.portals.len() - 1)
    }

    /// Link a portal to a group. `side` is 1 or -1 depending on which side of
    /// the portal plane the group lies.
    pub fn add_portal_relation(&mut self, portal_index: u16, group_index: u16, side: i16) {
        self.portal_refs.push(WmoPortalRef {
            portal_index,
            group_index,
            side,
            filler: 0,
        });
    }

    pub fn add_light(&mut self, light: WmoLight) -> usize {
        self.lights.push(light);
        self.lights.len() - 1
    }

    pub fn add_fog(&mut self, fog: WmoFog) -> usize {
        self.fogs.push(fog);
        self.fogs.len() - 1
    }

    /// Add a named doodad set. Model paths are pooled in `MODN`.
    pub fn add_doodad_set(&mut self, name: &str, doodads: &[WmoDoodadPlacement]) -> Result<usize> {
        let start_doodad = self.doodad_defs.len() as u32;

        for doodad in doodads {
            let offset = match self.doodad_name_lookup.get(&doodad.path) {
                Some(&offset) => offset,
                None => {
                    let offset = self.doodad_names.add_string(&doodad.path);
                    if offset > WmoDoodadDef::MAX_NAME_OFFSET {
                        return Err(WmoError::NameOffsetOverflow(offset));
                    }
                    self.doodad_name_lookup.insert(doodad.path.clone(), offset);
                    offset
                }
            };

            let mut def = WmoDoodadDef {
                name_offset_and_flags: 0,
                position: doodad.position,
                orientation: doodad.orientation,
                scale: doodad.scale,
                color: doodad.color,
            };
            def.set_name_offset(offset);
            def.set_flags(doodad.flags);
            self.doodad_defs.push(def);
        }

        self.doodad_sets
            .push(WmoDoodadSet::new(name, start_doodad, doodads.len() as u32));
        Ok(self.doodad_sets.len() - 1)
    }

    pub fn doodad_path(&self, def: &WmoDoodadDef) -> Cow<'_, str> {
        self.doodad_names.get_string(def.name_offset())
    }

    pub fn set_skybox(&mut self, path: &str) {
        self.skybox = (!path.is_empty()).then(|| path.to_string());
    }

    /// Complete an accumulated root against its groups: refresh `MOGI` from
    /// the group headers, make sure a doodad set exists and recompute the
    /// `MOHD` counts and global bounding box.
    pub fn finalize(&mut self, groups: &[WmoGroupFile]) -> Result<()> {
        if self.group_infos.len() != groups.len() {
            return Err(WmoError::GroupCountMismatch {
                expected: self.group_infos.len(),
                found: groups.len(),
            });
        }

        for (info, group) in self.group_infos.iter_mut().zip(groups) {
            info.flags = group.header.flags;
            info.bounding_box = group.header.bounding_box;
        }

        if self.doodad_sets.is_empty() {
            self.doodad_sets.push(WmoDoodadSet::new(
                DEFAULT_DOODAD_SET,
                0,
                self.doodad_defs.len() as u32,
            ));
        }

        if let Some(bounds) = groups
            .iter()
            .map(|group| group.header.bounding_box)
            .reduce(|a, b| a.union(&b))
        {
            self.header.bounding_box = bounds;
        }

        self.header.n_materials = self.materials.len() as u32;
        self.header.n_groups = groups.len() as u32;
        self.header.n_portals = self.portals.len() as u32;
        self.header.n_lights = self.lights.len() as u32;
        self.header.n_doodad_names = self.doodad_names.entries().len() as u32;
        self.header.n_doodad_defs = self.doodad_defs.len() as u32;
        self.header.n_doodad_sets = self.doodad_sets.len() as u32;

        debug!(
            "Finalized root: {} groups, {} materials, {} doodads in {} sets",
            self.header.n_groups,
            self.header.n_materials,
            self.header.n_doodad_defs,
            self.header.n_doodad_sets
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkId;
    use crate::wmo_types::WmoDoodadFlags;
    use pretty_assertions::assert_eq;
    use wbs_data::math::{Color, Quaternion};

    fn material(texture: &str, shader: u32) -> WmoMaterialDefinition {
        WmoMaterialDefinition {
            shader,
            texture1: texture.to_string(),
            diffuse_color: Color::WHITE,
            ..WmoMaterialDefinition::default()
        }
    }

    fn doodad(path: &str) -> WmoDoodadPlacement {
        WmoDoodadPlacement {
            path: path.to_string(),
            position: C3Vector::new(1.0, 2.0, 3.0),
            orientation: Quaternion::default(),
            scale: 1.0,
            color: Color::WHITE,
            flags: WmoDoodadFlags::empty(),
        }
    }

    #[test]
    fn test_material_deduplication() {
        let mut root = WmoRootFile::new();
        let stone = root.add_material(&material("stone.blp", 0)).unwrap();
        let wood = root.add_material(&material("wood.blp", 0)).unwrap();
        let stone_again = root.add_material(&material("stone.blp", 0)).unwrap();

        assert_eq!(stone, 0);
        assert_eq!(wood, 1);
        assert_eq!(stone_again, 0);
        assert_eq!(root.materials.len(), 2);

        let disabled = WmoMaterialDefinition {
            disabled: true,
            ..material("stone.blp", 0)
        };
        assert_eq!(root.add_material(&disabled).unwrap(), DISABLED_MATERIAL);
        assert_eq!(root.materials.len(), 2);
    }

    #[test]
    fn test_materials_share_textures() {
        let mut root = WmoRootFile::new();
        root.add_material(&material("stone.blp", 0)).unwrap();
        root.add_material(&material("stone.blp", 1)).unwrap();

        assert_eq!(root.materials[0].texture1, root.materials[1].texture1);
        assert_eq!(root.texture_name(root.materials[1].texture1), "stone.blp");
    }

    #[test]
    fn test_material_limit() {
        let mut root = WmoRootFile::new();
        for shader in 0..MAX_MATERIALS as u32 {
            root.add_material(&material("a.blp", shader)).unwrap();
        }
        assert_eq!(root.materials.len(), 255);

        let result = root.add_material(&material("a.blp", 1000));
        assert!(matches!(
            result,
            Err(WmoError::MaterialLimitExceeded { count: 256 })
        ));
        // existing materials still resolve
        assert_eq!(root.add_material(&material("a.blp", 7)).unwrap(), 7);
    }

    #[test]
    fn test_doodad_paths_are_pooled() {
        let mut root = WmoRootFile::new();
        root.add_doodad_set("Set_Chairs", &[doodad("chair.m2"), doodad("chair.m2")])
            .unwrap();
        root.add_doodad_set("Set_Tables", &[doodad("table.m2"), doodad("chair.m2")])
            .unwrap();

        assert_eq!(root.doodad_defs.len(), 4);
        assert_eq!(root.doodad_names.get_all_strings(), vec!["chair.m2", "table.m2"]);
        assert_eq!(root.doodad_defs[0].name_offset(), root.doodad_defs[3].name_offset());
        assert_eq!(root.doodad_path(&root.doodad_defs[2]), "table.m2");

        assert_eq!(root.doodad_sets[1].name(), "Set_Tables");
        assert_eq!(root.doodad_sets[1].start_doodad, 2);
        assert_eq!(root.doodad_sets[1].n_doodads, 2);
    }

    #[test]
    fn test_skybox_padding() {
        let mut root = WmoRootFile::new();
        root.set_skybox("sky.m2");
        let bytes = root.to_bytes().unwrap();

        let needle = ChunkId::from_str("MOSB").to_disk();
        let position = bytes.windows(4).position(|w| w == needle).unwrap();
        let size = u32::from_le_bytes(bytes[position + 4..position + 8].try_into().unwrap());
        assert_eq!(size, 8);

        let empty = WmoRootFile::new().to_bytes().unwrap();
        let position = empty.windows(4).position(|w| w == needle).unwrap();
        let size = u32::from_le_bytes(empty[position + 4..position + 8].try_into().unwrap());
        assert_eq!(size, 4);
    }

    #[test]
    fn test_root_round_trip() {
        let mut root = WmoRootFile::new();
        root.add_material(&material("stone.blp", 1)).unwrap();
        root.add_group("Hall", "", WmoGroupFlags::INTERIOR, BoundingBox::zero());
        root.add_portal(&[
            C3Vector::new(0.0, 0.0, 0.0),
            C3Vector::new(1.0, 0.0, 0.0),
            C3Vector::new(1.0, 0.0, 1.0),
            C3Vector::new(0.0, 0.0, 1.0),
        ])
        .unwrap();
        root.add_portal_relation(0, 0, 1);
        root.add_light(WmoLight {
            intensity: 2.0,
            ..WmoLight::default()
        });
        root.add_fog(WmoFog::default());
        root.add_doodad_set("Set_$DefaultGlobal", &[doodad("chair.m2")])
            .unwrap();
        root.set_skybox("sky.m2");
        root.convex_volume_planes = Some(vec![Plane::default(); 2]);

        let bytes = root.to_bytes().unwrap();
        let decoded = WmoRootFile::read(&mut Cursor::new(&bytes)).unwrap();

        assert_eq!(decoded.header, root.header);
        assert_eq!(decoded.materials, root.materials);
        assert_eq!(decoded.textures, root.textures);
        assert_eq!(decoded.group_infos, root.group_infos);
        assert_eq!(decoded.group_name(0), "Hall");
        assert_eq!(decoded.portals, root.portals);
        assert_eq!(decoded.portal_vertices.len(), 4);
        assert_eq!(decoded.portal_refs, root.portal_refs);
        assert_eq!(decoded.lights, root.lights);
        assert_eq!(decoded.doodad_defs, root.doodad_defs);
        assert_eq!(decoded.doodad_sets, root.doodad_sets);
        assert_eq!(decoded.fogs, root.fogs);
        assert_eq!(decoded.skybox.as_deref(), Some("sky.m2"));
        assert_eq!(decoded.convex_volume_planes, root.convex_volume_planes);
        assert_eq!(decoded.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_decoded_root_keeps_deduplicating() {
        let mut root = WmoRootFile::new();
        root.add_material(&material("stone.blp", 1)).unwrap();
        let bytes = root.to_bytes().unwrap();

        let mut decoded = WmoRootFile::read(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(decoded.add_material(&material("stone.blp", 1)).unwrap(), 0);
        assert_eq!(decoded.add_texture("stone.blp"), root.materials[0].texture1);
    }

    #[test]
    fn test_group_descriptions_come_from_group_files() {
        let mut root = WmoRootFile::new();
        root.add_group("Hall", "great hall", WmoGroupFlags::INTERIOR, BoundingBox::zero());
        let expected = root.group_header(0).unwrap();
        assert_eq!(
            root.group_names.get_string(expected.descriptive_group_name),
            "great hall"
        );

        let bytes = root.to_bytes().unwrap();
        let mut decoded = WmoRootFile::read(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(decoded.group_header(0).unwrap().descriptive_group_name, 0);

        let mut group = WmoGroupFile::default();
        group.header.descriptive_group_name = expected.descriptive_group_name;
        decoded.restore_group_descriptions(&[group]);
        assert_eq!(decoded.group_header(0), Some(expected));
    }

    #[test]
    fn test_unknown_trailing_chunk_is_skipped() {
        let mut bytes = WmoRootFile::new().to_bytes().unwrap();
        ChunkHeader::new(ChunkId::from_str("MXYZ"), 4)
            .write(&mut bytes)
            .unwrap();
        bytes.extend_from_slice(&[1, 2, 3, 4]);

        let decoded = WmoRootFile::read(&mut Cursor::new(&bytes)).unwrap();
        assert!(decoded.convex_volume_planes.is_none());
    }

    #[test]
    fn test_group_file_is_not_a_root() {
        let mut bytes = Vec::new();
        write_record_chunk(&mut bytes, chunks::MVER, &WMO_VERSION).unwrap();
        ChunkHeader::new(chunks::MOGP, 0).write(&mut bytes).unwrap();

        let result = WmoRootFile::read(&mut Cursor::new(&bytes));
        assert!(matches!(
            result,
            Err(WmoError::UnrecognizedFormat { found }) if found == chunks::MOGP
        ));
    }

    #[test]
    fn test_finalize() {
        let mut root = WmoRootFile::new();
        root.add_material(&material("stone.blp", 1)).unwrap();
        root.add_group("A", "", WmoGroupFlags::empty(), BoundingBox::zero());
        root.add_group("B", "", WmoGroupFlags::empty(), BoundingBox::zero());

        let mut first = WmoGroupFile::default();
        first.header.flags = WmoGroupFlags::INTERIOR;
        first.header.bounding_box =
            BoundingBox::new(C3Vector::new(-1.0, 0.0, 0.0), C3Vector::new(1.0, 1.0, 1.0));
        let mut second = WmoGroupFile::default();
        second.header.bounding_box =
            BoundingBox::new(C3Vector::new(0.0, -5.0, 0.0), C3Vector::new(2.0, 0.0, 3.0));

        assert!(matches!(
            root.finalize(std::slice::from_ref(&first)),
            Err(WmoError::GroupCountMismatch {
                expected: 2,
                found: 1
            })
        ));

        root.finalize(&[first, second]).unwrap();
        assert_eq!(root.header.n_groups, 2);
        assert_eq!(root.header.n_materials, 1);
        assert_eq!(root.header.n_doodad_sets, 1);
        assert_eq!(root.doodad_sets[0].name(), DEFAULT_DOODAD_SET);
        assert_eq!(root.group_infos[0].flags, WmoGroupFlags::INTERIOR);
        assert_eq!(root.header.bounding_box.min, C3Vector::new(-1.0, -5.0, 0.0));
        assert_eq!(root.header.bounding_box.max, C3Vector::new(2.0, 1.0, 3.0));
    }

    #[test]
    fn test_degenerate_portal_gets_empty_plane() {
        let mut root = WmoRootFile::new();
        let index = root.add_portal(&[C3Vector::default(); 2]).unwrap();
        assert_eq!(root.portals[index].plane, Plane::default());
        assert_eq!(root.portals[index].vertex_count, 2);
    }
}
