//! Fixed-layout records of a version 17 root file

use bitflags::bitflags;
use wbs_data::math::{BoundingBox, C3Vector, Color, Plane, Quaternion};
use wbs_data::{wow_flags, wow_record};

use crate::wmo_group_types::WmoGroupFlags;

/// Only supported root and group version
pub const WMO_VERSION: u32 = 17;

/// Material index that marks a disabled material or a collision-only face
pub const DISABLED_MATERIAL: u8 = 0xFF;

/// Name of the doodad set every exported root carries
pub const DEFAULT_DOODAD_SET: &str = "Set_$DefaultGlobal";

bitflags! {
    /// `MOHD` flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WmoHeaderFlags: u16 {
        const DO_NOT_ATTENUATE_VERTICES = 0x01;
        const USE_UNIFIED_RENDER_PATH = 0x02;
        const USE_LIQUID_TYPE_DBC_ID = 0x04;
        const DO_NOT_FIX_VERTEX_COLOR_ALPHA = 0x08;
        const LOD = 0x10;
        const DEFAULT_MAX_LOD = 0x20;
    }
}
wow_flags!(WmoHeaderFlags, u16);

wow_record! {
    /// `MOHD`: counts and global properties
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct WmoHeader {
        pub n_materials: u32,
        pub n_groups: u32,
        pub n_portals: u32,
        pub n_lights: u32,
        pub n_doodad_names: u32,
        pub n_doodad_defs: u32,
        pub n_doodad_sets: u32,
        pub ambient_color: Color,
        /// `WMOAreaTable` id
        pub wmo_id: u32,
        pub bounding_box: BoundingBox,
        pub flags: WmoHeaderFlags,
        pub n_lod: u16,
    }
}

bitflags! {
    /// `MOMT` flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WmoMaterialFlags: u32 {
        const UNLIT = 0x01;
        const UNFOGGED = 0x02;
        const TWO_SIDED = 0x04;
        const EXTERIOR_LIGHT = 0x08;
        const NIGHT_GLOW = 0x10;
        const WINDOW = 0x20;
        const CLAMP_S = 0x40;
        const CLAMP_T = 0x80;
    }
}
wow_flags!(WmoMaterialFlags, u32);

wow_record! {
    /// `MOMT` entry. Texture fields are offsets into `MOTX`.
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct WmoMaterial {
        pub flags: WmoMaterialFlags,
        pub shader: u32,
        pub blend_mode: u32,
        pub texture1: u32,
        pub emissive_color: Color,
        /// Filled in by the client at runtime
        pub runtime_emissive_color: Color,
        pub texture2: u32,
        pub diffuse_color: Color,
        pub ground_type: u32,
        pub texture3: u32,
        pub color2: Color,
        pub flags2: u32,
        pub runtime_data: [u32; 4],
    }
}

/// Attribute tuple that identifies a material for de-duplication
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct WmoMaterialDefinition {
    pub flags: WmoMaterialFlags,
    pub shader: u32,
    pub blend_mode: u32,
    pub texture1: String,
    pub texture2: String,
    pub texture3: String,
    pub emissive_color: Color,
    pub diffuse_color: Color,
    pub color2: Color,
    pub ground_type: u32,
    pub flags2: u32,
    /// Disabled materials are never written; faces using them get `0xFF`
    pub disabled: bool,
}

wow_record! {
    /// `MOGI` entry, mirrors the group header
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct WmoGroupInfo {
        pub flags: WmoGroupFlags,
        pub bounding_box: BoundingBox,
        /// Offset into `MOGN`, -1 when unnamed
        pub name_offset: i32,
    }
}

wow_record! {
    /// `MOPT` entry, a convex polygon in `MOPV`
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct WmoPortal {
        pub start_vertex: u16,
        pub vertex_count: u16,
        pub plane: Plane,
    }
}

wow_record! {
    /// `MOPR` entry linking a portal to a group
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WmoPortalRef {
        pub portal_index: u16,
        pub group_index: u16,
        /// Which side of the portal plane the group is on, 1 or -1
        pub side: i16,
        pub filler: u16,
    }
}

wow_record! {
    /// `MOVB` entry, a run of `MOVV` vertices
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WmoVisibleBatch {
        pub start_vertex: u16,
        pub vertex_count: u16,
    }
}

/// Light kinds stored in `MOLT`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WmoLightType {
    Omni = 0,
    Spot = 1,
    Directional = 2,
    Ambient = 3,
}

impl WmoLightType {
    pub fn from_raw(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Omni),
            1 => Some(Self::Spot),
            2 => Some(Self::Directional),
            3 => Some(Self::Ambient),
            _ => None,
        }
    }
}

wow_record! {
    /// `MOLT` entry
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct WmoLight {
        pub light_type: u8,
        pub use_attenuation: u8,
        pub padding: [u8; 2],
        pub color: Color,
        pub position: C3Vector,
        pub intensity: f32,
        pub unknown: [f32; 4],
        pub attenuation_start: f32,
        pub attenuation_end: f32,
    }
}

impl WmoLight {
    pub fn kind(&self) -> Option<WmoLightType> {
        WmoLightType::from_raw(self.light_type)
    }
}

wow_record! {
    /// `MODS` entry, a named range of `MODD`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WmoDoodadSet {
        pub name: [u8; 20],
        pub start_doodad: u32,
        pub n_doodads: u32,
        pub padding: u32,
    }
}

impl WmoDoodadSet {
    /// Build a set, truncating the name to 19 bytes
    pub fn new(name: &str, start_doodad: u32, n_doodads: u32) -> Self {
        let mut raw = [0_u8; 20];
        let bytes = name.as_bytes();
        let len = bytes.len().min(raw.len() - 1);
        raw[..len].copy_from_slice(&bytes[..len]);
        Self {
            name: raw,
            start_doodad,
            n_doodads,
            padding: 0,
        }
    }

    pub fn name(&self) -> String {
        let end = memchr::memchr(0, &self.name).unwrap_or(self.name.len());
        String::from_utf8_lossy(&self.name[..end]).into_owned()
    }
}

bitflags! {
    /// Upper byte of the `MODD` name field
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WmoDoodadFlags: u8 {
        const ACCEPT_PROJECTED_TEXTURE = 0x01;
        const USE_INTERIOR_LIGHTING = 0x02;
        const UNKNOWN_4 = 0x04;
        const UNKNOWN_8 = 0x08;
    }
}

wow_record! {
    /// `MODD` entry: a placed model
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct WmoDoodadDef {
        /// 24-bit offset into `MODN` and 8 bits of flags
        pub name_offset_and_flags: u32,
        pub position: C3Vector,
        pub orientation: Quaternion,
        pub scale: f32,
        pub color: Color,
    }
}

impl WmoDoodadDef {
    pub const MAX_NAME_OFFSET: u32 = 0x00FF_FFFF;

    pub fn name_offset(&self) -> u32 {
        self.name_offset_and_flags & Self::MAX_NAME_OFFSET
    }

    pub fn flags(&self) -> WmoDoodadFlags {
        WmoDoodadFlags::from_bits_retain((self.name_offset_and_flags >> 24) as u8)
    }

    pub fn set_name_offset(&mut self, offset: u32) {
        self.name_offset_and_flags = (self.name_offset_and_flags & !Self::MAX_NAME_OFFSET)
            | (offset & Self::MAX_NAME_OFFSET);
    }

    pub fn set_flags(&mut self, flags: WmoDoodadFlags) {
        self.name_offset_and_flags =
            (self.name_offset_and_flags & Self::MAX_NAME_OFFSET) | (u32::from(flags.bits()) << 24);
    }
}

/// A doodad as supplied by the host, before its path is pooled into `MODN`
#[derive(Debug, Clone, PartialEq)]
pub struct WmoDoodadPlacement {
    pub path: String,
    pub position: C3Vector,
    pub orientation: Quaternion,
    pub scale: f32,
    pub color: Color,
    pub flags: WmoDoodadFlags,
}

wow_record! {
    /// `MFOG` entry
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct WmoFog {
        pub flags: u32,
        pub position: C3Vector,
        pub small_radius: f32,
        pub large_radius: f32,
        pub end: f32,
        pub start_scalar: f32,
        pub color: Color,
        pub underwater_end: f32,
        pub underwater_start_scalar: f32,
        pub underwater_color: Color,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wbs_data::types::WowStruct;

    #[test]
    fn test_root_record_sizes() {
        assert_eq!(WmoHeader::SIZE, 64);
        assert_eq!(WmoMaterial::SIZE, 64);
        assert_eq!(WmoGroupInfo::SIZE, 32);
        assert_eq!(WmoPortal::SIZE, 20);
        assert_eq!(WmoPortalRef::SIZE, 8);
        assert_eq!(WmoVisibleBatch::SIZE, 4);
        assert_eq!(WmoLight::SIZE, 48);
        assert_eq!(WmoDoodadSet::SIZE, 32);
        assert_eq!(WmoDoodadDef::SIZE, 40);
        assert_eq!(WmoFog::SIZE, 48);
    }

    #[test]
    fn test_doodad_name_and_flags_packing() {
        let mut def = WmoDoodadDef::default();
        def.set_name_offset(0x0012_3456);
        def.set_flags(WmoDoodadFlags::USE_INTERIOR_LIGHTING);

        assert_eq!(def.name_offset_and_flags, 0x0212_3456);
        assert_eq!(def.name_offset(), 0x0012_3456);
        assert_eq!(def.flags(), WmoDoodadFlags::USE_INTERIOR_LIGHTING);
    }

    #[test]
    fn test_doodad_set_name() {
        let set = WmoDoodadSet::new("Set_$DefaultGlobal", 0, 3);
        assert_eq!(set.name(), "Set_$DefaultGlobal");

        let long = WmoDoodadSet::new("A name that is far too long", 0, 0);
        assert_eq!(long.name().len(), 19);
    }
}
