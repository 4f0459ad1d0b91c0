//! Fixed-layout records of a version 17 group file

use bitflags::bitflags;
use wbs_data::math::{BoundingBox, C3Vector};
use wbs_data::{wow_flags, wow_record};

bitflags! {
    /// `MOGP` / `MOGI` flags. Several bits gate optional group chunks.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WmoGroupFlags: u32 {
        /// `MOBN` and `MOBR` are present
        const HAS_COLLISION = 0x1;
        const HAS_LIGHTMAP = 0x2;
        /// `MOCV` is present
        const HAS_VERTEX_COLORS = 0x4;
        const EXTERIOR = 0x8;
        const EXTERIOR_LIT = 0x40;
        const UNREACHABLE = 0x80;
        const SHOW_EXTERIOR_SKYBOX = 0x100;
        /// `MOLR` is present
        const HAS_LIGHTS = 0x200;
        /// `MODR` is present
        const HAS_DOODADS = 0x800;
        /// `MLIQ` is present
        const HAS_WATER = 0x1000;
        const INTERIOR = 0x2000;
        const ALWAYS_DRAW = 0x10000;
        const SHOW_SKYBOX = 0x40000;
        const WATER_IS_OCEAN = 0x80000;
        /// A second `MOCV` is present
        const HAS_TWO_VERTEX_COLORS = 0x100_0000;
        /// A second `MOTV` is present
        const HAS_TWO_TEX_COORDS = 0x200_0000;
        const ANTIPORTAL = 0x400_0000;
    }
}
wow_flags!(WmoGroupFlags, u32);

impl WmoGroupFlags {
    /// Flags that announce an optional chunk
    pub const GATING: Self = Self::HAS_COLLISION
        .union(Self::HAS_VERTEX_COLORS)
        .union(Self::HAS_LIGHTS)
        .union(Self::HAS_DOODADS)
        .union(Self::HAS_WATER)
        .union(Self::HAS_TWO_VERTEX_COLORS)
        .union(Self::HAS_TWO_TEX_COORDS);
}

wow_record! {
    /// `MOGP` header, followed by the group's sub-chunks
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct WmoGroupHeader {
        /// Offset into the root's `MOGN`
        pub group_name: u32,
        /// Offset into the root's `MOGN`
        pub descriptive_group_name: u32,
        pub flags: WmoGroupFlags,
        pub bounding_box: BoundingBox,
        pub portal_start: u16,
        pub portal_count: u16,
        pub trans_batch_count: u16,
        pub int_batch_count: u16,
        pub ext_batch_count: u16,
        pub padding: u16,
        pub fog_ids: [u8; 4],
        /// Liquid type of the group; selects the `MLIQ` vertex layout
        pub group_liquid: u32,
        /// `WMOAreaTable` id
        pub group_id: u32,
        pub flags2: u32,
        pub unused: u32,
    }
}

bitflags! {
    /// `MOPY` triangle flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WmoPolyFlags: u8 {
        const TRANSITION = 0x01;
        const NO_CAMERA_COLLIDE = 0x02;
        const DETAIL = 0x04;
        const COLLISION = 0x08;
        const HINT = 0x10;
        const RENDER = 0x20;
        const CULL_OBJECTS = 0x40;
        const COLLIDE_HIT = 0x80;
    }
}
wow_flags!(WmoPolyFlags, u8);

wow_record! {
    /// `MOPY` entry, one per triangle
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WmoPolyMaterial {
        pub flags: WmoPolyFlags,
        /// Index into `MOMT`, `0xFF` for collision-only faces
        pub material_id: u8,
    }
}

impl WmoPolyMaterial {
    /// Whether the triangle belongs in the collision tree
    pub fn is_collidable(&self) -> bool {
        self.flags.contains(WmoPolyFlags::COLLISION)
            || (self.flags.contains(WmoPolyFlags::RENDER)
                && !self.flags.contains(WmoPolyFlags::DETAIL))
    }
}

wow_record! {
    /// `MOBA` entry, a run of triangles sharing one material
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WmoBatch {
        /// Coarse bounding box: min x, y, z then max x, y, z
        pub bounding_box: [i16; 6],
        pub start_index: u32,
        pub index_count: u16,
        pub start_vertex: u16,
        /// Inclusive
        pub last_vertex: u16,
        pub flags: u8,
        pub material_id: u8,
    }
}

/// Split plane of a `MOBN` node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum BspPlaneType {
    /// Splits along X
    YzPlane = 0,
    /// Splits along Y
    XzPlane = 1,
    /// Splits along Z
    XyPlane = 2,
    Leaf = 4,
}

impl BspPlaneType {
    pub fn from_raw(value: u16) -> Option<Self> {
        match value {
            0 => Some(Self::YzPlane),
            1 => Some(Self::XzPlane),
            2 => Some(Self::XyPlane),
            4 => Some(Self::Leaf),
            _ => None,
        }
    }

    /// Plane perpendicular to the given axis (0 = X, 1 = Y, 2 = Z)
    pub fn for_axis(axis: usize) -> Self {
        match axis {
            0 => Self::YzPlane,
            1 => Self::XzPlane,
            _ => Self::XyPlane,
        }
    }

    /// Axis the plane splits, `None` for leaves
    pub fn axis(self) -> Option<usize> {
        match self {
            Self::YzPlane => Some(0),
            Self::XzPlane => Some(1),
            Self::XyPlane => Some(2),
            Self::Leaf => None,
        }
    }
}

wow_record! {
    /// `MOBN` node
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct BspNode {
        pub plane_type: u16,
        /// Negative and positive child, -1 when absent
        pub children: [i16; 2],
        pub face_count: u16,
        /// First entry in `MOBR`
        pub first_face: u32,
        pub distance: f32,
    }
}

impl BspNode {
    pub fn leaf(first_face: u32, face_count: u16) -> Self {
        Self {
            plane_type: BspPlaneType::Leaf as u16,
            children: [-1, -1],
            face_count,
            first_face,
            distance: 0.0,
        }
    }

    pub fn split(plane: BspPlaneType, distance: f32) -> Self {
        Self {
            plane_type: plane as u16,
            children: [-1, -1],
            face_count: 0,
            first_face: 0,
            distance,
        }
    }

    pub fn kind(&self) -> Option<BspPlaneType> {
        BspPlaneType::from_raw(self.plane_type)
    }

    pub fn is_leaf(&self) -> bool {
        self.plane_type == BspPlaneType::Leaf as u16
    }

    pub fn negative_child(&self) -> i16 {
        self.children[0]
    }

    pub fn positive_child(&self) -> i16 {
        self.children[1]
    }
}

/// Vertex layout family of a liquid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiquidCategory {
    Water,
    Ocean,
    Magma,
    Slime,
}

impl LiquidCategory {
    /// Category of a group liquid id. Ids below 21 are basic liquids whose
    /// low two bits (after subtracting one) select the category.
    pub fn from_liquid_id(id: u32) -> Self {
        if id < 21 {
            match id.wrapping_sub(1) & 3 {
                0 => Self::Water,
                1 => Self::Ocean,
                2 => Self::Magma,
                _ => Self::Slime,
            }
        } else {
            Self::Water
        }
    }

    /// Magma and slime store texture coordinates instead of flow data
    pub fn has_texture_coords(self) -> bool {
        matches!(self, Self::Magma | Self::Slime)
    }
}

wow_record! {
    /// `MLIQ` header
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct WmoLiquidHeader {
        pub x_verts: u32,
        pub y_verts: u32,
        pub x_tiles: u32,
        pub y_tiles: u32,
        pub position: C3Vector,
        pub material_id: u16,
    }
}

wow_record! {
    /// Water and ocean liquid vertex
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct WaterVertex {
        pub flow1: u8,
        pub flow2: u8,
        pub flow1_pct: u8,
        pub filler: u8,
        pub height: f32,
    }
}

wow_record! {
    /// Magma and slime liquid vertex
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct MagmaVertex {
        pub u: i16,
        pub v: i16,
        pub height: f32,
    }
}

/// Liquid vertices, laid out according to the liquid category
#[derive(Debug, Clone, PartialEq)]
pub enum LiquidVertices {
    Water(Vec<WaterVertex>),
    Magma(Vec<MagmaVertex>),
}

impl LiquidVertices {
    pub fn len(&self) -> usize {
        match self {
            Self::Water(vertices) => vertices.len(),
            Self::Magma(vertices) => vertices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn heights(&self) -> Vec<f32> {
        match self {
            Self::Water(vertices) => vertices.iter().map(|v| v.height).collect(),
            Self::Magma(vertices) => vertices.iter().map(|v| v.height).collect(),
        }
    }
}

/// Tile value that hides a liquid tile
pub const LIQUID_TILE_NO_RENDER: u8 = 0x0F;

/// `MLIQ` chunk: a height grid of `x_verts * y_verts` vertices and
/// `x_tiles * y_tiles` tile bytes
#[derive(Debug, Clone, PartialEq)]
pub struct WmoLiquid {
    pub header: WmoLiquidHeader,
    pub vertices: LiquidVertices,
    pub tiles: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;
    use wbs_data::types::WowStruct;

    #[test]
    fn test_group_record_sizes() {
        assert_eq!(WmoGroupHeader::SIZE, 68);
        assert_eq!(WmoPolyMaterial::SIZE, 2);
        assert_eq!(WmoBatch::SIZE, 24);
        assert_eq!(BspNode::SIZE, 16);
        assert_eq!(WmoLiquidHeader::SIZE, 30);
        assert_eq!(WaterVertex::SIZE, 8);
        assert_eq!(MagmaVertex::SIZE, 8);
    }

    #[test_case(1, LiquidCategory::Water)]
    #[test_case(2, LiquidCategory::Ocean)]
    #[test_case(3, LiquidCategory::Magma)]
    #[test_case(4, LiquidCategory::Slime)]
    #[test_case(13, LiquidCategory::Water)]
    #[test_case(14, LiquidCategory::Ocean)]
    #[test_case(19, LiquidCategory::Magma)]
    #[test_case(20, LiquidCategory::Slime)]
    #[test_case(21, LiquidCategory::Water)]
    #[test_case(100, LiquidCategory::Water)]
    fn test_liquid_category(id: u32, expected: LiquidCategory) {
        assert_eq!(LiquidCategory::from_liquid_id(id), expected);
    }

    #[test_case(WmoPolyFlags::COLLISION, true)]
    #[test_case(WmoPolyFlags::RENDER, true)]
    #[test_case(WmoPolyFlags::RENDER.union(WmoPolyFlags::DETAIL), false)]
    #[test_case(WmoPolyFlags::DETAIL.union(WmoPolyFlags::COLLISION), true)]
    #[test_case(WmoPolyFlags::empty(), false)]
    fn test_collidable(flags: WmoPolyFlags, expected: bool) {
        let poly = WmoPolyMaterial {
            flags,
            material_id: 0,
        };
        assert_eq!(poly.is_collidable(), expected);
    }

    #[test]
    fn test_bsp_plane_axis() {
        assert_eq!(BspPlaneType::for_axis(0), BspPlaneType::YzPlane);
        assert_eq!(BspPlaneType::XyPlane.axis(), Some(2));
        assert_eq!(BspPlaneType::from_raw(3), None);
        assert!(BspNode::leaf(0, 0).is_leaf());
    }
}
