use std::io::Cursor;

use pretty_assertions::assert_eq;
use test_case::test_case;
use wbs_data::math::{C2Vector, C3Vector, Color};
use wbs_wmo::chunk::chunks;
use wbs_wmo::{
    BatchClass, BspOptions, ChunkHeader, ChunkId, LiquidVertices, MeshTriangle, WaterVertex,
    WmoError, WmoGroupFile, WmoGroupFlags, WmoGroupHeader, WmoGroupMesh, WmoLiquid,
    WmoLiquidHeader, WmoPolyFlags,
};

fn grid_mesh(size: u16) -> WmoGroupMesh {
    let mut mesh = WmoGroupMesh::default();
    for y in 0..=size {
        for x in 0..=size {
            mesh.positions
                .push(C3Vector::new(f32::from(x), f32::from(y), f32::from((x + y) % 3)));
            mesh.normals.push(C3Vector::new(0.0, 0.0, 1.0));
            mesh.tex_coords
                .push(C2Vector::new(f32::from(x) / 4.0, f32::from(y) / 4.0));
        }
    }
    let row = size + 1;
    for y in 0..size {
        for x in 0..size {
            let a = y * row + x;
            let material_id = ((x + y) % 2) as u8;
            for indices in [[a, a + 1, a + row + 1], [a, a + row + 1, a + row]] {
                mesh.triangles.push(MeshTriangle {
                    indices,
                    material_id,
                    flags: WmoPolyFlags::RENDER,
                    batch_class: if y < size / 2 {
                        BatchClass::Interior
                    } else {
                        BatchClass::Exterior
                    },
                });
            }
        }
    }
    mesh
}

fn water() -> WmoLiquid {
    WmoLiquid {
        header: WmoLiquidHeader {
            x_verts: 3,
            y_verts: 2,
            x_tiles: 2,
            y_tiles: 1,
            position: C3Vector::new(0.0, 0.0, -1.0),
            material_id: 0,
        },
        vertices: LiquidVertices::Water(
            (0..6)
                .map(|i| WaterVertex {
                    flow1: i,
                    height: f32::from(i) * 0.25,
                    ..WaterVertex::default()
                })
                .collect(),
        ),
        tiles: vec![0x01, 0x0F],
    }
}

/// A group that uses every optional chunk
fn full_group() -> WmoGroupFile {
    let mut mesh = grid_mesh(8);
    let count = mesh.positions.len();
    mesh.vertex_colors = Some(vec![Color::rgba(10, 20, 30, 255); count]);
    mesh.vertex_colors2 = Some(vec![Color::BLACK; count]);
    mesh.tex_coords2 = Some(vec![C2Vector::new(0.5, 0.5); count]);
    mesh.light_refs = vec![0, 2];
    mesh.doodad_refs = vec![1, 3, 5];
    mesh.liquid = Some(water());

    let header = WmoGroupHeader {
        group_liquid: 1,
        group_id: 42,
        ..WmoGroupHeader::default()
    };
    let options = BspOptions {
        max_face_count: 10,
        ..BspOptions::default()
    };
    WmoGroupFile::from_mesh(&mesh, header, &options).unwrap()
}

/// Drop the data of every optional chunk whose flag is not in `flags`
fn restrict(mut group: WmoGroupFile, flags: WmoGroupFlags) -> WmoGroupFile {
    if !flags.contains(WmoGroupFlags::HAS_LIGHTS) {
        group.light_refs.clear();
    }
    if !flags.contains(WmoGroupFlags::HAS_DOODADS) {
        group.doodad_refs.clear();
    }
    if !flags.contains(WmoGroupFlags::HAS_COLLISION) {
        group.bsp = Default::default();
    }
    if !flags.contains(WmoGroupFlags::HAS_VERTEX_COLORS) {
        group.vertex_colors.clear();
    }
    if !flags.contains(WmoGroupFlags::HAS_WATER) {
        group.liquid = None;
    }
    if !flags.contains(WmoGroupFlags::HAS_TWO_TEX_COORDS) {
        group.tex_coords2.clear();
    }
    if !flags.contains(WmoGroupFlags::HAS_TWO_VERTEX_COLORS) {
        group.vertex_colors2.clear();
    }
    group.header.flags = (group.header.flags - WmoGroupFlags::GATING) | flags;
    group
}

/// Identifiers of the sub-chunks inside `MOGP`, in file order
fn sub_chunks(bytes: &[u8]) -> Vec<ChunkId> {
    let mut cursor = Cursor::new(bytes);
    cursor.set_position(12 + 8 + 68);

    let mut ids = Vec::new();
    while (cursor.position() as usize) < bytes.len() {
        let header = ChunkHeader::read(&mut cursor).unwrap();
        ids.push(header.id);
        cursor.set_position(cursor.position() + u64::from(header.size));
    }
    ids
}

#[test]
fn test_full_group_round_trip() {
    let group = full_group();
    assert!(group.header.flags.contains(WmoGroupFlags::GATING));

    let bytes = group.to_bytes().unwrap();
    let decoded = WmoGroupFile::read(&mut Cursor::new(&bytes)).unwrap();
    assert_eq!(decoded, group);
    assert_eq!(decoded.to_bytes().unwrap(), bytes);
}

#[test]
fn test_mogp_size_is_patched() {
    let bytes = full_group().to_bytes().unwrap();
    let size = u32::from_le_bytes(bytes[16..20].try_into().unwrap());
    assert_eq!(size as usize, bytes.len() - 20);
}

#[test_case(WmoGroupFlags::empty() ; "no optional chunks")]
#[test_case(WmoGroupFlags::HAS_COLLISION ; "collision")]
#[test_case(WmoGroupFlags::HAS_LIGHTS.union(WmoGroupFlags::HAS_DOODADS) ; "lights and doodads")]
#[test_case(
    WmoGroupFlags::HAS_VERTEX_COLORS.union(WmoGroupFlags::HAS_TWO_VERTEX_COLORS) ;
    "both colour sets"
)]
#[test_case(WmoGroupFlags::HAS_WATER ; "liquid")]
#[test_case(
    WmoGroupFlags::HAS_TWO_TEX_COORDS.union(WmoGroupFlags::HAS_COLLISION) ;
    "second uv and collision"
)]
#[test_case(WmoGroupFlags::GATING ; "everything")]
fn test_gating_round_trip(flags: WmoGroupFlags) {
    let group = restrict(full_group(), flags);
    let bytes = group.to_bytes().unwrap();
    let decoded = WmoGroupFile::read(&mut Cursor::new(&bytes)).unwrap();

    assert_eq!(decoded.header.flags, group.header.flags);
    assert_eq!(decoded, group);

    let mut expected = vec![
        chunks::MOPY,
        chunks::MOVI,
        chunks::MOVT,
        chunks::MONR,
        chunks::MOTV,
        chunks::MOBA,
    ];
    for (flag, ids) in [
        (WmoGroupFlags::HAS_LIGHTS, &[chunks::MOLR][..]),
        (WmoGroupFlags::HAS_DOODADS, &[chunks::MODR]),
        (WmoGroupFlags::HAS_COLLISION, &[chunks::MOBN, chunks::MOBR]),
        (WmoGroupFlags::HAS_VERTEX_COLORS, &[chunks::MOCV]),
        (WmoGroupFlags::HAS_WATER, &[chunks::MLIQ]),
        (WmoGroupFlags::HAS_TWO_TEX_COORDS, &[chunks::MOTV]),
        (WmoGroupFlags::HAS_TWO_VERTEX_COLORS, &[chunks::MOCV]),
    ] {
        if flags.contains(flag) {
            expected.extend_from_slice(ids);
        }
    }
    assert_eq!(sub_chunks(&bytes), expected);
}

#[test]
fn test_flag_without_chunk_is_corrupt() {
    let group = restrict(full_group(), WmoGroupFlags::empty());
    let mut bytes = group.to_bytes().unwrap();

    // Announce vertex colours that were never written
    let flags_at = 12 + 8 + 8;
    let flags = WmoGroupFlags::HAS_VERTEX_COLORS.bits();
    bytes[flags_at..flags_at + 4].copy_from_slice(&flags.to_le_bytes());

    let result = WmoGroupFile::read(&mut Cursor::new(&bytes));
    assert!(matches!(
        result,
        Err(WmoError::CorruptChunk { chunk, .. }) if chunk == chunks::MOCV
    ));
}

#[test]
fn test_chunk_without_flag_is_corrupt() {
    let group = restrict(full_group(), WmoGroupFlags::HAS_LIGHTS);
    let mut bytes = group.to_bytes().unwrap();

    let flags_at = 12 + 8 + 8;
    let flags = u32::from_le_bytes(bytes[flags_at..flags_at + 4].try_into().unwrap())
        & !WmoGroupFlags::HAS_LIGHTS.bits();
    bytes[flags_at..flags_at + 4].copy_from_slice(&flags.to_le_bytes());

    let result = WmoGroupFile::read(&mut Cursor::new(&bytes));
    assert!(matches!(
        result,
        Err(WmoError::CorruptChunk { chunk, .. }) if chunk == chunks::MOLR
    ));
}

#[test]
fn test_wrong_gated_chunk_is_corrupt() {
    let group = restrict(
        full_group(),
        WmoGroupFlags::HAS_LIGHTS | WmoGroupFlags::HAS_DOODADS,
    );
    let mut bytes = group.to_bytes().unwrap();

    // Drop HAS_LIGHTS: the reader then expects MODR but finds MOLR
    let flags_at = 12 + 8 + 8;
    let flags = u32::from_le_bytes(bytes[flags_at..flags_at + 4].try_into().unwrap())
        & !WmoGroupFlags::HAS_LIGHTS.bits();
    bytes[flags_at..flags_at + 4].copy_from_slice(&flags.to_le_bytes());

    let result = WmoGroupFile::read(&mut Cursor::new(&bytes));
    assert!(matches!(
        result,
        Err(WmoError::CorruptChunk { chunk, .. }) if chunk == chunks::MODR
    ));
}

#[test]
fn test_water_flag_without_liquid_cannot_be_written() {
    let mut group = restrict(full_group(), WmoGroupFlags::empty());
    group.header.flags |= WmoGroupFlags::HAS_WATER;
    assert!(matches!(
        group.to_bytes(),
        Err(WmoError::CorruptChunk { chunk, .. }) if chunk == chunks::MLIQ
    ));
}

#[test]
fn test_truncated_group() {
    let bytes = full_group().to_bytes().unwrap();
    let result = WmoGroupFile::read(&mut Cursor::new(&bytes[..bytes.len() - 3]));
    assert!(matches!(result, Err(WmoError::TruncatedInput)));
}

#[test]
fn test_collision_tree_covers_every_triangle() {
    let group = full_group();
    let mut covered = vec![false; group.triangle_count()];
    for node in group.bsp.nodes.iter().filter(|node| node.is_leaf()) {
        let start = node.first_face as usize;
        for &face in &group.bsp.faces[start..start + usize::from(node.face_count)] {
            covered[usize::from(face)] = true;
        }
    }
    assert!(covered.into_iter().all(|c| c));
}
