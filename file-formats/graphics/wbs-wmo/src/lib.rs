//! # WMO (World Map Object) codec and assembler
//!
//! Reads and writes version 17 WMO root and group files and assembles them
//! from plain mesh data, including the BSP collision tree each group carries.
//!
//! ## Reading
//!
//! ```no_run
//! use wbs_wmo::WmoFile;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let wmo = WmoFile::open("Keep.wmo")?;
//! println!("Groups: {}", wmo.groups.len());
//! println!("Materials: {}", wmo.root.materials.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Assembling
//!
//! ```no_run
//! use wbs_data::math::{BoundingBox, C2Vector, C3Vector};
//! use wbs_wmo::{
//!     BatchClass, BspOptions, MeshTriangle, WmoFile, WmoGroupFile, WmoGroupFlags, WmoGroupMesh,
//!     WmoMaterialDefinition, WmoPolyFlags, WmoRootFile,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut root = WmoRootFile::new();
//! let material = root.add_material(&WmoMaterialDefinition {
//!     texture1: "dungeons/textures/wall.blp".to_string(),
//!     ..WmoMaterialDefinition::default()
//! })?;
//!
//! let index = root.add_group("Hall", "", WmoGroupFlags::INTERIOR, BoundingBox::zero());
//! let mesh = WmoGroupMesh {
//!     positions: vec![
//!         C3Vector::new(0.0, 0.0, 0.0),
//!         C3Vector::new(4.0, 0.0, 0.0),
//!         C3Vector::new(0.0, 4.0, 0.0),
//!     ],
//!     normals: vec![C3Vector::new(0.0, 0.0, 1.0); 3],
//!     tex_coords: vec![C2Vector::default(); 3],
//!     triangles: vec![MeshTriangle {
//!         indices: [0, 1, 2],
//!         material_id: material,
//!         flags: WmoPolyFlags::RENDER,
//!         batch_class: BatchClass::Interior,
//!     }],
//!     ..WmoGroupMesh::default()
//! };
//! let header = root.group_header(index).unwrap_or_default();
//! let group = WmoGroupFile::from_mesh(&mesh, header, &BspOptions::default())?;
//!
//! let mut wmo = WmoFile::new(root, vec![group]);
//! wmo.save("Hall.wmo")?;
//! # Ok(())
//! # }
//! ```

pub mod bsp;
pub mod chunk;
pub mod collision;
pub mod error;
pub mod file;
pub mod group;
pub mod root;
pub mod string_table;
pub mod validator;
pub mod wmo_group_types;
pub mod wmo_types;

pub use bsp::{BspOptions, BspStats, BspTree, point_in_group};
pub use chunk::{ChunkHeader, ChunkId, ChunkInfo, scan_chunks};
pub use collision::{Aabb, aabb_triangle_overlap, bounding_box};
pub use error::{Result, WmoError};
pub use file::{WmoFile, WmoFileType, detect_file_type, group_filename};
pub use group::{BatchClass, MeshTriangle, WmoGroupFile, WmoGroupMesh};
pub use root::WmoRootFile;
pub use string_table::StringTable;
pub use validator::{ValidationError, ValidationReport, ValidationWarning, WmoValidator};
pub use wmo_group_types::*;
pub use wmo_types::*;
