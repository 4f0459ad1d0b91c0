//! # M2 model, skin and `.anim` codec
//!
//! Reads and writes Wrath of the Lich King (version 264) `MD20` models, their
//! `.skin` profiles and the `.anim` files that hold the keys of sequences not
//! embedded in the model. Models are written in two passes: every block is
//! laid out in a data section first, then the header is written with the
//! final offsets.
//!
//! ## Reading
//!
//! ```no_run
//! use wbs_m2::M2File;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let m2 = M2File::open("Creature/Kobold/Kobold.m2")?;
//! println!("Sequences: {}", m2.model.sequences.len());
//! println!("Skins: {}", m2.skins.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Writing with `.anim` files
//!
//! ```no_run
//! use std::io::Cursor;
//! use wbs_m2::{M2Model, M2WriteOptions, NoAnimFiles};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = std::fs::read("Kobold.m2")?;
//! let model = M2Model::read(&mut Cursor::new(bytes), &NoAnimFiles)?;
//!
//! let mut out = Vec::new();
//! let options = M2WriteOptions { split_anims: true };
//! for anim in model.write(&mut out, &options)? {
//!     std::fs::write(anim.filename("Kobold.m2"), &anim.data)?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod anim;
pub mod block;
pub mod chunks;
pub mod data_section;
pub mod error;
pub mod file;
pub mod header;
pub mod model;
pub mod skin;
pub mod track;

pub use anim::{
    AnimDirectory, AnimFile, AnimFileProvider, M2WriteOptions, NoAnimFiles, anim_filename,
};
pub use block::{BlockReader, BlockWriter, M2Record, TrackSource};
pub use chunks::*;
pub use data_section::DataSection;
pub use error::{M2Error, Result};
pub use file::M2File;
pub use header::{HEADER_SIZE, M2_MAGIC, M2_VERSION, M2Header, M2ModelFlags};
pub use model::M2Model;
pub use skin::{M2Skin, SkinSubmesh, SkinTextureUnit, skin_filename};
pub use track::{
    M2FakeTrack, M2FakeTrackHeader, M2InterpolationType, M2SplineKey, M2Timeline, M2Track,
    M2TrackHeader, NO_GLOBAL_SEQUENCE,
};
