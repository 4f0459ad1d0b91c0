//! Little-endian record codec shared by the WMO, M2 and skin crates.
//!
//! Every on-disk structure implements [`WowDataR`](types::WowDataR) and
//! [`WowDataW`](types::WowDataW); fixed-size records additionally implement
//! [`WowStruct`](types::WowStruct) so chunk payloads can be split into elements.

pub mod error;
mod macros;
pub mod math;
pub mod std_impls;
pub mod types;

pub mod prelude {
    pub use crate::error::{Result, WowDataError};
    pub use crate::math::{
        BoundingBox, BoundingSphere, C2Vector, C3Vector, C9Vector, Color, Plane, Quaternion,
        Quaternion16,
    };
    pub use crate::types::{
        WowArray, WowDataR, WowDataW, WowReader, WowStruct, WowWriter, slice_size,
    };
    pub use crate::{wow_flags, wow_record};
    pub use byteorder::{ReadBytesExt, WriteBytesExt};
    pub use std::io::{Read, Seek, Write};
}
