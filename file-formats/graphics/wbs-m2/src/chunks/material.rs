use bitflags::bitflags;
use wbs_data::error::{Result as WDResult, WowDataError};
use wbs_data::prelude::*;

bitflags! {
    /// Render flags as defined in the M2 format
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct M2RenderFlags: u16 {
        /// Unlit
        const UNLIT = 0x01;
        /// Unfogged
        const UNFOGGED = 0x02;
        /// No backface culling
        const NO_BACKFACE_CULLING = 0x04;
        /// Billboarded
        const BILLBOARD = 0x08;
        /// No z-buffer write
        const NO_ZBUFFER = 0x10;
    }
}
wow_flags!(M2RenderFlags, u16);

/// Blend modes as defined in the M2 format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum M2BlendMode {
    #[default]
    Opaque = 0,
    AlphaKey = 1,
    Alpha = 2,
    NoAlphaAdd = 3,
    Add = 4,
    Mod = 5,
    Mod2x = 6,
}

impl TryFrom<u16> for M2BlendMode {
    type Error = WowDataError;

    fn try_from(value: u16) -> WDResult<Self> {
        Ok(match value {
            0 => Self::Opaque,
            1 => Self::AlphaKey,
            2 => Self::Alpha,
            3 => Self::NoAlphaAdd,
            4 => Self::Add,
            5 => Self::Mod,
            6 => Self::Mod2x,
            _ => {
                return Err(WowDataError::InvalidValue {
                    field: "blend mode",
                    value: u32::from(value),
                });
            }
        })
    }
}

impl WowDataR for M2BlendMode {
    fn wow_read<R: Read>(reader: &mut R) -> WDResult<Self> {
        let raw: u16 = reader.wow_read()?;
        raw.try_into()
    }
}

impl WowDataW for M2BlendMode {
    fn wow_write<W: Write>(&self, writer: &mut W) -> WDResult<()> {
        writer.wow_write(&(*self as u16))
    }

    fn wow_size(&self) -> usize {
        Self::SIZE
    }
}

impl WowStruct for M2BlendMode {
    const SIZE: usize = 2;
}

wow_record! {
    /// Render state of a texture unit, 4 bytes
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct M2Material {
        pub flags: M2RenderFlags,
        pub blend_mode: M2BlendMode,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    #[test]
    fn test_material_layout() {
        let material = M2Material {
            flags: M2RenderFlags::UNLIT | M2RenderFlags::NO_BACKFACE_CULLING,
            blend_mode: M2BlendMode::Add,
        };
        let mut data = Vec::new();
        data.wow_write(&material).unwrap();
        assert_eq!(data, [0x05, 0x00, 0x04, 0x00]);

        let read: M2Material = Cursor::new(data).wow_read().unwrap();
        assert_eq!(read, material);
    }
}
