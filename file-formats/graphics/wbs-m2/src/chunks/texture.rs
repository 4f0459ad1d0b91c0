use bitflags::bitflags;
use wbs_data::error::{Result as WDResult, WowDataError};
use wbs_data::prelude::*;

use crate::block::{BlockReader, BlockWriter, M2Record};
use crate::error::Result;

/// Texture type as defined in the M2 format.
///
/// Every type other than `Hardcoded` is resolved by the client at runtime
/// and carries no filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum M2TextureType {
    /// Texture given by filename
    #[default]
    Hardcoded = 0,
    /// Character skin
    Body = 1,
    /// Item, capes
    Item = 2,
    WeaponBlade = 3,
    WeaponHandle = 4,
    Environment = 5,
    Hair = 6,
    FacialHair = 7,
    SkinExtra = 8,
    UiSkin = 9,
    TaurenMane = 10,
    /// Creature skin from `CreatureDisplayInfo.dbc`
    Monster1 = 11,
    Monster2 = 12,
    Monster3 = 13,
    ItemIcon = 14,
    GuildBackgroundColor = 15,
    GuildEmblemColor = 16,
    GuildBorderColor = 17,
    GuildEmblem = 18,
}

impl TryFrom<u32> for M2TextureType {
    type Error = WowDataError;

    fn try_from(value: u32) -> WDResult<Self> {
        Ok(match value {
            0 => Self::Hardcoded,
            1 => Self::Body,
            2 => Self::Item,
            3 => Self::WeaponBlade,
            4 => Self::WeaponHandle,
            5 => Self::Environment,
            6 => Self::Hair,
            7 => Self::FacialHair,
            8 => Self::SkinExtra,
            9 => Self::UiSkin,
            10 => Self::TaurenMane,
            11 => Self::Monster1,
            12 => Self::Monster2,
            13 => Self::Monster3,
            14 => Self::ItemIcon,
            15 => Self::GuildBackgroundColor,
            16 => Self::GuildEmblemColor,
            17 => Self::GuildBorderColor,
            18 => Self::GuildEmblem,
            _ => {
                return Err(WowDataError::InvalidValue {
                    field: "texture type",
                    value,
                });
            }
        })
    }
}

impl WowDataR for M2TextureType {
    fn wow_read<R: Read>(reader: &mut R) -> WDResult<Self> {
        let raw: u32 = reader.wow_read()?;
        raw.try_into()
    }
}

impl WowDataW for M2TextureType {
    fn wow_write<W: Write>(&self, writer: &mut W) -> WDResult<()> {
        writer.wow_write(&(*self as u32))
    }

    fn wow_size(&self) -> usize {
        Self::SIZE
    }
}

impl WowStruct for M2TextureType {
    const SIZE: usize = 4;
}

bitflags! {
    /// Texture flags as defined in the M2 format
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct M2TextureFlags: u32 {
        /// Texture wraps horizontally
        const WRAP_X = 0x1;
        /// Texture wraps vertically
        const WRAP_Y = 0x2;
    }
}
wow_flags!(M2TextureFlags, u32);

wow_record! {
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct M2TextureHeader {
        pub texture_type: M2TextureType,
        pub flags: M2TextureFlags,
        pub filename: WowArray<u8>,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct M2Texture {
    pub texture_type: M2TextureType,
    pub flags: M2TextureFlags,
    /// Path of a `Hardcoded` texture, empty otherwise
    pub filename: String,
}

impl M2Record for M2Texture {
    type Raw = M2TextureHeader;

    fn resolve<R: Read + Seek>(raw: &Self::Raw, blocks: &mut BlockReader<'_, R>) -> Result<Self> {
        Ok(Self {
            texture_type: raw.texture_type,
            flags: raw.flags,
            filename: blocks.string(raw.filename)?,
        })
    }

    fn store(&self, blocks: &mut BlockWriter) -> Result<Self::Raw> {
        Ok(M2TextureHeader {
            texture_type: self.texture_type,
            flags: self.flags,
            filename: blocks.data.push_str(&self.filename)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    #[test]
    fn test_texture_header_size() {
        assert_eq!(M2TextureHeader::SIZE, 16);
    }

    #[test]
    fn test_texture_round_trip() {
        let textures = vec![
            M2Texture {
                filename: "Creature\\Kobold\\Kobold.blp".to_string(),
                flags: M2TextureFlags::WRAP_X | M2TextureFlags::WRAP_Y,
                ..M2Texture::default()
            },
            M2Texture {
                texture_type: M2TextureType::Monster1,
                ..M2Texture::default()
            },
        ];

        let mut blocks = BlockWriter::new(0, &[]);
        let raw = blocks.records(&textures).unwrap();
        let mut cursor = Cursor::new(blocks.finish().0.into_bytes());
        let decoded: Vec<M2Texture> = BlockReader::new(&mut cursor, Vec::new())
            .records(raw)
            .unwrap();
        assert_eq!(decoded, textures);
    }

    #[test]
    fn test_unknown_texture_type() {
        let mut cursor = Cursor::new(99_u32.to_le_bytes());
        let result: WDResult<M2TextureType> = cursor.wow_read();
        assert!(matches!(
            result,
            Err(WowDataError::InvalidValue { value: 99, .. })
        ));
    }
}
