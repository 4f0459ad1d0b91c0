use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::Result;
use crate::types::{WowDataR, WowDataW, WowStruct};

macro_rules! impl_le_primitive {
    ($ty:ty, $size:expr, $read:ident, $write:ident) => {
        impl WowDataR for $ty {
            fn wow_read<R: Read>(reader: &mut R) -> Result<Self> {
                Ok(reader.$read::<LittleEndian>()?)
            }
        }
        impl WowDataW for $ty {
            fn wow_write<W: Write>(&self, writer: &mut W) -> Result<()> {
                writer.$write::<LittleEndian>(*self)?;
                Ok(())
            }

            fn wow_size(&self) -> usize {
                $size
            }
        }
        impl WowStruct for $ty {
            const SIZE: usize = $size;
        }
    };
}

impl_le_primitive!(u16, 2, read_u16, write_u16);
impl_le_primitive!(i16, 2, read_i16, write_i16);
impl_le_primitive!(u32, 4, read_u32, write_u32);
impl_le_primitive!(i32, 4, read_i32, write_i32);
impl_le_primitive!(f32, 4, read_f32, write_f32);

impl WowDataR for u8 {
    fn wow_read<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(reader.read_u8()?)
    }
}
impl WowDataW for u8 {
    fn wow_write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(*self)?;
        Ok(())
    }

    fn wow_size(&self) -> usize {
        1
    }
}
impl WowStruct for u8 {
    const SIZE: usize = 1;
}

impl WowDataR for i8 {
    fn wow_read<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(reader.read_i8()?)
    }
}
impl WowDataW for i8 {
    fn wow_write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_i8(*self)?;
        Ok(())
    }

    fn wow_size(&self) -> usize {
        1
    }
}
impl WowStruct for i8 {
    const SIZE: usize = 1;
}

impl<T: WowStruct + Copy + Default, const N: usize> WowDataR for [T; N] {
    fn wow_read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut items = [T::default(); N];
        for item in &mut items {
            *item = T::wow_read(reader)?;
        }
        Ok(items)
    }
}
impl<T: WowStruct + Copy + Default, const N: usize> WowDataW for [T; N] {
    fn wow_write<W: Write>(&self, writer: &mut W) -> Result<()> {
        for item in self {
            item.wow_write(writer)?;
        }
        Ok(())
    }

    fn wow_size(&self) -> usize {
        T::SIZE * N
    }
}
impl<T: WowStruct + Copy + Default, const N: usize> WowStruct for [T; N] {
    const SIZE: usize = T::SIZE * N;
}

#[cfg(test)]
mod tests {
    use crate::types::{WowReader, WowWriter};
    use std::io::Cursor;

    #[test]
    fn test_u16_read_write() {
        let mut cursor = Cursor::new([0x34, 0x12]);
        let value: u16 = cursor.wow_read().unwrap();
        assert_eq!(value, 0x1234);

        let mut data = Vec::new();
        data.wow_write(&-2_i16).unwrap();
        assert_eq!(data, [0xFE, 0xFF]);
    }

    #[test]
    fn test_f32_read_write() {
        let mut data = Vec::new();
        data.wow_write(&1.0_f32).unwrap();
        assert_eq!(data, [0x00, 0x00, 0x80, 0x3F]);

        let value: f32 = Cursor::new(data).wow_read().unwrap();
        assert_eq!(value, 1.0);
    }

    #[test]
    fn test_array_read_write() {
        let mut cursor = Cursor::new([0x01, 0x00, 0x02, 0x00, 0x03, 0x00]);
        let values: [u16; 3] = cursor.wow_read().unwrap();
        assert_eq!(values, [1, 2, 3]);

        let mut data = Vec::new();
        data.wow_write(&[7_u8, 8, 9, 10]).unwrap();
        assert_eq!(data, [7, 8, 9, 10]);
    }
}
