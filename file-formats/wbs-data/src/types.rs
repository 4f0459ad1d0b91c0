use std::io::{Read, Seek, SeekFrom, Write};

use crate::error::Result;

/// Decodes a value from a little-endian byte stream.
pub trait WowDataR: Sized {
    fn wow_read<R: Read>(reader: &mut R) -> Result<Self>;
}

/// Encodes a value to a little-endian byte stream.
pub trait WowDataW {
    fn wow_write<W: Write>(&self, writer: &mut W) -> Result<()>;
    fn wow_size(&self) -> usize;
}

/// A record with a format-mandated, fixed serialized size.
///
/// Chunk payloads made of such records derive their element count as
/// `chunk_size / SIZE`.
pub trait WowStruct: WowDataR + WowDataW {
    const SIZE: usize;
}

pub trait WowReader: Read + Sized {
    fn wow_read<T: WowDataR>(&mut self) -> Result<T> {
        T::wow_read(self)
    }

    /// Read `count` consecutive records
    fn wow_read_vec<T: WowDataR>(&mut self, count: usize) -> Result<Vec<T>> {
        let mut items = Vec::with_capacity(count.min(0x10000));
        for _ in 0..count {
            items.push(T::wow_read(self)?);
        }
        Ok(items)
    }
}
impl<R: Read> WowReader for R {}

pub trait WowWriter: Write + Sized {
    fn wow_write<T: WowDataW>(&mut self, value: &T) -> Result<()> {
        value.wow_write(self)
    }

    fn wow_write_slice<T: WowDataW>(&mut self, values: &[T]) -> Result<()> {
        for value in values {
            value.wow_write(self)?;
        }
        Ok(())
    }
}
impl<W: Write> WowWriter for W {}

/// Serialized size of a slice of records
pub fn slice_size<T: WowDataW>(values: &[T]) -> usize {
    values.iter().map(WowDataW::wow_size).sum()
}

/// A `(count, offset)` reference to a block of records elsewhere in the file.
///
/// The offset is absolute from the start of the file that contains the block.
#[derive(Debug, PartialEq, Eq)]
pub struct WowArray<T> {
    pub count: u32,
    pub offset: u32,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Clone for WowArray<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for WowArray<T> {}

impl<T> Default for WowArray<T> {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl<T> WowArray<T> {
    pub fn new(count: u32, offset: u32) -> Self {
        Self {
            count,
            offset,
            _phantom: std::marker::PhantomData,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn add_offset(&mut self, offset: usize) {
        self.offset += offset as u32;
    }
}

impl<T: WowDataR> WowArray<T> {
    /// Seek to the referenced block and decode every record in it
    pub fn wow_read_to_vec<R: Read + Seek>(&self, reader: &mut R) -> Result<Vec<T>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }

        reader.seek(SeekFrom::Start(u64::from(self.offset)))?;
        reader.wow_read_vec(self.count as usize)
    }
}

impl<T> WowDataR for WowArray<T> {
    fn wow_read<R: Read>(reader: &mut R) -> Result<Self> {
        let count: u32 = reader.wow_read()?;
        let offset: u32 = reader.wow_read()?;
        Ok(Self::new(count, offset))
    }
}

impl<T> WowDataW for WowArray<T> {
    fn wow_write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.wow_write(&self.count)?;
        writer.wow_write(&self.offset)
    }

    fn wow_size(&self) -> usize {
        Self::SIZE
    }
}

impl<T> WowStruct for WowArray<T> {
    const SIZE: usize = 8;
}
