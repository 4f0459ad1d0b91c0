use wbs_data::prelude::*;

use crate::error::Result;

/// Alignment of every block in a data section
pub const BLOCK_ALIGNMENT: usize = 16;

/// The variable-size part of an M2, skin or `.anim` file.
///
/// Blocks are appended during the first write pass and addressed by the
/// absolute offset they will have once the section is placed after a header
/// of `base` bytes.
#[derive(Debug, Clone, Default)]
pub struct DataSection {
    base: usize,
    bytes: Vec<u8>,
}

impl DataSection {
    pub fn new(base: usize) -> Self {
        Self {
            base,
            bytes: Vec::new(),
        }
    }

    /// Absolute offset of the next byte
    pub fn position(&self) -> usize {
        self.base + self.bytes.len()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn align(&mut self) {
        let padding = self.position().next_multiple_of(BLOCK_ALIGNMENT) - self.position();
        self.bytes.resize(self.bytes.len() + padding, 0);
    }

    /// Append a block of records. Empty slices take no space and produce a
    /// `(0, 0)` reference.
    pub fn push_slice<T: WowDataW>(&mut self, values: &[T]) -> Result<WowArray<T>> {
        if values.is_empty() {
            return Ok(WowArray::default());
        }

        self.align();
        let offset = self.position();
        self.bytes.reserve(slice_size(values));
        self.bytes.wow_write_slice(values)?;
        Ok(WowArray::new(values.len() as u32, offset as u32))
    }

    /// Append a NUL terminated string; the count includes the terminator
    pub fn push_str(&mut self, value: &str) -> Result<WowArray<u8>> {
        if value.is_empty() {
            return Ok(WowArray::default());
        }

        let mut bytes = Vec::with_capacity(value.len() + 1);
        bytes.extend_from_slice(value.as_bytes());
        bytes.push(0);
        self.push_slice(&bytes)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Decode a NUL terminated string block
pub fn read_string<R: Read + Seek>(reader: &mut R, array: WowArray<u8>) -> Result<String> {
    let bytes = array.wow_read_to_vec(reader)?;
    let end = memchr::memchr(0, &bytes).unwrap_or(bytes.len());
    Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
}
