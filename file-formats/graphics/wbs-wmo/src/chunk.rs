use std::fmt;
use std::io::{Cursor, Read, Seek, SeekFrom, Write};

use log::trace;
use wbs_data::prelude::*;

use crate::error::{Result, WmoError};

/// A 4-byte chunk identifier in its readable order (`MVER`, not `REVM`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkId(pub [u8; 4]);

impl ChunkId {
    pub const UNKNOWN: Self = Self(*b"????");

    /// Create a new chunk identifier from a 4-byte array
    pub const fn new(array: [u8; 4]) -> Self {
        Self(array)
    }

    /// Create a new chunk identifier from a static string
    ///
    /// # Panics
    ///
    /// Panics if the string is not exactly 4 bytes
    pub const fn from_str(s: &str) -> Self {
        assert!(s.len() == 4, "ChunkId must be exactly 4 bytes");
        let bytes = s.as_bytes();
        Self([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Get the raw bytes of this chunk identifier
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Bytes as stored in the file
    pub fn to_disk(self) -> [u8; 4] {
        let mut bytes = self.0;
        bytes.reverse();
        bytes
    }

    pub fn from_disk(mut bytes: [u8; 4]) -> Self {
        bytes.reverse();
        Self(bytes)
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.iter().all(|&b| b.is_ascii_graphic()) {
            write!(f, "{}", String::from_utf8_lossy(&self.0))
        } else {
            write!(
                f,
                "0x{:02X}{:02X}{:02X}{:02X}",
                self.0[0], self.0[1], self.0[2], self.0[3]
            )
        }
    }
}

/// Chunk identifiers used by version 17 root and group files
pub mod chunks {
    use super::ChunkId;

    pub const MVER: ChunkId = ChunkId::from_str("MVER");

    // Root
    pub const MOHD: ChunkId = ChunkId::from_str("MOHD");
    pub const MOTX: ChunkId = ChunkId::from_str("MOTX");
    pub const MOMT: ChunkId = ChunkId::from_str("MOMT");
    pub const MOGN: ChunkId = ChunkId::from_str("MOGN");
    pub const MOGI: ChunkId = ChunkId::from_str("MOGI");
    pub const MOSB: ChunkId = ChunkId::from_str("MOSB");
    pub const MOPV: ChunkId = ChunkId::from_str("MOPV");
    pub const MOPT: ChunkId = ChunkId::from_str("MOPT");
    pub const MOPR: ChunkId = ChunkId::from_str("MOPR");
    pub const MOVV: ChunkId = ChunkId::from_str("MOVV");
    pub const MOVB: ChunkId = ChunkId::from_str("MOVB");
    pub const MOLT: ChunkId = ChunkId::from_str("MOLT");
    pub const MODS: ChunkId = ChunkId::from_str("MODS");
    pub const MODN: ChunkId = ChunkId::from_str("MODN");
    pub const MODD: ChunkId = ChunkId::from_str("MODD");
    pub const MFOG: ChunkId = ChunkId::from_str("MFOG");
    pub const MCVP: ChunkId = ChunkId::from_str("MCVP");

    // Group
    pub const MOGP: ChunkId = ChunkId::from_str("MOGP");
    pub const MOPY: ChunkId = ChunkId::from_str("MOPY");
    pub const MOVI: ChunkId = ChunkId::from_str("MOVI");
    pub const MOVT: ChunkId = ChunkId::from_str("MOVT");
    pub const MONR: ChunkId = ChunkId::from_str("MONR");
    pub const MOTV: ChunkId = ChunkId::from_str("MOTV");
    pub const MOBA: ChunkId = ChunkId::from_str("MOBA");
    pub const MOLR: ChunkId = ChunkId::from_str("MOLR");
    pub const MODR: ChunkId = ChunkId::from_str("MODR");
    pub const MOBN: ChunkId = ChunkId::from_str("MOBN");
    pub const MOBR: ChunkId = ChunkId::from_str("MOBR");
    pub const MOCV: ChunkId = ChunkId::from_str("MOCV");
    pub const MLIQ: ChunkId = ChunkId::from_str("MLIQ");
}

/// Represents a chunk header in a WMO file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    /// 4-byte chunk identifier (magic)
    pub id: ChunkId,
    /// Size of the chunk data in bytes (not including this header)
    pub size: u32,
}

impl ChunkHeader {
    /// Size of a chunk header in bytes
    pub const SIZE: usize = 8;

    pub fn new(id: ChunkId, size: u32) -> Self {
        Self { id, size }
    }

    /// Read a chunk header from a reader
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let id: [u8; 4] = reader.wow_read()?;
        let size: u32 = reader.wow_read()?;

        Ok(Self {
            id: ChunkId::from_disk(id),
            size,
        })
    }

    /// Read a chunk header and check its identifier
    pub fn read_expected<R: Read>(reader: &mut R, expected: ChunkId) -> Result<Self> {
        let header = Self::read(reader)?;
        header.expect(expected)?;
        Ok(header)
    }

    /// Write a chunk header to a writer
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.wow_write(&self.id.to_disk())?;
        writer.wow_write(&self.size)?;
        Ok(())
    }

    pub fn expect(&self, expected: ChunkId) -> Result<()> {
        if self.id == expected {
            Ok(())
        } else {
            Err(WmoError::UnexpectedMagic {
                expected,
                found: self.id,
            })
        }
    }
}

/// Read the payload of a chunk whose header was already consumed
pub fn read_chunk_payload<R: Read>(reader: &mut R, header: &ChunkHeader) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    reader
        .by_ref()
        .take(u64::from(header.size))
        .read_to_end(&mut data)?;

    if data.len() != header.size as usize {
        return Err(WmoError::TruncatedInput);
    }

    trace!("Read {} chunk ({} bytes)", header.id, header.size);
    Ok(data)
}

/// Decode a payload of fixed-size records. The payload size must be a
/// multiple of the record size.
pub fn decode_records<T: WowStruct>(header: &ChunkHeader, data: &[u8]) -> Result<Vec<T>> {
    if data.len() % T::SIZE != 0 {
        return Err(WmoError::CorruptChunk {
            chunk: header.id,
            reason: format!(
                "size {} is not a multiple of the {}-byte element",
                data.len(),
                T::SIZE
            ),
        });
    }

    let mut cursor = Cursor::new(data);
    Ok(cursor.wow_read_vec(data.len() / T::SIZE)?)
}

/// Read the next chunk, check its identifier and decode its records
pub fn read_chunk<R: Read, T: WowStruct>(reader: &mut R, expected: ChunkId) -> Result<Vec<T>> {
    let header = ChunkHeader::read_expected(reader, expected)?;
    let data = read_chunk_payload(reader, &header)?;
    decode_records(&header, &data)
}

/// Read the next chunk as raw bytes
pub fn read_raw_chunk<R: Read>(reader: &mut R, expected: ChunkId) -> Result<Vec<u8>> {
    let header = ChunkHeader::read_expected(reader, expected)?;
    read_chunk_payload(reader, &header)
}

/// Read a chunk that holds exactly one record
pub fn read_record_chunk<R: Read, T: WowStruct>(reader: &mut R, expected: ChunkId) -> Result<T> {
    let header = ChunkHeader::read_expected(reader, expected)?;
    if header.size as usize != T::SIZE {
        return Err(WmoError::CorruptChunk {
            chunk: header.id,
            reason: format!("expected {} bytes, found {}", T::SIZE, header.size),
        });
    }
    Ok(reader.wow_read()?)
}

/// Write a chunk of records. The size is computed from the records before
/// the header is written.
pub fn write_chunk<W: Write, T: WowDataW>(
    writer: &mut W,
    id: ChunkId,
    records: &[T],
) -> Result<()> {
    let size = slice_size(records);
    ChunkHeader::new(id, size as u32).write(writer)?;
    writer.wow_write_slice(records)?;
    Ok(())
}

pub fn write_raw_chunk<W: Write>(writer: &mut W, id: ChunkId, data: &[u8]) -> Result<()> {
    ChunkHeader::new(id, data.len() as u32).write(writer)?;
    writer.write_all(data)?;
    Ok(())
}

pub fn write_record_chunk<W: Write, T: WowDataW>(
    writer: &mut W,
    id: ChunkId,
    record: &T,
) -> Result<()> {
    ChunkHeader::new(id, record.wow_size() as u32).write(writer)?;
    writer.wow_write(record)?;
    Ok(())
}

/// A chunk whose header is written with a placeholder size and patched once
/// its nested content has been written
#[derive(Debug)]
pub struct ChunkPatch {
    id: ChunkId,
    header_position: u64,
}

impl ChunkPatch {
    pub fn begin<W: Write + Seek>(writer: &mut W, id: ChunkId) -> Result<Self> {
        let header_position = writer.stream_position()?;
        ChunkHeader::new(id, 0).write(writer)?;
        Ok(Self {
            id,
            header_position,
        })
    }

    /// Seek back, write the final size and return to the end of the chunk
    pub fn finish<W: Write + Seek>(self, writer: &mut W) -> Result<u32> {
        let end = writer.stream_position()?;
        let size = (end - self.header_position - ChunkHeader::SIZE as u64) as u32;

        writer.seek(SeekFrom::Start(self.header_position))?;
        ChunkHeader::new(self.id, size).write(writer)?;
        writer.seek(SeekFrom::Start(end))?;

        Ok(size)
    }
}

/// A chunk located in a stream without decoding its payload
#[derive(Debug, Clone, Copy)]
pub struct ChunkInfo {
    pub header: ChunkHeader,
    /// Position of the chunk header in the stream
    pub offset: u64,
}

/// List the top-level chunks of a stream
pub fn scan_chunks<R: Read + Seek>(reader: &mut R) -> Result<Vec<ChunkInfo>> {
    let end = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(0))?;

    let mut found = Vec::new();
    loop {
        let offset = reader.stream_position()?;
        if end.saturating_sub(offset) < ChunkHeader::SIZE as u64 {
            break;
        }

        let header = ChunkHeader::read(reader)?;
        found.push(ChunkInfo { header, offset });
        reader.seek(SeekFrom::Current(i64::from(header.size)))?;
    }

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_chunk_header_disk_order() {
        let mut data = Vec::new();
        ChunkHeader::new(chunks::MVER, 4).write(&mut data).unwrap();
        assert_eq!(data, b"REVM\x04\x00\x00\x00");

        let header = ChunkHeader::read(&mut Cursor::new(&data)).unwrap();
        assert_eq!(header.id, chunks::MVER);
        assert_eq!(header.size, 4);
    }

    #[test]
    fn test_read_chunk_wrong_magic() {
        let mut data = Vec::new();
        write_chunk(&mut data, chunks::MOVI, &[1_u16, 2, 3]).unwrap();

        let result: Result<Vec<u16>> = read_chunk(&mut Cursor::new(&data), chunks::MOPY);
        assert!(matches!(
            result,
            Err(WmoError::UnexpectedMagic { expected, found })
                if expected == chunks::MOPY && found == chunks::MOVI
        ));
    }

    #[test]
    fn test_read_chunk_size_not_multiple() {
        let mut data = Vec::new();
        write_raw_chunk(&mut data, chunks::MOVT, &[0; 14]).unwrap();

        let result: Result<Vec<C3Vector>> = read_chunk(&mut Cursor::new(&data), chunks::MOVT);
        assert!(matches!(
            result,
            Err(WmoError::CorruptChunk { chunk, .. }) if chunk == chunks::MOVT
        ));
    }

    #[test]
    fn test_read_chunk_truncated() {
        let mut data = Vec::new();
        write_chunk(&mut data, chunks::MOVI, &[1_u16, 2, 3]).unwrap();
        data.truncate(data.len() - 1);

        let result: Result<Vec<u16>> = read_chunk(&mut Cursor::new(&data), chunks::MOVI);
        assert!(matches!(result, Err(WmoError::TruncatedInput)));

        let result = ChunkHeader::read(&mut Cursor::new(&data[..5]));
        assert!(matches!(result, Err(WmoError::TruncatedInput)));
    }

    #[test]
    fn test_chunk_patch() {
        let mut cursor = Cursor::new(Vec::new());
        let patch = ChunkPatch::begin(&mut cursor, chunks::MOGP).unwrap();
        write_chunk(&mut cursor, chunks::MOVI, &[7_u16, 8]).unwrap();
        let size = patch.finish(&mut cursor).unwrap();

        assert_eq!(size, 12);
        let data = cursor.into_inner();
        assert_eq!(&data[..8], b"PGOM\x0C\x00\x00\x00");
        assert_eq!(data.len(), 20);
    }

    #[test]
    fn test_scan_chunks() {
        let mut data = Vec::new();
        write_record_chunk(&mut data, chunks::MVER, &17_u32).unwrap();
        write_chunk(&mut data, chunks::MOVI, &[0_u16; 3]).unwrap();

        let found = scan_chunks(&mut Cursor::new(&data)).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].header.id, chunks::MOVI);
        assert_eq!(found[1].offset, 12);
        assert_eq!(found[1].header.size, 6);
    }
}
