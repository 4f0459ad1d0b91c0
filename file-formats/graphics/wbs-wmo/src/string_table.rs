use std::borrow::Cow;

/// Pool of NUL-terminated strings addressed by byte offset (`MOTX`, `MOGN`, `MODN`).
///
/// Every string starts on a 4-byte boundary. The table is append-only;
/// de-duplication is left to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringTable {
    data: Vec<u8>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn pad(&mut self) {
        let padded = self.data.len().next_multiple_of(4);
        self.data.resize(padded, 0);
    }

    /// Append `s` and return the offset it starts at. Two calls with the same
    /// string return two different offsets.
    pub fn add_string(&mut self, s: &str) -> u32 {
        self.pad();
        let offset = self.data.len() as u32;
        self.data.extend_from_slice(s.as_bytes());
        self.data.push(0);
        self.pad();
        offset
    }

    /// String starting at `offset`. Offsets past the end give an empty string.
    pub fn get_string(&self, offset: u32) -> Cow<'_, str> {
        let Some(tail) = self.data.get(offset as usize..) else {
            return Cow::Borrowed("");
        };
        let end = memchr::memchr(0, tail).unwrap_or(tail.len());
        String::from_utf8_lossy(&tail[..end])
    }

    /// Every non-empty string in the table, in order
    pub fn get_all_strings(&self) -> Vec<String> {
        self.entries().into_iter().map(|(_, s)| s).collect()
    }

    /// Every non-empty string together with its offset
    pub fn entries(&self) -> Vec<(u32, String)> {
        let mut entries = Vec::new();
        let mut start = 0;
        for end in memchr::memchr_iter(0, &self.data).chain(std::iter::once(self.data.len())) {
            if end > start {
                let s = String::from_utf8_lossy(&self.data[start..end]).into_owned();
                entries.push((start as u32, s));
            }
            start = end + 1;
        }
        entries
    }
}
