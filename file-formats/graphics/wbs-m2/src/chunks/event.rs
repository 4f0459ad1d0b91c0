use wbs_data::math::C3Vector;
use wbs_data::prelude::*;

use crate::block::{BlockReader, BlockWriter, M2Record};
use crate::error::Result;
use crate::track::{M2Timeline, M2TimelineHeader};

wow_record! {
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct M2EventHeader {
        pub identifier: [u8; 4],
        pub data: u32,
        pub bone: u32,
        pub position: C3Vector,
        pub enabled: M2TimelineHeader,
    }
}

/// A timed event such as a footstep sound or a spell effect
#[derive(Debug, Clone, PartialEq, Default)]
pub struct M2Event {
    /// Four character code, for example `$CSD`
    pub identifier: [u8; 4],
    pub data: u32,
    pub bone: u32,
    pub position: C3Vector,
    /// When the event fires
    pub enabled: M2Timeline,
}

impl M2Event {
    pub fn identifier_str(&self) -> String {
        self.identifier.escape_ascii().to_string()
    }
}

impl M2Record for M2Event {
    type Raw = M2EventHeader;

    fn resolve<R: Read + Seek>(raw: &Self::Raw, blocks: &mut BlockReader<'_, R>) -> Result<Self> {
        Ok(Self {
            identifier: raw.identifier,
            data: raw.data,
            bone: raw.bone,
            position: raw.position,
            enabled: blocks.timeline(&raw.enabled)?,
        })
    }

    fn store(&self, blocks: &mut BlockWriter) -> Result<Self::Raw> {
        Ok(M2EventHeader {
            identifier: self.identifier,
            data: self.data,
            bone: self.bone,
            position: self.position,
            enabled: blocks.timeline(&self.enabled)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_event_header_size() {
        assert_eq!(M2EventHeader::SIZE, 36);
    }

    #[test]
    fn test_identifier_str() {
        let event = M2Event {
            identifier: *b"$CSD",
            ..M2Event::default()
        };
        assert_eq!(event.identifier_str(), "$CSD");
    }
}
