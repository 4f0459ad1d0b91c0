//! Reading and writing the blocks referenced from the M2 header.
//!
//! Records that point at further data (animated tracks, strings) implement
//! [`M2Record`]: they are decoded from their on-disk form through a
//! [`BlockReader`] and encoded back through a [`BlockWriter`], which places
//! the referenced data before the records themselves.

use std::io::Cursor;

use log::trace;
use wbs_data::prelude::*;

use crate::data_section::{DataSection, read_string};
use crate::error::{M2Error, Result};
use crate::track::{
    M2FakeTrack, M2FakeTrackHeader, M2Timeline, M2TimelineHeader, M2Track, M2TrackHeader,
};

/// Where the per-sequence arrays of animated tracks are stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackSource {
    /// In the model file
    Model,
    /// In the sequence's `.anim` file, whose contents are given
    Anim(Vec<u8>),
    /// In an `.anim` file that is not available; the arrays decode empty
    Unavailable,
}

/// A record whose on-disk form references other blocks
pub trait M2Record: Sized {
    type Raw: WowStruct;

    fn resolve<R: Read + Seek>(raw: &Self::Raw, blocks: &mut BlockReader<'_, R>) -> Result<Self>;

    fn store(&self, blocks: &mut BlockWriter) -> Result<Self::Raw>;
}

pub struct BlockReader<'a, R> {
    reader: &'a mut R,
    sources: Vec<TrackSource>,
}

impl<'a, R: Read + Seek> BlockReader<'a, R> {
    /// `sources[i]` tells where the arrays of sequence `i` live
    pub fn new(reader: &'a mut R, sources: Vec<TrackSource>) -> Self {
        Self { reader, sources }
    }

    pub fn array<T: WowDataR>(&mut self, array: WowArray<T>) -> Result<Vec<T>> {
        Ok(array.wow_read_to_vec(&mut *self.reader)?)
    }

    pub fn string(&mut self, array: WowArray<u8>) -> Result<String> {
        read_string(&mut *self.reader, array)
    }

    pub fn records<A: M2Record>(&mut self, array: WowArray<A::Raw>) -> Result<Vec<A>> {
        let raw = self.array(array)?;
        raw.iter().map(|raw| A::resolve(raw, self)).collect()
    }

    fn per_sequence<T: WowDataR>(
        &mut self,
        sequence: usize,
        global: bool,
        array: WowArray<T>,
    ) -> Result<Vec<T>> {
        if array.is_empty() {
            return Ok(Vec::new());
        }

        if !global {
            match self.sources.get(sequence) {
                Some(TrackSource::Anim(bytes)) => {
                    return Ok(array.wow_read_to_vec(&mut Cursor::new(bytes.as_slice()))?);
                }
                Some(TrackSource::Unavailable) => {
                    trace!("Skipping {} keys of sequence {sequence}", array.count);
                    return Ok(Vec::new());
                }
                _ => {}
            }
        }
        Ok(array.wow_read_to_vec(&mut *self.reader)?)
    }

    pub fn track<T: WowDataR>(&mut self, header: &M2TrackHeader<T>) -> Result<M2Track<T>> {
        let timestamp_arrays = self.array(header.timestamps)?;
        let value_arrays = self.array(header.values)?;
        if timestamp_arrays.len() != value_arrays.len() {
            return Err(M2Error::CorruptBlock {
                block: "track",
                reason: format!(
                    "{} timestamp arrays but {} value arrays",
                    timestamp_arrays.len(),
                    value_arrays.len()
                ),
            });
        }

        let global = header.global_sequence >= 0;
        let mut track = M2Track::new(header.interpolation);
        track.global_sequence = header.global_sequence;
        for (sequence, (&timestamps, &values)) in
            timestamp_arrays.iter().zip(&value_arrays).enumerate()
        {
            let timestamps = self.per_sequence(sequence, global, timestamps)?;
            let values = self.per_sequence(sequence, global, values)?;
            if timestamps.len() != values.len() {
                return Err(M2Error::CorruptBlock {
                    block: "track",
                    reason: format!(
                        "sequence {sequence} has {} timestamps but {} values",
                        timestamps.len(),
                        values.len()
                    ),
                });
            }
            track.push_sequence(timestamps, values);
        }
        Ok(track)
    }

    pub fn timeline(&mut self, header: &M2TimelineHeader) -> Result<M2Timeline> {
        let global = header.global_sequence >= 0;
        let timestamps = self
            .array(header.timestamps)?
            .into_iter()
            .enumerate()
            .map(|(sequence, array)| self.per_sequence(sequence, global, array))
            .collect::<Result<_>>()?;

        Ok(M2Timeline {
            interpolation: header.interpolation,
            global_sequence: header.global_sequence,
            timestamps,
        })
    }

    pub fn fake_track<T: WowDataR>(
        &mut self,
        header: &M2FakeTrackHeader<T>,
    ) -> Result<M2FakeTrack<T>> {
        let timestamps = self.array(header.timestamps)?;
        let values = self.array(header.values)?;
        if timestamps.len() != values.len() {
            return Err(M2Error::CorruptBlock {
                block: "particle track",
                reason: format!("{} timestamps but {} values", timestamps.len(), values.len()),
            });
        }
        Ok(M2FakeTrack { timestamps, values })
    }
}

/// First pass of the two-pass writer.
///
/// Collects every variable block into the model's data section, or into the
/// data section of a sequence's `.anim` file for sequences that keep their
/// keys outside the model.
#[derive(Debug)]
pub struct BlockWriter {
    pub data: DataSection,
    anims: Vec<Option<DataSection>>,
}

impl BlockWriter {
    /// `external[i]` is true when sequence `i` keeps its keys in an `.anim` file
    pub fn new(header_size: usize, external: &[bool]) -> Self {
        Self {
            data: DataSection::new(header_size),
            anims: external
                .iter()
                .map(|&external| external.then(|| DataSection::new(0)))
                .collect(),
        }
    }

    pub fn records<A: M2Record>(&mut self, items: &[A]) -> Result<WowArray<A::Raw>> {
        let raw = items
            .iter()
            .map(|item| item.store(self))
            .collect::<Result<Vec<_>>>()?;
        self.data.push_slice(&raw)
    }

    fn per_sequence<T: WowDataW>(
        &mut self,
        sequence: usize,
        global: bool,
        values: &[T],
    ) -> Result<WowArray<T>> {
        if !global && let Some(Some(section)) = self.anims.get_mut(sequence) {
            return section.push_slice(values);
        }
        self.data.push_slice(values)
    }

    pub fn track<T: WowDataW>(&mut self, track: &M2Track<T>) -> Result<M2TrackHeader<T>> {
        if track.timestamps.len() != track.values.len() {
            return Err(M2Error::CorruptBlock {
                block: "track",
                reason: format!(
                    "{} timestamp arrays but {} value arrays",
                    track.timestamps.len(),
                    track.values.len()
                ),
            });
        }

        let global = track.uses_global_sequence();
        let mut timestamp_arrays = Vec::with_capacity(track.timestamps.len());
        let mut value_arrays = Vec::with_capacity(track.values.len());
        for (sequence, (timestamps, values)) in
            track.timestamps.iter().zip(&track.values).enumerate()
        {
            if timestamps.len() != values.len() {
                return Err(M2Error::CorruptBlock {
                    block: "track",
                    reason: format!(
                        "sequence {sequence} has {} timestamps but {} values",
                        timestamps.len(),
                        values.len()
                    ),
                });
            }
            timestamp_arrays.push(self.per_sequence(sequence, global, timestamps)?);
            value_arrays.push(self.per_sequence(sequence, global, values)?);
        }

        Ok(M2TrackHeader {
            interpolation: track.interpolation,
            global_sequence: track.global_sequence,
            timestamps: self.data.push_slice(&timestamp_arrays)?,
            values: self.data.push_slice(&value_arrays)?,
        })
    }

    pub fn timeline(&mut self, timeline: &M2Timeline) -> Result<M2TimelineHeader> {
        let global = timeline.global_sequence >= 0;
        let arrays = timeline
            .timestamps
            .iter()
            .enumerate()
            .map(|(sequence, timestamps)| self.per_sequence(sequence, global, timestamps))
            .collect::<Result<Vec<_>>>()?;

        Ok(M2TimelineHeader {
            interpolation: timeline.interpolation,
            global_sequence: timeline.global_sequence,
            timestamps: self.data.push_slice(&arrays)?,
        })
    }

    pub fn fake_track<T: WowDataW>(
        &mut self,
        track: &M2FakeTrack<T>,
    ) -> Result<M2FakeTrackHeader<T>> {
        if track.timestamps.len() != track.values.len() {
            return Err(M2Error::CorruptBlock {
                block: "particle track",
                reason: format!(
                    "{} timestamps but {} values",
                    track.timestamps.len(),
                    track.values.len()
                ),
            });
        }
        Ok(M2FakeTrackHeader {
            timestamps: self.data.push_slice(&track.timestamps)?,
            values: self.data.push_slice(&track.values)?,
        })
    }

    /// The model data section and, per sequence, the `.anim` data section if
    /// that sequence is external
    pub fn finish(self) -> (DataSection, Vec<Option<DataSection>>) {
        (self.data, self.anims)
    }
}

impl<T: WowStruct> M2Record for M2Track<T> {
    type Raw = M2TrackHeader<T>;

    fn resolve<R: Read + Seek>(raw: &Self::Raw, blocks: &mut BlockReader<'_, R>) -> Result<Self> {
        blocks.track(raw)
    }

    fn store(&self, blocks: &mut BlockWriter) -> Result<Self::Raw> {
        blocks.track(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::M2InterpolationType;
    use pretty_assertions::assert_eq;

    fn two_sequence_track() -> M2Track<f32> {
        let mut track = M2Track::new(M2InterpolationType::Linear);
        track.push_sequence(vec![0, 500], vec![0.0, 1.0]);
        track.push_sequence(vec![0, 250, 1000], vec![1.0, 0.5, 0.0]);
        track
    }

    fn read_back(
        bytes: Vec<u8>,
        raw: &M2TrackHeader<f32>,
        sources: Vec<TrackSource>,
    ) -> M2Track<f32> {
        let mut cursor = Cursor::new(bytes);
        BlockReader::new(&mut cursor, sources).track(raw).unwrap()
    }

    #[test]
    fn test_track_in_model() {
        let track = two_sequence_track();
        let mut writer = BlockWriter::new(0, &[false, false]);
        let raw = writer.track(&track).unwrap();
        assert_eq!(raw.timestamps.count, 2);

        let (data, anims) = writer.finish();
        assert!(anims.iter().all(Option::is_none));
        let decoded = read_back(data.into_bytes(), &raw, vec![TrackSource::Model; 2]);
        assert_eq!(decoded, track);
    }

    #[test]
    fn test_track_split_into_anim_file() {
        let track = two_sequence_track();
        let mut writer = BlockWriter::new(0, &[false, true]);
        let raw = writer.track(&track).unwrap();

        let (data, mut anims) = writer.finish();
        let anim = anims[1].take().unwrap().into_bytes();
        // 3 timestamps, padding, 3 values
        assert_eq!(anim.len(), 16 + 12);

        let sources = vec![TrackSource::Model, TrackSource::Anim(anim)];
        let decoded = read_back(data.clone().into_bytes(), &raw, sources);
        assert_eq!(decoded, track);

        let sources = vec![TrackSource::Model, TrackSource::Unavailable];
        let decoded = read_back(data.into_bytes(), &raw, sources);
        assert_eq!(decoded.values[0], track.values[0]);
        assert!(decoded.values[1].is_empty());
        assert!(decoded.timestamps[1].is_empty());
    }

    #[test]
    fn test_global_track_stays_in_model() {
        let mut track = two_sequence_track();
        track.global_sequence = 0;
        let mut writer = BlockWriter::new(0, &[true, true]);
        writer.track(&track).unwrap();

        let (_, anims) = writer.finish();
        assert!(anims.into_iter().flatten().all(|section| section.is_empty()));
    }

    #[test]
    fn test_mismatched_keys_are_rejected() {
        let mut track = two_sequence_track();
        track.values[1].pop();
        let mut writer = BlockWriter::new(0, &[]);
        assert!(matches!(
            writer.track(&track),
            Err(M2Error::CorruptBlock { block: "track", .. })
        ));
    }

    #[test]
    fn test_timeline_round_trip() {
        let timeline = M2Timeline {
            timestamps: vec![vec![100, 200], vec![], vec![50]],
            ..M2Timeline::default()
        };
        let mut writer = BlockWriter::new(64, &[false; 3]);
        let raw = writer.timeline(&timeline).unwrap();

        let mut bytes = vec![0; 64];
        bytes.extend(writer.finish().0.into_bytes());
        let mut cursor = Cursor::new(bytes);
        let decoded = BlockReader::new(&mut cursor, Vec::new())
            .timeline(&raw)
            .unwrap();
        assert_eq!(decoded, timeline);
    }

    #[test]
    fn test_fake_track_stays_in_model() {
        let track = M2FakeTrack::three_point(1.0_f32, 0.5, 0.0);
        let mut writer = BlockWriter::new(0, &[true]);
        let raw = writer.fake_track(&track).unwrap();

        let (data, anims) = writer.finish();
        assert!(anims.into_iter().flatten().all(|section| section.is_empty()));
        let mut cursor = Cursor::new(data.into_bytes());
        let decoded = BlockReader::new(&mut cursor, vec![TrackSource::Unavailable])
            .fake_track(&raw)
            .unwrap();
        assert_eq!(decoded, track);

        let mut uneven = track;
        uneven.timestamps.pop();
        assert!(matches!(
            BlockWriter::new(0, &[]).fake_track(&uneven),
            Err(M2Error::CorruptBlock { .. })
        ));
    }
}
