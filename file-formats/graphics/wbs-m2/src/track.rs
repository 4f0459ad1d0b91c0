use wbs_data::prelude::*;
use wbs_data::error::{Result as WDResult, WowDataError};

/// Interpolation between the keys of an animated track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u16)]
pub enum M2InterpolationType {
    /// Values jump from key to key
    #[default]
    None = 0,
    Linear = 1,
    Bezier = 2,
    Hermite = 3,
}

impl TryFrom<u16> for M2InterpolationType {
    type Error = WowDataError;

    fn try_from(value: u16) -> WDResult<Self> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Linear),
            2 => Ok(Self::Bezier),
            3 => Ok(Self::Hermite),
            _ => Err(WowDataError::InvalidValue {
                field: "interpolation type",
                value: u32::from(value),
            }),
        }
    }
}

impl WowDataR for M2InterpolationType {
    fn wow_read<R: Read>(reader: &mut R) -> WDResult<Self> {
        let raw: u16 = reader.wow_read()?;
        raw.try_into()
    }
}

impl WowDataW for M2InterpolationType {
    fn wow_write<W: Write>(&self, writer: &mut W) -> WDResult<()> {
        writer.wow_write(&(*self as u16))
    }

    fn wow_size(&self) -> usize {
        Self::SIZE
    }
}

impl WowStruct for M2InterpolationType {
    const SIZE: usize = 2;
}

/// Global sequence index of a track that follows the playing sequence
pub const NO_GLOBAL_SEQUENCE: i16 = -1;

/// On-disk form of an animated track: one timestamp array and one value
/// array per sequence, each referenced through an array of `(count, offset)`
/// pairs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct M2TrackHeader<T> {
    pub interpolation: M2InterpolationType,
    pub global_sequence: i16,
    pub timestamps: WowArray<WowArray<u32>>,
    pub values: WowArray<WowArray<T>>,
}

impl<T> Default for M2TrackHeader<T> {
    fn default() -> Self {
        Self {
            interpolation: M2InterpolationType::None,
            global_sequence: NO_GLOBAL_SEQUENCE,
            timestamps: WowArray::default(),
            values: WowArray::default(),
        }
    }
}

impl<T> WowDataR for M2TrackHeader<T> {
    fn wow_read<R: Read>(reader: &mut R) -> WDResult<Self> {
        Ok(Self {
            interpolation: reader.wow_read()?,
            global_sequence: reader.wow_read()?,
            timestamps: reader.wow_read()?,
            values: reader.wow_read()?,
        })
    }
}

impl<T> WowDataW for M2TrackHeader<T> {
    fn wow_write<W: Write>(&self, writer: &mut W) -> WDResult<()> {
        writer.wow_write(&self.interpolation)?;
        writer.wow_write(&self.global_sequence)?;
        writer.wow_write(&self.timestamps)?;
        writer.wow_write(&self.values)
    }

    fn wow_size(&self) -> usize {
        Self::SIZE
    }
}

impl<T> WowStruct for M2TrackHeader<T> {
    const SIZE: usize = 20;
}

wow_record! {
    /// On-disk form of a track that carries timestamps only (event timelines)
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    pub struct M2TimelineHeader {
        pub interpolation: M2InterpolationType,
        pub global_sequence: i16,
        pub timestamps: WowArray<WowArray<u32>>,
    }
}

/// On-disk form of a particle track: a single key array over the particle's
/// lifetime, not tied to any sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct M2FakeTrackHeader<T> {
    pub timestamps: WowArray<u16>,
    pub values: WowArray<T>,
}

impl<T> Default for M2FakeTrackHeader<T> {
    fn default() -> Self {
        Self {
            timestamps: WowArray::default(),
            values: WowArray::default(),
        }
    }
}

impl<T> WowDataR for M2FakeTrackHeader<T> {
    fn wow_read<R: Read>(reader: &mut R) -> WDResult<Self> {
        Ok(Self {
            timestamps: reader.wow_read()?,
            values: reader.wow_read()?,
        })
    }
}

impl<T> WowDataW for M2FakeTrackHeader<T> {
    fn wow_write<W: Write>(&self, writer: &mut W) -> WDResult<()> {
        writer.wow_write(&self.timestamps)?;
        writer.wow_write(&self.values)
    }

    fn wow_size(&self) -> usize {
        Self::SIZE
    }
}

impl<T> WowStruct for M2FakeTrackHeader<T> {
    const SIZE: usize = 16;
}

/// A decoded particle track. Timestamps are fractions of the particle's
/// lifetime in 1/32767 steps.
#[derive(Debug, Clone, PartialEq)]
pub struct M2FakeTrack<T> {
    pub timestamps: Vec<u16>,
    pub values: Vec<T>,
}

impl<T> Default for M2FakeTrack<T> {
    fn default() -> Self {
        Self {
            timestamps: Vec::new(),
            values: Vec::new(),
        }
    }
}

impl<T> M2FakeTrack<T> {
    /// Keys at the start, middle and end of the lifetime
    pub fn three_point(start: T, middle: T, end: T) -> Self {
        Self {
            timestamps: vec![0, 16384, 32767],
            values: vec![start, middle, end],
        }
    }
}

/// A key of a spline-interpolated camera track
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct M2SplineKey<T> {
    pub value: T,
    pub in_tangent: T,
    pub out_tangent: T,
}

impl<T: WowStruct> WowDataR for M2SplineKey<T> {
    fn wow_read<R: Read>(reader: &mut R) -> WDResult<Self> {
        Ok(Self {
            value: reader.wow_read()?,
            in_tangent: reader.wow_read()?,
            out_tangent: reader.wow_read()?,
        })
    }
}

impl<T: WowStruct> WowDataW for M2SplineKey<T> {
    fn wow_write<W: Write>(&self, writer: &mut W) -> WDResult<()> {
        writer.wow_write(&self.value)?;
        writer.wow_write(&self.in_tangent)?;
        writer.wow_write(&self.out_tangent)
    }

    fn wow_size(&self) -> usize {
        Self::SIZE
    }
}

impl<T: WowStruct> WowStruct for M2SplineKey<T> {
    const SIZE: usize = T::SIZE * 3;
}

/// A decoded animated value.
///
/// `timestamps[i]` and `values[i]` hold the keys of sequence `i`, or of global
/// loop `global_sequence` when the track uses one.
#[derive(Debug, Clone, PartialEq)]
pub struct M2Track<T> {
    pub interpolation: M2InterpolationType,
    pub global_sequence: i16,
    pub timestamps: Vec<Vec<u32>>,
    pub values: Vec<Vec<T>>,
}

impl<T> Default for M2Track<T> {
    fn default() -> Self {
        Self::new(M2InterpolationType::None)
    }
}

impl<T> M2Track<T> {
    pub fn new(interpolation: M2InterpolationType) -> Self {
        Self {
            interpolation,
            global_sequence: NO_GLOBAL_SEQUENCE,
            timestamps: Vec::new(),
            values: Vec::new(),
        }
    }

    /// A track that holds `value` for the whole of every one of
    /// `sequence_count` sequences
    pub fn constant(value: T, sequence_count: usize) -> Self
    where
        T: Clone,
    {
        Self {
            timestamps: vec![vec![0]; sequence_count],
            values: vec![vec![value]; sequence_count],
            ..Self::new(M2InterpolationType::None)
        }
    }

    /// Append the keys of the next sequence
    pub fn push_sequence(&mut self, timestamps: Vec<u32>, values: Vec<T>) {
        self.timestamps.push(timestamps);
        self.values.push(values);
    }

    pub fn uses_global_sequence(&self) -> bool {
        self.global_sequence >= 0
    }

    /// Total number of keys over all sequences
    pub fn key_count(&self) -> usize {
        self.timestamps.iter().map(Vec::len).sum()
    }

    pub fn is_animated(&self) -> bool {
        self.key_count() > 0
    }
}

/// A decoded timeline: keys without values
#[derive(Debug, Clone, PartialEq)]
pub struct M2Timeline {
    pub interpolation: M2InterpolationType,
    pub global_sequence: i16,
    pub timestamps: Vec<Vec<u32>>,
}

impl Default for M2Timeline {
    fn default() -> Self {
        Self {
            interpolation: M2InterpolationType::None,
            global_sequence: NO_GLOBAL_SEQUENCE,
            timestamps: Vec::new(),
        }
    }
}
