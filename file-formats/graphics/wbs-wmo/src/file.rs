//! A root together with its group files on disk

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::chunk::{ChunkHeader, chunks};
use crate::error::{Result, WmoError};
use crate::group::WmoGroupFile;
use crate::root::WmoRootFile;

/// Kind of WMO file, identified by the chunk after `MVER`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WmoFileType {
    Root,
    Group,
}

/// Peek at the leading chunks to tell a root from a group file. The reader
/// is returned to where it started.
pub fn detect_file_type<R: Read + Seek>(reader: &mut R) -> Result<WmoFileType> {
    let start = reader.stream_position()?;

    let version = ChunkHeader::read_expected(reader, chunks::MVER)?;
    reader.seek(SeekFrom::Current(i64::from(version.size)))?;
    let kind = ChunkHeader::read(reader)?;
    reader.seek(SeekFrom::Start(start))?;

    match kind.id {
        id if id == chunks::MOHD => Ok(WmoFileType::Root),
        id if id == chunks::MOGP => Ok(WmoFileType::Group),
        found => Err(WmoError::UnrecognizedFormat { found }),
    }
}

/// Path of group `index` next to `root`: group 7 of `Foo.wmo` is `Foo_007.wmo`
pub fn group_filename(root: impl AsRef<Path>, index: usize) -> PathBuf {
    let root = root.as_ref();
    let stem = root
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default();
    let extension = root
        .extension()
        .map(|ext| ext.to_string_lossy())
        .unwrap_or_else(|| "wmo".into());
    root.with_file_name(format!("{stem}_{index:03}.{extension}"))
}

/// A complete model: one root and `n_groups` group files
#[derive(Debug, Clone, Default)]
pub struct WmoFile {
    pub root: WmoRootFile,
    pub groups: Vec<WmoGroupFile>,
}

impl WmoFile {
    pub fn new(root: WmoRootFile, groups: Vec<WmoGroupFile>) -> Self {
        Self { root, groups }
    }

    /// Read a root file and every group file it announces
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut root = WmoRootFile::read(&mut BufReader::new(File::open(path)?))?;

        let groups = (0..root.header.n_groups as usize)
            .map(|index| {
                let group_path = group_filename(path, index);
                if !group_path.is_file() {
                    return Err(WmoError::MissingGroupFile {
                        index,
                        path: group_path,
                    });
                }
                debug!("Reading group {index} from {}", group_path.display());
                WmoGroupFile::read(&mut BufReader::new(File::open(&group_path)?))
            })
            .collect::<Result<Vec<_>>>()?;
        root.restore_group_descriptions(&groups);

        Ok(Self { root, groups })
    }

    /// Finalize the root against the groups, then write the root to `path`
    /// and every group next to it
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.root.finalize(&self.groups)?;

        let mut writer = BufWriter::new(File::create(path)?);
        self.root.write(&mut writer)?;
        writer.flush()?;

        self.write_groups(path)?;
        info!(
            "Saved {} with {} groups",
            path.display(),
            self.groups.len()
        );
        Ok(())
    }

    #[cfg(not(feature = "parallel"))]
    fn write_groups(&self, path: &Path) -> Result<()> {
        self.groups
            .iter()
            .enumerate()
            .try_for_each(|(index, group)| write_group_file(&group_filename(path, index), group))
    }

    #[cfg(feature = "parallel")]
    fn write_groups(&self, path: &Path) -> Result<()> {
        use rayon::prelude::*;

        self.groups
            .par_iter()
            .enumerate()
            .try_for_each(|(index, group)| write_group_file(&group_filename(path, index), group))
    }
}

fn write_group_file(path: &Path, group: &WmoGroupFile) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    group.write(&mut writer)?;
    writer.flush()?;
    debug!("Wrote {}", path.display());
    Ok(())
}
