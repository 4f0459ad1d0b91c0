//! `.anim` side files.
//!
//! Sequences that are neither embedded nor aliases keep the keys of their
//! tracks in `{stem}{id:04}-{variation:02}.anim` next to the model. In these
//! files every per-sequence array is addressed relative to the start of the
//! `.anim` file.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::Result;

/// Path of the `.anim` file of sequence `id`/`variation` of `model`
pub fn anim_filename(model: impl AsRef<Path>, id: u16, variation: u16) -> PathBuf {
    let model = model.as_ref();
    let stem = model
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    model.with_file_name(format!("{stem}{id:04}-{variation:02}.anim"))
}

/// Supplies the `.anim` data of external sequences while a model is read
pub trait AnimFileProvider {
    /// Contents of the `.anim` file for sequence `id`/`variation`, `None`
    /// when it is not available
    fn load_anim(&self, id: u16, variation: u16) -> Result<Option<Vec<u8>>>;
}

/// Reads no `.anim` files; external keys decode as empty arrays
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAnimFiles;

impl AnimFileProvider for NoAnimFiles {
    fn load_anim(&self, _id: u16, _variation: u16) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }
}

/// Reads `.anim` files from beside a model file
#[derive(Debug, Clone)]
pub struct AnimDirectory {
    model_path: PathBuf,
}

impl AnimDirectory {
    pub fn new(model_path: impl AsRef<Path>) -> Self {
        Self {
            model_path: model_path.as_ref().to_path_buf(),
        }
    }
}

impl AnimFileProvider for AnimDirectory {
    fn load_anim(&self, id: u16, variation: u16) -> Result<Option<Vec<u8>>> {
        let path = anim_filename(&self.model_path, id, variation);
        if !path.is_file() {
            debug!("No anim file at {}", path.display());
            return Ok(None);
        }
        Ok(Some(fs::read(path)?))
    }
}

/// The `.anim` data of one external sequence, produced by a split write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimFile {
    /// Index of the sequence in the model
    pub sequence_index: usize,
    pub id: u16,
    pub variation: u16,
    pub data: Vec<u8>,
}

impl AnimFile {
    pub fn filename(&self, model: impl AsRef<Path>) -> PathBuf {
        anim_filename(model, self.id, self.variation)
    }
}

/// Serves the files of a previous split write, for reading a model back
/// from memory
impl AnimFileProvider for [AnimFile] {
    fn load_anim(&self, id: u16, variation: u16) -> Result<Option<Vec<u8>>> {
        Ok(self
            .iter()
            .find(|file| file.id == id && file.variation == variation)
            .map(|file| file.data.clone()))
    }
}

/// Options for writing a model
#[derive(Debug, Clone, Copy, Default)]
pub struct M2WriteOptions {
    /// Move the keys of external sequences to `.anim` files. When false every
    /// sequence that is not an alias is written as embedded.
    pub split_anims: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_anim_filename() {
        assert_eq!(
            anim_filename("Creature/Kobold/Kobold.m2", 4, 1),
            PathBuf::from("Creature/Kobold/Kobold0004-01.anim")
        );
        assert_eq!(
            anim_filename("Wolf.m2", 143, 12),
            PathBuf::from("Wolf0143-12.anim")
        );
    }

    #[test]
    fn test_memory_provider() {
        let files = vec![AnimFile {
            sequence_index: 2,
            id: 5,
            variation: 0,
            data: vec![1, 2, 3],
        }];
        assert_eq!(files.load_anim(5, 0).unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(files.load_anim(5, 1).unwrap(), None);
        assert_eq!(NoAnimFiles.load_anim(5, 0).unwrap(), None);
    }

    #[test]
    fn test_directory_provider() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("Kobold.m2");
        fs::write(dir.path().join("Kobold0004-00.anim"), [9, 9]).unwrap();

        let provider = AnimDirectory::new(&model);
        assert_eq!(provider.load_anim(4, 0).unwrap(), Some(vec![9, 9]));
        assert_eq!(provider.load_anim(4, 1).unwrap(), None);
    }
}
