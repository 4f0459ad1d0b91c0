//! A model together with its skin profiles and `.anim` files on disk

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::{debug, info};

use crate::anim::{AnimDirectory, M2WriteOptions};
use crate::error::{M2Error, Result};
use crate::model::M2Model;
use crate::skin::{M2Skin, skin_filename};

/// A complete model: the `.m2` file and its `skin_profile_count` skins
#[derive(Debug, Clone, Default)]
pub struct M2File {
    pub model: M2Model,
    pub skins: Vec<M2Skin>,
}

impl M2File {
    pub fn new(model: M2Model, skins: Vec<M2Skin>) -> Self {
        Self { model, skins }
    }

    /// Read a model, the `.anim` files beside it and every skin profile it
    /// announces
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);
        let model = M2Model::read(&mut reader, &AnimDirectory::new(path))?;

        let skins = (0..model.skin_profile_count as usize)
            .map(|index| {
                let skin_path = skin_filename(path, index);
                if !skin_path.is_file() {
                    return Err(M2Error::MissingSkinFile {
                        index,
                        path: skin_path,
                    });
                }

                debug!("Reading skin {index} from {}", skin_path.display());
                M2Skin::read(&mut BufReader::new(File::open(&skin_path)?))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { model, skins })
    }

    /// Write the model to `path` and its skins and `.anim` files next to it.
    /// The skin profile count is taken from `skins`.
    pub fn save(&mut self, path: impl AsRef<Path>, options: &M2WriteOptions) -> Result<()> {
        let path = path.as_ref();
        self.model.skin_profile_count = self.skins.len() as u32;

        let mut writer = BufWriter::new(File::create(path)?);
        let anim_files = self.model.write(&mut writer, options)?;
        writer.flush()?;

        for (index, skin) in self.skins.iter().enumerate() {
            let skin_path = skin_filename(path, index);
            let mut writer = BufWriter::new(File::create(&skin_path)?);
            skin.write(&mut writer)?;
            writer.flush()?;
            debug!("Wrote {}", skin_path.display());
        }

        for anim in &anim_files {
            let anim_path = anim.filename(path);
            fs::write(&anim_path, &anim.data)?;
            debug!("Wrote {}", anim_path.display());
        }

        info!(
            "Saved {} with {} skins and {} anim files",
            path.display(),
            self.skins.len(),
            anim_files.len()
        );
        Ok(())
    }
}
