//! Best score persisted as a number in a plain text file.

use std::{fs, io, path::PathBuf};

use match_three_system_best_score::{BestScoreStore, StoreError};

/// Keeps the best score in a text file holding a single number.
#[derive(Clone, Debug)]
pub(crate) struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Creates a store backed by `path`. The file is created on the first save.
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl BestScoreStore for FileStore {
    fn load(&self) -> Result<Option<u32>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };

        let trimmed = contents.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed
            .parse()
            .map(Some)
            .map_err(|_| StoreError::Corrupt {
                contents: trimmed.to_owned(),
            })
    }

    fn save(&mut self, best: u32) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, format!("{best}\n"))?;
        Ok(())
    }
}
