use crate::domain::ports::Storage;
use crate::utils::error::{PortalError, Result};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Reads sources from, and writes exports to, one directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl Storage for LocalStorage {
    fn open(&self, path: &str) -> Result<Box<dyn BufRead>> {
        let full_path = self.base_path.join(path);
        let file = File::open(&full_path).map_err(|source| PortalError::SourceUnavailable {
            path: full_path,
            source,
        })?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.base_path.join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }

    fn describe(&self, path: &str) -> String {
        self.base_path.join(path).display().to_string()
    }
}
