use crate::core::Storage;
use std::fs;
use std::path::{Path, PathBuf};

/// Files under a base directory, created on first write.
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
    fn read_file(&self, path: &str) -> std::io::Result<Vec<u8>> {
        fs::read(self.base_path.join(path))
    }

    fn write_file(&self, path: &str, data: &[u8]) -> std::io::Result<()> {
        let full_path = self.base_path.join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)
    }

    fn locate(&self, path: &str) -> String {
        self.base_path.join(path).display().to_string()
    }
}
