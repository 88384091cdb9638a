use fd_lock::RwLock;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::data::{impl_store_traits, StoreData};
use super::StoreError;

/// Store backend persisting [`StoreData`] as one JSON file.
///
/// Every call takes an advisory lock on a sibling `.lock` file: shared for
/// reads, exclusive for read-modify-write. Writes go to a temporary file
/// that is renamed over the store, so readers never see a torn file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl JsonFileStore {
    /// Open (or prepare to create) the store at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let lock_path = sibling(&path, "lock");
        Ok(Self { path, lock_path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the whole store content.
    pub fn initialize(&self, data: StoreData) -> Result<(), StoreError> {
        self.write(|current| {
            *current = data;
            Ok(())
        })
    }

    /// Copy of the current content, for inspection.
    pub fn snapshot(&self) -> Result<StoreData, StoreError> {
        self.read(StoreData::clone)
    }

    fn lock_file(&self) -> Result<RwLock<File>, StoreError> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&self.lock_path)?;
        Ok(RwLock::new(file))
    }

    fn load(&self) -> Result<StoreData, StoreError> {
        if !self.path.exists() {
            return Ok(StoreData::default());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(StoreData::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, data: &StoreData) -> Result<(), StoreError> {
        let tmp_path = sibling(&self.path, "tmp");
        let mut tmp = File::create(&tmp_path)?;
        tmp.write_all(serde_json::to_string_pretty(data)?.as_bytes())?;
        tmp.sync_all()?;
        fs::rename(&tmp_path, &self.path)?;
        debug!(path = %self.path.display(), "store file written");
        Ok(())
    }

    fn read<R>(&self, f: impl FnOnce(&StoreData) -> R) -> Result<R, StoreError> {
        let lock = self.lock_file()?;
        let _guard = lock.read()?;
        let data = self.load()?;
        Ok(f(&data))
    }

    fn write<R>(
        &self,
        f: impl FnOnce(&mut StoreData) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        let mut lock = self.lock_file()?;
        let _guard = lock.write()?;
        let mut data = self.load()?;
        let result = f(&mut data)?;
        self.save(&data)?;
        Ok(result)
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

impl_store_traits!(JsonFileStore);
