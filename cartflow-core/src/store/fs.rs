use super::*;
use std::fs;
use std::path::Path;

/// Filesystem object store: bucket = directory under a base path,
/// key = relative file path inside the bucket.
pub struct FsStore {
    base: PathBuf,
}

impl FsStore {
    pub fn new(base: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let base = base.into();
        fs::create_dir_all(&base).map_err(|source| StoreError::Prepare {
            path: base.clone(),
            source,
        })?;
        Ok(Self { base })
    }

    fn object_path(&self, location: &ObjectRef) -> PathBuf {
        self.base.join(&location.bucket).join(&location.key)
    }

    /// Collect keys of all regular files under `dir`, relative to `bucket_root`.
    fn collect_keys(
        bucket_root: &Path,
        dir: &Path,
        keys: &mut Vec<String>,
    ) -> io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                Self::collect_keys(bucket_root, &path, keys)?;
            } else if let Ok(rel) = path.strip_prefix(bucket_root) {
                let key = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                keys.push(key);
            }
        }
        Ok(())
    }
}

impl ObjectStore for FsStore {
    fn get(&self, location: &ObjectRef) -> Result<Vec<u8>, StoreError> {
        let path = self.object_path(location);
        fs::read(&path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                StoreError::NotFound(location.clone())
            } else {
                StoreError::Read {
                    location: location.clone(),
                    source,
                }
            }
        })
    }

    fn put(&self, location: &ObjectRef, bytes: Vec<u8>) -> Result<(), StoreError> {
        let path = self.object_path(location);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                location: location.clone(),
                source,
            })?;
        }
        fs::write(&path, bytes).map_err(|source| StoreError::Write {
            location: location.clone(),
            source,
        })
    }

    fn list(&self, location: &StoreLocation) -> Result<Vec<ObjectRef>, StoreError> {
        let bucket_root = self.base.join(&location.bucket);
        if !bucket_root.exists() {
            // A bucket nothing has been written to is just empty.
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        Self::collect_keys(&bucket_root, &bucket_root, &mut keys)
            .map_err(|source| StoreError::List(location.clone(), source))?;
        keys.sort();

        Ok(keys
            .into_iter()
            .map(|key| ObjectRef::new(location.bucket.clone(), key))
            .filter(|object| location.contains(object))
            .collect())
    }
}
