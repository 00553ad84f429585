use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use rocket::tokio::fs;
use serde::{Deserialize, Serialize};

use crate::keys::{generate_key, is_valid_key};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BlobMeta {
    pub content_type: String,
    /// User that requested the upload URL.
    pub owner_id: i32,
}

/// Filesystem blob store. Each blob is `<id>` next to a `<id>.meta.json`.
pub(crate) struct BlobStorage {
    folder: PathBuf,
}

impl BlobStorage {
    pub(crate) fn new(folder: impl Into<PathBuf>) -> BlobStorage {
        BlobStorage {
            folder: folder.into(),
        }
    }

    fn paths(&self, storage_id: &str) -> Option<(PathBuf, PathBuf)> {
        is_valid_key(storage_id).then(|| {
            (
                self.folder.join(storage_id),
                self.folder.join(format!("{}.meta.json", storage_id)),
            )
        })
    }

    pub(crate) async fn put(&self, bytes: &[u8], meta: &BlobMeta) -> io::Result<String> {
        fs::create_dir_all(&self.folder).await?;

        let storage_id = generate_key();
        let (data_path, meta_path) = self
            .paths(&storage_id)
            .ok_or_else(|| io::Error::new(ErrorKind::Other, "generated an invalid storage id"))?;

        fs::write(&data_path, bytes).await?;
        // The meta file is what makes a blob visible, so it goes last.
        fs::write(&meta_path, serde_json::to_vec(meta)?).await?;

        Ok(storage_id)
    }

    pub(crate) async fn meta(&self, storage_id: &str) -> io::Result<Option<BlobMeta>> {
        let (_, meta_path) = match self.paths(storage_id) {
            Some(paths) => paths,
            None => return Ok(None),
        };

        match read_optional(&meta_path).await? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            None => Ok(None),
        }
    }

    pub(crate) async fn get(&self, storage_id: &str) -> io::Result<Option<(BlobMeta, Vec<u8>)>> {
        let meta = match self.meta(storage_id).await? {
            Some(meta) => meta,
            None => return Ok(None),
        };
        let (data_path, _) = match self.paths(storage_id) {
            Some(paths) => paths,
            None => return Ok(None),
        };

        Ok(read_optional(&data_path).await?.map(|bytes| (meta, bytes)))
    }

    /// Deleting a blob that is already gone is not an error.
    pub(crate) async fn delete(&self, storage_id: &str) -> io::Result<()> {
        let (data_path, meta_path) = match self.paths(storage_id) {
            Some(paths) => paths,
            None => return Ok(()),
        };

        remove_optional(&meta_path).await?;
        remove_optional(&data_path).await
    }
}

async fn read_optional(path: &Path) -> io::Result<Option<Vec<u8>>> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

async fn remove_optional(path: &Path) -> io::Result<()> {
    match fs::remove_file(path).await {
        Err(err) if err.kind() != ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}
