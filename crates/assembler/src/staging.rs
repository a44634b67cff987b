//! Per-run staging directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use recast_common::error::{RecastError, RecastResult};

/// Scratch directory owned by exactly one assembly run.
#[derive(Debug)]
pub struct StagingDir {
    path: PathBuf,
}

impl StagingDir {
    /// Create `<root>/<presentation_id>`.
    ///
    /// A relative `root` is resolved against the working directory, so every
    /// path handed out is absolute. Fails if the directory already exists: it
    /// belongs to another run or holds residue of a failed one.
    pub async fn create(root: &Path, presentation_id: &str) -> RecastResult<Self> {
        let root = if root.is_absolute() {
            root.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(|e| RecastError::filesystem(root, e))?
                .join(root)
        };
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| RecastError::filesystem(&root, e))?;

        let path = root.join(presentation_id);
        match tokio::fs::create_dir(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(RecastError::filesystem(
                    &path,
                    std::io::Error::new(
                        ErrorKind::AlreadyExists,
                        "staging directory already exists; remove it or wait for the run using it",
                    ),
                ));
            }
            Err(e) => return Err(RecastError::filesystem(&path, e)),
        }

        tracing::debug!(path = %path.display(), "Created staging directory");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of a file inside the staging directory.
    pub fn join(&self, file_name: &str) -> PathBuf {
        self.path.join(file_name)
    }

    /// Delete the directory and everything in it.
    pub async fn remove(self) -> RecastResult<()> {
        tokio::fs::remove_dir_all(&self.path)
            .await
            .map_err(|e| RecastError::filesystem(&self.path, e))?;
        tracing::debug!(path = %self.path.display(), "Removed staging directory");
        Ok(())
    }
}
