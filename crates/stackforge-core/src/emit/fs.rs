//! Filesystem sink writing into a fresh project directory

use super::{check_relative, Sink, SinkError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Writes files under `<parent>/<project_name>`
///
/// The project directory must not exist beforehand, and no file is ever
/// overwritten.
#[derive(Debug)]
pub struct FsSink {
    root: PathBuf,
}

impl FsSink {
    /// Create the project directory; fails if it already exists
    pub async fn create(parent: &Path, project_name: &str) -> Result<Self, SinkError> {
        let root = parent.join(project_name);

        // `create_dir` (not `create_dir_all`) so an existing target is refused
        match fs::create_dir(&root).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(SinkError::TargetExists(root));
            }
            Err(source) => return Err(SinkError::Io { path: root, source }),
        }

        tracing::debug!(root = %root.display(), "created project directory");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Sink for FsSink {
    async fn write(&mut self, path: &str, content: &str) -> Result<(), SinkError> {
        let target = self.root.join(check_relative(path)?);

        // Ensure parent directories exist
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| SinkError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(SinkError::FileExists(target));
            }
            Err(source) => return Err(SinkError::Io { path: target, source }),
        };

        let io_err = |source| SinkError::Io {
            path: target.clone(),
            source,
        };
        file.write_all(content.as_bytes()).await.map_err(io_err)?;
        file.flush().await.map_err(io_err)?;
        Ok(())
    }
}
