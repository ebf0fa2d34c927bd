//! Emission of an assembled tree to an output sink
//!
//! This module provides:
//! - The `Sink` trait, the only side-effecting seam of the engine
//! - `FsSink`, writing into a fresh project directory
//! - `ArchiveSink`, packaging the project into an in-memory zip
//! - `emit`, which flushes a tree into a sink in stored order
//!
//! Emission is not atomic: when a write fails, files written before it stay
//! where they are and the error reports how many there were.

pub mod archive;
pub mod fs;

use crate::assemble::VirtualTree;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

pub use archive::ArchiveSink;
pub use fs::FsSink;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Target already exists: {}", .0.display())]
    TargetExists(PathBuf),

    #[error("Refusing to overwrite existing file: {}", .0.display())]
    FileExists(PathBuf),

    #[error("Duplicate archive entry: {0}")]
    DuplicateEntry(String),

    #[error("Path escapes the project root: {0}")]
    UnsafePath(String),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

/// Destination that durably receives generated files
#[allow(async_fn_in_trait)]
pub trait Sink {
    /// Write one file at a project-relative path
    async fn write(&mut self, path: &str, content: &str) -> Result<(), SinkError>;
}

/// Summary of a successful emission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitReport {
    pub written: usize,
    pub bytes: usize,
}

#[derive(Debug, Error)]
#[error("Failed to write '{path}' ({written} file(s) written before the failure): {source}")]
pub struct EmitError {
    /// Files successfully written before the failure
    pub written: usize,
    pub path: String,
    #[source]
    pub source: SinkError,
}

/// Flush every file of `tree` into `sink`, stopping at the first failure
pub async fn emit<S: Sink>(tree: &VirtualTree, sink: &mut S) -> Result<EmitReport, EmitError> {
    let mut report = EmitReport {
        written: 0,
        bytes: 0,
    };

    for (path, content) in tree.iter() {
        if let Err(source) = sink.write(path, content).await {
            tracing::warn!(path, written = report.written, "emission stopped: {}", source);
            return Err(EmitError {
                written: report.written,
                path: path.to_string(),
                source,
            });
        }
        report.written += 1;
        report.bytes += content.len();
    }

    tracing::info!(written = report.written, bytes = report.bytes, "emitted tree");
    Ok(report)
}

/// Reject absolute paths and `..` segments so sinks stay inside their root
pub(crate) fn check_relative(path: &str) -> Result<&Path, SinkError> {
    let relative = Path::new(path);
    let safe = !path.is_empty()
        && relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if safe {
        Ok(relative)
    } else {
        Err(SinkError::UnsafePath(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::{assemble, RenderError};
    use crate::config::{Configuration, Database, Framework, ValidConfig};
    use crate::resolve::{resolve, Artifact};
    use crate::rules::validate;

    /// Records writes and fails on the nth one
    struct RecordingSink {
        written: Vec<String>,
        fail_at: Option<usize>,
    }

    impl Sink for RecordingSink {
        async fn write(&mut self, path: &str, _content: &str) -> Result<(), SinkError> {
            if self.fail_at == Some(self.written.len()) {
                return Err(SinkError::FileExists(PathBuf::from(path)));
            }
            self.written.push(path.to_string());
            Ok(())
        }
    }

    fn tree() -> VirtualTree {
        let config = validate(
            &Configuration::new("svc")
                .with_framework(Framework::Express)
                .with_database(Database::Sqlite),
        )
        .unwrap();
        let tasks = resolve(&config).unwrap();
        let stub = |a: Artifact, _: &str, _: &ValidConfig| Ok::<_, RenderError>(a.to_string());
        assemble(&tasks, &stub, &config).unwrap()
    }

    #[tokio::test]
    async fn test_emits_in_tree_order() {
        let tree = tree();
        let mut sink = RecordingSink {
            written: Vec::new(),
            fail_at: None,
        };
        let report = emit(&tree, &mut sink).await.unwrap();
        assert_eq!(report.written, tree.len());
        assert_eq!(sink.written, tree.paths().map(String::from).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_failure_reports_written_count() {
        let tree = tree();
        let mut sink = RecordingSink {
            written: Vec::new(),
            fail_at: Some(3),
        };
        let err = emit(&tree, &mut sink).await.unwrap_err();
        assert_eq!(err.written, 3);
        assert_eq!(err.path, tree.paths().nth(3).unwrap());
        // No rollback
        assert_eq!(sink.written.len(), 3);
    }

    #[test]
    fn test_check_relative() {
        assert!(check_relative("src/app.js").is_ok());
        assert!(check_relative(".github/workflows/ci.yml").is_ok());
        assert!(check_relative("../escape.js").is_err());
        assert!(check_relative("/etc/passwd").is_err());
        assert!(check_relative("").is_err());
    }
}
