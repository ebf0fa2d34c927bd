//! Tree assembly
//!
//! Renders each generation task through an `ArtifactRenderer`, places it at
//! its expanded output path and collects the results into a `VirtualTree`.
//! The assembler has no knowledge of features: a subtree that should not
//! exist simply has no tasks.

pub mod layout;
pub mod naming;

use crate::config::ValidConfig;
use crate::resolve::{Artifact, GenerationTask};
use indexmap::map::Entry;
use indexmap::IndexMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("No body registered for artifact '{artifact}' variant '{variant}'")]
    UnknownVariant { artifact: Artifact, variant: String },

    #[error("Failed to render artifact '{artifact}': {message}")]
    Failed { artifact: Artifact, message: String },
}

#[derive(Debug, Error)]
pub enum AssembleError {
    #[error("Path collision at '{path}' between artifacts '{first}' and '{second}'")]
    PathCollision {
        path: String,
        first: Artifact,
        second: Artifact,
    },

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Source of artifact bodies, keyed by `(artifact, variant)`
pub trait ArtifactRenderer {
    fn render(
        &self,
        artifact: Artifact,
        variant: &str,
        config: &ValidConfig,
    ) -> Result<String, RenderError>;
}

impl<F> ArtifactRenderer for F
where
    F: Fn(Artifact, &str, &ValidConfig) -> Result<String, RenderError>,
{
    fn render(
        &self,
        artifact: Artifact,
        variant: &str,
        config: &ValidConfig,
    ) -> Result<String, RenderError> {
        self(artifact, variant, config)
    }
}

/// A rendered file and the artifact it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualFile {
    pub artifact: Artifact,
    pub content: String,
}

/// In-memory project tree: unique paths in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VirtualTree {
    files: IndexMap<String, VirtualFile>,
}

impl VirtualTree {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&VirtualFile> {
        self.files.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Files as `(path, content)` in emission order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files
            .iter()
            .map(|(path, file)| (path.as_str(), file.content.as_str()))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Total size of all file contents in bytes
    pub fn total_bytes(&self) -> usize {
        self.files.values().map(|f| f.content.len()).sum()
    }

    fn insert(&mut self, path: String, file: VirtualFile) -> Result<(), AssembleError> {
        match self.files.entry(path) {
            Entry::Occupied(existing) => Err(AssembleError::PathCollision {
                path: existing.key().clone(),
                first: existing.get().artifact,
                second: file.artifact,
            }),
            Entry::Vacant(slot) => {
                slot.insert(file);
                Ok(())
            }
        }
    }
}

/// Render every task and lay the results out as a tree
pub fn assemble<R: ArtifactRenderer + ?Sized>(
    tasks: &[GenerationTask],
    renderer: &R,
    config: &ValidConfig,
) -> Result<VirtualTree, AssembleError> {
    let mut tree = VirtualTree::default();

    for task in tasks {
        let path = task.output_path(config);
        let content = renderer.render(task.artifact, task.variant, config)?;
        tracing::debug!(path = %path, artifact = %task.artifact, bytes = content.len(), "rendered");
        tree.insert(
            path,
            VirtualFile {
                artifact: task.artifact,
                content,
            },
        )?;
    }

    tracing::info!(files = tree.len(), bytes = tree.total_bytes(), "assembled tree");
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Configuration, Database, Feature, Framework};
    use crate::resolve::{resolve, Namespace};
    use crate::rules::validate;

    fn stub(artifact: Artifact, variant: &str, _: &ValidConfig) -> Result<String, RenderError> {
        Ok(format!("{}:{}", artifact, variant))
    }

    fn valid() -> ValidConfig {
        validate(
            &Configuration::new("acme-api")
                .with_framework(Framework::Express)
                .with_database(Database::Postgres)
                .with_features([Feature::Auth, Feature::Logging]),
        )
        .unwrap()
    }

    #[test]
    fn test_every_task_produces_one_file() {
        let config = valid();
        let tasks = resolve(&config).unwrap();
        let tree = assemble(&tasks, &stub, &config).unwrap();
        assert_eq!(tree.len(), tasks.len());
        let paths: Vec<_> = tree.paths().collect();
        let expected: Vec<_> = tasks.iter().map(|t| t.output_path(&config)).collect();
        assert_eq!(paths, expected);
        assert_eq!(
            tree.get("src/models/User.js").unwrap().content,
            "user-model:relational"
        );
    }

    #[test]
    fn test_collision_names_both_artifacts() {
        let config = valid();
        let tasks = vec![
            GenerationTask {
                artifact: Artifact::Readme,
                variant: "default",
                namespace: Namespace::Backend,
                path_template: "README.md",
            },
            GenerationTask {
                artifact: Artifact::OpenApiSpec,
                variant: "default",
                namespace: Namespace::Backend,
                path_template: "README.md",
            },
        ];
        let err = assemble(&tasks, &stub, &config).unwrap_err();
        match err {
            AssembleError::PathCollision {
                path,
                first,
                second,
            } => {
                assert_eq!(path, "README.md");
                assert_eq!(first, Artifact::Readme);
                assert_eq!(second, Artifact::OpenApiSpec);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_render_failure_aborts() {
        let config = valid();
        let tasks = resolve(&config).unwrap();
        let failing = |artifact: Artifact, variant: &str, _: &ValidConfig| {
            if artifact == Artifact::Logger {
                Err(RenderError::UnknownVariant {
                    artifact,
                    variant: variant.to_string(),
                })
            } else {
                Ok(String::new())
            }
        };
        let err = assemble(&tasks, &failing, &config).unwrap_err();
        assert!(matches!(err, AssembleError::Render(_)));
    }
}
