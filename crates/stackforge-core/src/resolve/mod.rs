//! Feature resolution
//!
//! This module provides:
//! - The artifact table (ids, path templates, registered variants)
//! - Expansion rules from features to artifacts
//! - Variant selection
//! - `resolve`, which turns a validated configuration into generation tasks

pub mod artifact;
pub mod expansion;
pub mod variant;

use crate::assemble::layout;
use crate::config::{Database, Framework, Frontend, ValidConfig};
use indexmap::IndexSet;
use thiserror::Error;

pub use artifact::{Artifact, ArtifactSpec, Namespace, VariantRule};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(
        "No '{variant}' variant registered for artifact '{artifact}' \
         (database: {}, framework: {})",
        .database.id(),
        .framework.id()
    )]
    MissingVariant {
        artifact: Artifact,
        variant: String,
        database: Database,
        framework: Framework,
    },
}

/// One concrete unit of output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationTask {
    pub artifact: Artifact,
    pub variant: &'static str,
    pub namespace: Namespace,
    pub path_template: &'static str,
}

impl GenerationTask {
    /// Final path of this task's file inside the project
    pub fn output_path(&self, config: &ValidConfig) -> String {
        layout::output_path(self, config)
    }
}

/// Expand a validated configuration into its ordered generation tasks.
///
/// Order: base artifacts, then feature contributions in vocabulary order,
/// then frontend artifacts. Artifacts are deduplicated by id, keeping the
/// first position they appear at.
pub fn resolve(config: &ValidConfig) -> Result<Vec<GenerationTask>, ResolveError> {
    let mut artifacts: IndexSet<Artifact> = IndexSet::new();
    artifacts.extend(expansion::BASE.iter().copied());
    artifacts.extend(expansion::feature_artifacts(config));
    if config.frontend() != Frontend::None {
        artifacts.extend(expansion::FRONTEND.iter().copied());
    }

    let tasks = artifacts
        .into_iter()
        .map(|artifact| {
            let spec = artifact.spec();
            let variant = variant::select(artifact, config)?;
            tracing::debug!(artifact = %artifact, variant, "resolved task");
            Ok(GenerationTask {
                artifact,
                variant,
                namespace: spec.namespace,
                path_template: spec.path,
            })
        })
        .collect::<Result<Vec<_>, ResolveError>>()?;

    tracing::info!(
        project = config.project_name(),
        tasks = tasks.len(),
        "resolved generation tasks"
    );
    Ok(tasks)
}
