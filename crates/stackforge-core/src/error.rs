//! Umbrella error for the in-memory pipeline

use crate::assemble::{AssembleError, RenderError};
use crate::resolve::ResolveError;
use crate::rules::Violations;
use thiserror::Error;

/// Failure of `generate`
///
/// `Invalid` carries user-facing violations. Every other variant means the
/// artifact table or a renderer is broken for this configuration.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Invalid configuration:\n{0}")]
    Invalid(#[from] Violations),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Assemble(#[from] AssembleError),
}

impl GenerateError {
    /// True when the failure is a defect in the tables rather than user input
    pub fn is_defect(&self) -> bool {
        match self {
            GenerateError::Invalid(_) => false,
            GenerateError::Resolve(ResolveError::MissingVariant { .. }) => true,
            GenerateError::Assemble(AssembleError::PathCollision { .. }) => true,
            GenerateError::Assemble(AssembleError::Render(RenderError::UnknownVariant {
                ..
            })) => true,
            GenerateError::Assemble(AssembleError::Render(RenderError::Failed { .. })) => false,
        }
    }

    pub fn violations(&self) -> Option<&Violations> {
        match self {
            GenerateError::Invalid(violations) => Some(violations),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Configuration, Database, Framework};
    use crate::resolve::Artifact;
    use crate::rules::validate;

    #[test]
    fn test_violations_are_not_defects() {
        let err: GenerateError = validate(&Configuration::new("")).unwrap_err().into();
        assert!(!err.is_defect());
        assert!(err.violations().is_some());
        assert!(err.to_string().starts_with("Invalid configuration:"));
    }

    #[test]
    fn test_table_failures_are_defects() {
        let missing: GenerateError = ResolveError::MissingVariant {
            artifact: Artifact::EmailService,
            variant: "none".to_string(),
            database: Database::None,
            framework: Framework::Express,
        }
        .into();
        assert!(missing.is_defect());

        let collision: GenerateError = AssembleError::PathCollision {
            path: "README.md".to_string(),
            first: Artifact::Readme,
            second: Artifact::OpenApiSpec,
        }
        .into();
        assert!(collision.is_defect());
        assert!(collision.violations().is_none());

        let failed: GenerateError = AssembleError::from(RenderError::Failed {
            artifact: Artifact::Readme,
            message: "disk full".to_string(),
        })
        .into();
        assert!(!failed.is_defect());
    }
}
