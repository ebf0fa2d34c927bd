//! Variant selection for resolved artifacts

use super::artifact::{Artifact, VariantRule, DEFAULT_VARIANT};
use super::ResolveError;
use crate::config::ValidConfig;

/// Pick the variant of `artifact` for a configuration.
///
/// The candidate is derived purely from the configuration input named by the
/// artifact's rule; it must then be one of the artifact's registered variants.
pub fn select(artifact: Artifact, config: &ValidConfig) -> Result<&'static str, ResolveError> {
    let spec = artifact.spec();
    let candidate = match spec.rule {
        VariantRule::Fixed => DEFAULT_VARIANT,
        VariantRule::Framework => config.framework().id(),
        VariantRule::Database => config.database().id(),
        VariantRule::Storage => config.database().family().id(),
        VariantRule::EmailProvider => config.email_provider().id(),
        VariantRule::Frontend => config.frontend().id(),
    };

    spec.variants
        .iter()
        .copied()
        .find(|registered| *registered == candidate)
        .ok_or_else(|| ResolveError::MissingVariant {
            artifact,
            variant: candidate.to_string(),
            database: config.database(),
            framework: config.framework(),
        })
}
