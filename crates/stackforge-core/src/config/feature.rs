//! Optional feature vocabulary

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named optional capability a user may select.
///
/// The variant order is the declaration order of the vocabulary. The resolver
/// emits feature-contributed artifacts in this order, and `Ord` follows it, so
/// a `BTreeSet<Feature>` iterates deterministically regardless of how the
/// features were collected.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Feature {
    /// Authentication (JWT based)
    #[serde(alias = "authentication", alias = "jwt")]
    #[value(alias = "authentication", alias = "jwt")]
    Auth,
    /// One-time-passcode verification over email
    #[serde(alias = "otp")]
    #[value(alias = "otp")]
    EmailOtp,
    /// Password-reset flow over email
    PasswordReset,
    /// Cache-backed session storage and rate-limit store
    #[serde(alias = "cache")]
    #[value(alias = "cache")]
    Redis,
    /// Request-rate limiting
    RateLimit,
    /// Structured logging
    Logging,
    /// Input validation
    Validation,
    /// Cross-origin policy
    Cors,
    /// Security headers
    #[serde(alias = "security-headers")]
    #[value(alias = "security-headers")]
    Helmet,
    /// File uploads
    #[serde(alias = "uploads")]
    #[value(alias = "uploads")]
    FileUpload,
    /// API documentation (OpenAPI)
    #[serde(alias = "swagger", alias = "openapi")]
    #[value(alias = "swagger", alias = "openapi")]
    ApiDocs,
    /// Containerization
    Docker,
    /// Test scaffolding
    Tests,
    /// CI pipeline
    Ci,
}

impl Feature {
    /// Every feature, in declaration order.
    pub const ALL: [Feature; 14] = [
        Feature::Auth,
        Feature::EmailOtp,
        Feature::PasswordReset,
        Feature::Redis,
        Feature::RateLimit,
        Feature::Logging,
        Feature::Validation,
        Feature::Cors,
        Feature::Helmet,
        Feature::FileUpload,
        Feature::ApiDocs,
        Feature::Docker,
        Feature::Tests,
        Feature::Ci,
    ];

    /// Stable token used in project files and on the command line
    pub fn token(&self) -> &'static str {
        match self {
            Feature::Auth => "auth",
            Feature::EmailOtp => "email-otp",
            Feature::PasswordReset => "password-reset",
            Feature::Redis => "redis",
            Feature::RateLimit => "rate-limit",
            Feature::Logging => "logging",
            Feature::Validation => "validation",
            Feature::Cors => "cors",
            Feature::Helmet => "helmet",
            Feature::FileUpload => "file-upload",
            Feature::ApiDocs => "api-docs",
            Feature::Docker => "docker",
            Feature::Tests => "tests",
            Feature::Ci => "ci",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Feature::Auth => "Authentication (JWT)",
            Feature::EmailOtp => "Email OTP verification",
            Feature::PasswordReset => "Password reset flow",
            Feature::Redis => "Redis sessions & cache",
            Feature::RateLimit => "Rate limiting",
            Feature::Logging => "Structured logging",
            Feature::Validation => "Input validation",
            Feature::Cors => "CORS policy",
            Feature::Helmet => "Security headers",
            Feature::FileUpload => "File uploads",
            Feature::ApiDocs => "API documentation",
            Feature::Docker => "Docker",
            Feature::Tests => "Test scaffolding",
            Feature::Ci => "CI pipeline",
        }
    }

    /// Features that send transactional email and need an email provider
    pub fn requires_email(&self) -> bool {
        matches!(self, Feature::EmailOtp | Feature::PasswordReset)
    }

    /// Features that only make sense on top of authentication
    pub fn requires_auth(&self) -> bool {
        matches!(self, Feature::EmailOtp | Feature::PasswordReset)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_set_iterates_in_declaration_order() {
        let set: BTreeSet<Feature> = [Feature::Ci, Feature::Auth, Feature::Cors]
            .into_iter()
            .collect();
        let order: Vec<_> = set.into_iter().collect();
        assert_eq!(order, vec![Feature::Auth, Feature::Cors, Feature::Ci]);
    }

    #[test]
    fn test_tokens_parse_back() {
        for feature in Feature::ALL {
            let parsed: Feature = serde_yaml::from_str(feature.token()).unwrap();
            assert_eq!(parsed, feature);
        }
    }

    #[test]
    fn test_aliases() {
        let parsed: Feature = serde_yaml::from_str("otp").unwrap();
        assert_eq!(parsed, Feature::EmailOtp);
        assert_eq!(Feature::from_str("swagger", true).unwrap(), Feature::ApiDocs);
    }
}
