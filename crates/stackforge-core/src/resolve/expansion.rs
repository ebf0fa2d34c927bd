//! Expansion rules: which artifacts each feature implies

use super::artifact::Artifact;
use crate::config::{Feature, ValidConfig};

/// One artifact a feature contributes, optionally only alongside another feature
#[derive(Debug, Clone, Copy)]
pub struct Contribution {
    pub artifact: Artifact,
    pub with: Option<Feature>,
}

const fn always(artifact: Artifact) -> Contribution {
    Contribution {
        artifact,
        with: None,
    }
}

const fn with(artifact: Artifact, feature: Feature) -> Contribution {
    Contribution {
        artifact,
        with: Some(feature),
    }
}

/// Artifacts present in every configuration
pub const BASE: &[Artifact] = &[
    Artifact::PackageManifest,
    Artifact::EntryPoint,
    Artifact::AppComposition,
    Artifact::EnvTemplate,
    Artifact::DatabaseClient,
    Artifact::Gitignore,
    Artifact::Readme,
];

/// Artifacts appended when a client framework is selected
pub const FRONTEND: &[Artifact] = &[
    Artifact::ClientManifest,
    Artifact::ClientIndexHtml,
    Artifact::ClientViteConfig,
    Artifact::ClientEntry,
    Artifact::ClientRoot,
    Artifact::ClientApi,
];

const AUTH: &[Contribution] = &[
    always(Artifact::AuthController),
    always(Artifact::AuthRoutes),
    always(Artifact::AuthMiddleware),
    always(Artifact::UserModel),
    with(Artifact::EmailService, Feature::EmailOtp),
];

const EMAIL_OTP: &[Contribution] = &[
    always(Artifact::OtpModel),
    always(Artifact::OtpService),
    always(Artifact::EmailService),
];

const PASSWORD_RESET: &[Contribution] = &[
    always(Artifact::ResetTokenModel),
    always(Artifact::PasswordResetService),
    always(Artifact::EmailService),
];

const REDIS: &[Contribution] = &[
    always(Artifact::RedisClient),
    always(Artifact::SessionMiddleware),
];

const RATE_LIMIT: &[Contribution] = &[always(Artifact::RateLimitMiddleware)];

const LOGGING: &[Contribution] = &[
    always(Artifact::Logger),
    always(Artifact::RequestLogger),
];

const VALIDATION: &[Contribution] = &[
    always(Artifact::ValidationMiddleware),
    with(Artifact::AuthSchemas, Feature::Auth),
];

const CORS: &[Contribution] = &[always(Artifact::CorsConfig)];

const HELMET: &[Contribution] = &[always(Artifact::SecurityHeaders)];

const FILE_UPLOAD: &[Contribution] = &[
    always(Artifact::UploadMiddleware),
    always(Artifact::UploadRoutes),
    always(Artifact::UploadsDir),
];

const API_DOCS: &[Contribution] = &[
    always(Artifact::OpenApiSpec),
    always(Artifact::DocsRoutes),
];

const DOCKER: &[Contribution] = &[
    always(Artifact::Dockerfile),
    always(Artifact::Dockerignore),
    always(Artifact::DockerCompose),
];

const TESTS: &[Contribution] = &[
    always(Artifact::TestSetup),
    always(Artifact::HealthTest),
    with(Artifact::AuthTest, Feature::Auth),
];

const CI: &[Contribution] = &[always(Artifact::CiWorkflow)];

/// The expansion rule of a feature
pub fn expansion(feature: Feature) -> &'static [Contribution] {
    match feature {
        Feature::Auth => AUTH,
        Feature::EmailOtp => EMAIL_OTP,
        Feature::PasswordReset => PASSWORD_RESET,
        Feature::Redis => REDIS,
        Feature::RateLimit => RATE_LIMIT,
        Feature::Logging => LOGGING,
        Feature::Validation => VALIDATION,
        Feature::Cors => CORS,
        Feature::Helmet => HELMET,
        Feature::FileUpload => FILE_UPLOAD,
        Feature::ApiDocs => API_DOCS,
        Feature::Docker => DOCKER,
        Feature::Tests => TESTS,
        Feature::Ci => CI,
    }
}

/// Artifacts a configuration's features contribute, in vocabulary order.
/// May contain duplicates; the resolver deduplicates.
pub fn feature_artifacts(config: &ValidConfig) -> impl Iterator<Item = Artifact> + '_ {
    Feature::ALL
        .into_iter()
        .filter(|feature| config.has(*feature))
        .flat_map(|feature| expansion(feature).iter())
        .filter(|c| c.with.map_or(true, |required| config.has(required)))
        .map(|c| c.artifact)
}

/// Every artifact any configuration can produce
pub fn all_artifacts() -> Vec<Artifact> {
    let mut all: Vec<Artifact> = BASE.to_vec();
    for feature in Feature::ALL {
        all.extend(expansion(feature).iter().map(|c| c.artifact));
    }
    all.extend_from_slice(FRONTEND);
    all.sort();
    all.dedup();
    all
}
