//! Built-in artifact bodies
//!
//! `BuiltinRenderer` produces a small, runnable Node.js skeleton for every
//! registered `(artifact, variant)` pair. Bodies are plain functions of the
//! validated configuration; nothing is registered at runtime.

mod auth;
mod client;
mod project;
mod server;

use crate::assemble::{ArtifactRenderer, RenderError};
use crate::config::{Framework, ValidConfig};
use crate::resolve::Artifact;

/// Renderer backed by the bodies compiled into this crate
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinRenderer;

impl ArtifactRenderer for BuiltinRenderer {
    fn render(
        &self,
        artifact: Artifact,
        variant: &str,
        config: &ValidConfig,
    ) -> Result<String, RenderError> {
        let body = match artifact {
            Artifact::PackageManifest => project::package_manifest(variant, config),
            Artifact::EnvTemplate => Some(project::env_template(config)),
            Artifact::Gitignore => Some(project::gitignore(config)),
            Artifact::Readme => Some(project::readme(config)),
            Artifact::Dockerfile => Some(project::dockerfile(config)),
            Artifact::Dockerignore => Some(project::dockerignore()),
            Artifact::DockerCompose => project::docker_compose(variant, config),
            Artifact::CiWorkflow => project::ci_workflow(variant, config),
            Artifact::OpenApiSpec => Some(project::openapi_spec(config)),
            Artifact::UploadsDir => Some(String::new()),

            Artifact::EntryPoint => server::entry_point(variant, config),
            Artifact::AppComposition => server::app_composition(variant, config),
            Artifact::DatabaseClient => server::database_client(variant),
            Artifact::RedisClient => Some(server::redis_client()),
            Artifact::SessionMiddleware => server::session_middleware(variant),
            Artifact::RateLimitMiddleware => server::rate_limit_middleware(variant, config),
            Artifact::Logger => Some(server::logger()),
            Artifact::RequestLogger => server::request_logger(variant),
            Artifact::ValidationMiddleware => server::validation_middleware(variant),
            Artifact::CorsConfig => server::cors_config(variant),
            Artifact::SecurityHeaders => server::security_headers(variant),
            Artifact::UploadMiddleware => server::upload_middleware(variant),
            Artifact::UploadRoutes => server::upload_routes(variant),
            Artifact::DocsRoutes => server::docs_routes(variant),
            Artifact::TestSetup => server::test_setup(variant),
            Artifact::HealthTest => Some(server::health_test()),

            Artifact::AuthController => Some(auth::auth_controller(config)),
            Artifact::AuthRoutes => auth::auth_routes(variant, config),
            Artifact::AuthMiddleware => auth::auth_middleware(variant),
            Artifact::UserModel => auth::user_model(variant),
            Artifact::OtpModel => auth::otp_model(variant),
            Artifact::ResetTokenModel => auth::reset_token_model(variant),
            Artifact::EmailService => auth::email_service(variant, config),
            Artifact::OtpService => Some(auth::otp_service()),
            Artifact::PasswordResetService => Some(auth::password_reset_service()),
            Artifact::AuthSchemas => Some(auth::auth_schemas(config)),
            Artifact::AuthTest => Some(auth::auth_test(config)),

            Artifact::ClientManifest => client::manifest(variant, config),
            Artifact::ClientIndexHtml => client::index_html(variant, config),
            Artifact::ClientViteConfig => client::vite_config(variant),
            Artifact::ClientEntry => client::entry(variant, config),
            Artifact::ClientRoot => client::root_component(variant, config),
            Artifact::ClientApi => Some(client::api_module()),
        };

        body.ok_or_else(|| RenderError::UnknownVariant {
            artifact,
            variant: variant.to_string(),
        })
    }
}

/// Framework a framework-keyed variant names
pub(crate) fn framework_variant(variant: &str) -> Option<Framework> {
    Framework::ALL.into_iter().find(|f| f.id() == variant)
}

/// Render a JSON object of string pairs with two-space indentation
pub(crate) fn json_object(entries: &[(&str, String)], indent: usize) -> String {
    if entries.is_empty() {
        return "{}".to_string();
    }
    let pad = " ".repeat(indent + 2);
    let body = entries
        .iter()
        .map(|(key, value)| format!("{}\"{}\": \"{}\"", pad, key, value))
        .collect::<Vec<_>>()
        .join(",\n");
    format!("{{\n{}\n{}}}", body, " ".repeat(indent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Configuration, Database, EmailProvider, Feature, Frontend};
    use crate::resolve::{expansion, resolve};
    use crate::rules::validate;

    #[test]
    fn test_json_object() {
        assert_eq!(json_object(&[], 0), "{}");
        assert_eq!(
            json_object(&[("a", "1".to_string()), ("b", "2".to_string())], 2),
            "{\n    \"a\": \"1\",\n    \"b\": \"2\"\n  }"
        );
    }

    #[test]
    fn test_every_registered_variant_has_a_body() {
        // A configuration per framework/database/provider/frontend combination
        // that touches every artifact at least once
        for framework in Framework::ALL {
            for database in Database::ALL {
                if database == Database::Mongodb && framework != Framework::Express {
                    continue;
                }
                for (provider, frontend) in [
                    (EmailProvider::Resend, Frontend::React),
                    (EmailProvider::Sendgrid, Frontend::Vue),
                    (EmailProvider::Smtp, Frontend::Svelte),
                ] {
                    let config = validate(
                        &Configuration::new("acme-api")
                            .with_framework(framework)
                            .with_database(database)
                            .with_features(Feature::ALL)
                            .with_email_provider(provider)
                            .with_frontend(frontend),
                    )
                    .unwrap();
                    let tasks = resolve(&config).unwrap();
                    assert_eq!(
                        tasks.len(),
                        expansion::all_artifacts().len(),
                        "full feature set should touch every artifact"
                    );
                    for task in &tasks {
                        BuiltinRenderer
                            .render(task.artifact, task.variant, &config)
                            .unwrap_or_else(|e| panic!("{}", e));
                    }
                }
            }
        }
    }

    #[test]
    fn test_unregistered_variant_is_an_error() {
        let config = validate(
            &Configuration::new("svc")
                .with_framework(Framework::Express)
                .with_database(Database::None),
        )
        .unwrap();
        let err = BuiltinRenderer
            .render(Artifact::AuthRoutes, "spring", &config)
            .unwrap_err();
        assert!(err.to_string().contains("spring"));
    }
}
