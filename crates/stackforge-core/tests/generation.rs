//! Whole-pipeline properties over the configuration cross-product

use stackforge_core::assemble::{assemble, RenderError};
use stackforge_core::resolve::{expansion, resolve, Artifact};
use stackforge_core::rules::validate;
use stackforge_core::{
    generate, BuiltinRenderer, Configuration, Database, EmailProvider, Feature, Framework,
    Frontend, ProjectFile, ValidConfig, ViolationCode,
};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

/// Cheap renderer so the cross-product stays fast
fn stub(artifact: Artifact, variant: &str, _: &ValidConfig) -> Result<String, RenderError> {
    Ok(format!("{}:{}", artifact, variant))
}

/// Every subset of `Feature::ALL`, as a bitmask-indexed list
fn all_feature_sets() -> impl Iterator<Item = Vec<Feature>> {
    (0u32..(1 << Feature::ALL.len())).map(|mask| {
        Feature::ALL
            .into_iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, f)| f)
            .collect()
    })
}

fn config(
    framework: Framework,
    database: Database,
    features: &[Feature],
    provider: EmailProvider,
) -> Configuration {
    Configuration::new("acme-api")
        .with_framework(framework)
        .with_database(database)
        .with_features(features.iter().copied())
        .with_email_provider(provider)
}

#[test]
fn test_no_collisions_or_missing_variants_across_valid_configurations() {
    let mut checked = 0usize;
    let mut seen_variants: HashSet<(Artifact, &'static str)> = HashSet::new();

    for features in all_feature_sets() {
        for framework in Framework::ALL {
            for database in Database::ALL {
                for provider in EmailProvider::ALL {
                    for frontend in Frontend::ALL {
                        let configuration =
                            config(framework, database, &features, provider).with_frontend(frontend);
                        let Ok(valid) = validate(&configuration) else {
                            continue;
                        };
                        let context = || {
                            format!(
                                "{:?} {} {} {} {}",
                                features, framework, database, provider, frontend
                            )
                        };

                        let tasks =
                            resolve(&valid).unwrap_or_else(|e| panic!("{}: {}", context(), e));
                        let tree = assemble(&tasks, &stub, &valid)
                            .unwrap_or_else(|e| panic!("{}: {}", context(), e));

                        assert_eq!(tree.len(), tasks.len(), "tree must be total: {}", context());
                        let artifacts: HashSet<_> = tasks.iter().map(|t| t.artifact).collect();
                        assert_eq!(artifacts.len(), tasks.len(), "tasks must be distinct");

                        if valid.has(Feature::EmailOtp) {
                            for required in [
                                Artifact::AuthController,
                                Artifact::AuthRoutes,
                                Artifact::AuthMiddleware,
                                Artifact::EmailService,
                            ] {
                                assert!(
                                    artifacts.contains(&required),
                                    "{} missing {}",
                                    context(),
                                    required
                                );
                            }
                        }

                        let again = resolve(&valid).unwrap();
                        assert_eq!(again, tasks, "resolve is not deterministic: {}", context());
                        assert_eq!(
                            assemble(&again, &stub, &valid).unwrap(),
                            tree,
                            "assemble is not deterministic: {}",
                            context()
                        );

                        seen_variants.extend(tasks.iter().map(|t| (t.artifact, t.variant)));
                        checked += 1;
                    }
                }
            }
        }
    }

    assert!(checked > 0);
    for artifact in expansion::all_artifacts() {
        for variant in artifact.spec().variants {
            assert!(
                seen_variants.contains(&(artifact, *variant)),
                "variant '{}' of '{}' is never selected",
                variant,
                artifact
            );
        }
    }
}

#[test]
fn test_every_provider_and_frontend_resolves() {
    for provider in EmailProvider::ALL {
        for frontend in Frontend::ALL {
            let configuration = config(
                Framework::Express,
                Database::Postgres,
                &[Feature::Auth, Feature::EmailOtp, Feature::PasswordReset],
                provider,
            )
            .with_frontend(frontend);

            match generate(&configuration, &BuiltinRenderer) {
                Ok(generation) => {
                    assert_ne!(provider, EmailProvider::None);
                    let client_files = generation
                        .tree
                        .paths()
                        .filter(|p| p.starts_with("client/"))
                        .count();
                    if frontend == Frontend::None {
                        assert_eq!(client_files, 0);
                    } else {
                        assert_eq!(client_files, 6);
                    }
                }
                Err(err) => {
                    assert_eq!(provider, EmailProvider::None);
                    assert!(err
                        .violations()
                        .unwrap()
                        .contains(ViolationCode::FeatureRequiresEmailProvider));
                }
            }
        }
    }
}

#[test]
fn test_generation_is_deterministic() {
    let configuration = config(
        Framework::Fastify,
        Database::Mysql,
        &[
            Feature::Tests,
            Feature::Auth,
            Feature::Redis,
            Feature::RateLimit,
            Feature::ApiDocs,
        ],
        EmailProvider::None,
    );
    let first = generate(&configuration, &BuiltinRenderer).unwrap();
    let second = generate(&configuration, &BuiltinRenderer).unwrap();
    assert_eq!(first.tasks, second.tasks);
    assert_eq!(first.tree, second.tree);
}

#[test]
fn test_validator_enforces_auth_dependency_for_every_feature_set() {
    for features in all_feature_sets() {
        let needs_auth = features.iter().any(Feature::requires_auth);
        let has_auth = features.contains(&Feature::Auth);
        let result = validate(&config(
            Framework::Express,
            Database::Postgres,
            &features,
            EmailProvider::Resend,
        ));

        match result {
            Ok(_) => assert!(!needs_auth || has_auth, "{:?} should be rejected", features),
            Err(violations) => {
                assert!(needs_auth && !has_auth, "{:?} should be accepted", features);
                assert_eq!(violations.len(), 1);
                assert!(violations.contains(ViolationCode::FeatureRequiresAuth));
            }
        }
    }
}

#[test]
fn test_email_otp_pulls_in_its_dependencies() {
    let valid = validate(&config(
        Framework::Express,
        Database::Sqlite,
        &[Feature::Auth, Feature::EmailOtp],
        EmailProvider::Sendgrid,
    ))
    .unwrap();
    let tasks = resolve(&valid).unwrap();
    let artifacts: BTreeSet<_> = tasks.iter().map(|t| t.artifact).collect();

    for required in [
        Artifact::AuthController,
        Artifact::AuthRoutes,
        Artifact::AuthMiddleware,
        Artifact::UserModel,
        Artifact::EmailService,
        Artifact::OtpModel,
        Artifact::OtpService,
    ] {
        assert!(artifacts.contains(&required), "missing {}", required);
    }
    let email = tasks
        .iter()
        .find(|t| t.artifact == Artifact::EmailService)
        .unwrap();
    assert_eq!(email.variant, "sendgrid");
}

#[test]
fn test_document_store_auth_project() {
    let valid = validate(&config(
        Framework::Express,
        Database::Mongodb,
        &[Feature::Auth],
        EmailProvider::None,
    ))
    .unwrap();
    let tasks = resolve(&valid).unwrap();

    let artifacts: Vec<_> = tasks.iter().map(|t| t.artifact).collect();
    let mut expected = expansion::BASE.to_vec();
    expected.extend([
        Artifact::AuthController,
        Artifact::AuthRoutes,
        Artifact::AuthMiddleware,
        Artifact::UserModel,
    ]);
    assert_eq!(artifacts, expected);
    assert!(!artifacts.contains(&Artifact::EmailService));

    for task in tasks.iter().filter(|t| t.artifact.is_persistence()) {
        assert_eq!(task.variant, "document-store");
    }
}

#[test]
fn test_otp_without_provider_never_resolves() {
    let err = generate(
        &config(
            Framework::Express,
            Database::Mongodb,
            &[Feature::Auth, Feature::EmailOtp],
            EmailProvider::None,
        ),
        &BuiltinRenderer,
    )
    .unwrap_err();
    let violations = err.violations().unwrap();
    assert_eq!(violations.len(), 1);
    assert!(violations.contains(ViolationCode::FeatureRequiresEmailProvider));
    assert!(!err.is_defect());
}

#[test]
fn test_document_store_requires_express() {
    for framework in Framework::ALL {
        let result = validate(&config(framework, Database::Mongodb, &[], EmailProvider::None));
        if framework == Framework::Express {
            assert!(result.is_ok());
        } else {
            assert!(result
                .unwrap_err()
                .contains(ViolationCode::IncompatibleDatabase));
        }
    }
}

#[test]
fn test_project_file_drives_generation() {
    let yaml = r#"
project_name: shop
framework: koa
database: pg
features: [auth, otp, swagger, docker]
email_provider: nodemailer
frontend: svelte
"#;
    let file = ProjectFile::from_yaml(yaml, Path::new("stackforge.yaml")).unwrap();
    let generation = generate(&file.config, &BuiltinRenderer).unwrap();

    assert_eq!(generation.config.database(), Database::Postgres);
    assert_eq!(generation.config.email_provider(), EmailProvider::Smtp);
    assert!(generation.tree.contains("docs/openapi.yaml"));
    assert!(generation.tree.contains("client/src/ShopApp.svelte"));
    assert!(generation
        .tree
        .get("src/services/email.service.js")
        .unwrap()
        .content
        .contains("nodemailer"));
}
