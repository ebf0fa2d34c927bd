//! Rule validator for generation requests
//!
//! Validation never fails abruptly: it reports. Every rule runs against the
//! configuration and all violations are returned together, in rule order, so
//! the caller can fix everything in one pass.

use crate::config::{
    ConfigWarning, Configuration, Database, EmailProvider, Feature, Framework, ValidConfig,
};
use std::fmt;
use thiserror::Error;

/// Machine-readable identifier of a broken rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationCode {
    InvalidProjectName,
    MissingFramework,
    MissingDatabase,
    FeatureRequiresAuth,
    FeatureRequiresEmailProvider,
    IncompatibleDatabase,
}

impl ViolationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationCode::InvalidProjectName => "invalid-project-name",
            ViolationCode::MissingFramework => "missing-framework",
            ViolationCode::MissingDatabase => "missing-database",
            ViolationCode::FeatureRequiresAuth => "feature-requires-auth",
            ViolationCode::FeatureRequiresEmailProvider => "feature-requires-email-provider",
            ViolationCode::IncompatibleDatabase => "incompatible-database",
        }
    }
}

impl fmt::Display for ViolationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One broken rule with a human-readable explanation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub code: ViolationCode,
    pub message: String,
}

impl Violation {
    fn new(code: ViolationCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Every violation found in a configuration, in rule order. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render_violations(.0))]
pub struct Violations(Vec<Violation>);

fn render_violations(violations: &[Violation]) -> String {
    let mut out = format!("Configuration has {} problem(s):\n", violations.len());
    for violation in violations {
        out.push_str(&format!("  - {}\n", violation));
    }
    out
}

impl Violations {
    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, code: ViolationCode) -> bool {
        self.0.iter().any(|v| v.code == code)
    }

    pub fn into_vec(self) -> Vec<Violation> {
        self.0
    }
}


type Rule = fn(&Configuration) -> Option<Violation>;

/// Rules in precedence order
const RULES: &[Rule] = &[
    check_project_name,
    check_framework_present,
    check_database_present,
    check_auth_dependency,
    check_email_dependency,
    check_database_compatibility,
];

/// Validate a configuration, producing the derived `ValidConfig` on success
pub fn validate(config: &Configuration) -> Result<ValidConfig, Violations> {
    let violations: Vec<Violation> = RULES.iter().filter_map(|rule| rule(config)).collect();

    match (config.framework, config.database) {
        (Some(framework), Some(database)) if violations.is_empty() => {
            let warnings = collect_warnings(config, framework);
            tracing::debug!(
                project = %config.project_name,
                warnings = warnings.len(),
                "configuration is valid"
            );
            Ok(ValidConfig::new(config, framework, database, warnings))
        }
        _ => {
            tracing::debug!(
                project = %config.project_name,
                violations = violations.len(),
                "configuration rejected"
            );
            Err(Violations(violations))
        }
    }
}

/// Whether a name matches `^[A-Za-z][A-Za-z0-9_-]*$`
pub fn is_valid_project_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        }
        _ => false,
    }
}

fn check_project_name(config: &Configuration) -> Option<Violation> {
    let name = config.project_name.as_str();
    if name.is_empty() {
        return Some(Violation::new(
            ViolationCode::InvalidProjectName,
            "Project name is required",
        ));
    }
    if !is_valid_project_name(name) {
        return Some(Violation::new(
            ViolationCode::InvalidProjectName,
            format!(
                "Project name '{}' must start with a letter and contain only letters, digits, '-' or '_'",
                name
            ),
        ));
    }
    None
}

fn check_framework_present(config: &Configuration) -> Option<Violation> {
    config.framework.is_none().then(|| {
        Violation::new(
            ViolationCode::MissingFramework,
            "A backend framework must be selected",
        )
    })
}

fn check_database_present(config: &Configuration) -> Option<Violation> {
    config.database.is_none().then(|| {
        Violation::new(
            ViolationCode::MissingDatabase,
            "A database must be selected (choose 'none' to skip persistence)",
        )
    })
}

fn offending_tokens(config: &Configuration, pred: fn(&Feature) -> bool) -> Vec<&'static str> {
    config
        .features
        .iter()
        .filter(|f| pred(f))
        .map(Feature::token)
        .collect()
}

fn check_auth_dependency(config: &Configuration) -> Option<Violation> {
    if config.has(Feature::Auth) {
        return None;
    }
    let offending = offending_tokens(config, Feature::requires_auth);
    (!offending.is_empty()).then(|| {
        Violation::new(
            ViolationCode::FeatureRequiresAuth,
            format!(
                "{} require{} the '{}' feature",
                offending.join(", "),
                if offending.len() == 1 { "s" } else { "" },
                Feature::Auth.token()
            ),
        )
    })
}

fn check_email_dependency(config: &Configuration) -> Option<Violation> {
    if config.email_provider != EmailProvider::None {
        return None;
    }
    let offending = offending_tokens(config, Feature::requires_email);
    (!offending.is_empty()).then(|| {
        Violation::new(
            ViolationCode::FeatureRequiresEmailProvider,
            format!(
                "{} send{} email; choose an email provider",
                offending.join(", "),
                if offending.len() == 1 { "s" } else { "" }
            ),
        )
    })
}

fn check_database_compatibility(config: &Configuration) -> Option<Violation> {
    match (config.database, config.framework) {
        (Some(Database::Mongodb), Some(framework)) if framework != Framework::Express => {
            Some(Violation::new(
                ViolationCode::IncompatibleDatabase,
                format!(
                    "{} is only supported with {}, not {}",
                    Database::Mongodb.display_name(),
                    Framework::Express.display_name(),
                    framework.display_name()
                ),
            ))
        }
        _ => None,
    }
}

fn collect_warnings(config: &Configuration, framework: Framework) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();
    if framework.is_experimental() {
        warnings.push(ConfigWarning::ExperimentalFramework(framework));
    }
    let sends_email = config.features.iter().any(Feature::requires_email);
    if config.email_provider != EmailProvider::None && !sends_email {
        warnings.push(ConfigWarning::UnusedEmailProvider(config.email_provider));
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acme() -> Configuration {
        Configuration::new("acme-api")
            .with_framework(Framework::Express)
            .with_database(Database::Mongodb)
    }

    fn codes(violations: &Violations) -> Vec<ViolationCode> {
        violations.iter().map(|v| v.code).collect()
    }

    #[test]
    fn test_project_name_pattern() {
        assert!(is_valid_project_name("acme-api"));
        assert!(is_valid_project_name("A_1"));
        assert!(!is_valid_project_name(""));
        assert!(!is_valid_project_name("1api"));
        assert!(!is_valid_project_name("-api"));
        assert!(!is_valid_project_name("my api"));
        assert!(!is_valid_project_name("api.js"));
    }

    #[test]
    fn test_valid_configuration() {
        let valid = validate(&acme().with_features([Feature::Auth])).unwrap();
        assert_eq!(valid.project_name(), "acme-api");
        assert_eq!(valid.database(), Database::Mongodb);
        assert!(valid.warnings().is_empty());
    }

    #[test]
    fn test_all_violations_reported_in_order() {
        let config = Configuration::new("9lives").with_features([Feature::EmailOtp]);
        let violations = validate(&config).unwrap_err();
        assert_eq!(
            codes(&violations),
            vec![
                ViolationCode::InvalidProjectName,
                ViolationCode::MissingFramework,
                ViolationCode::MissingDatabase,
                ViolationCode::FeatureRequiresAuth,
                ViolationCode::FeatureRequiresEmailProvider,
            ]
        );
    }

    #[test]
    fn test_otp_requires_auth() {
        let config = acme()
            .with_features([Feature::EmailOtp])
            .with_email_provider(EmailProvider::Resend);
        let violations = validate(&config).unwrap_err();
        assert_eq!(codes(&violations), vec![ViolationCode::FeatureRequiresAuth]);
        assert!(violations.to_string().contains("email-otp requires the 'auth' feature"));

        let fixed = config.with_features([Feature::Auth]);
        assert!(validate(&fixed).is_ok());
    }

    #[test]
    fn test_violations_render_as_error_list() {
        let violations = validate(&Configuration::new("")).unwrap_err();
        let err: Box<dyn std::error::Error> = Box::new(violations.clone());
        let rendered = err.to_string();

        assert!(rendered.starts_with(&format!(
            "Configuration has {} problem(s):\n",
            violations.len()
        )));
        assert_eq!(rendered.lines().count(), violations.len() + 1);
        assert!(rendered
            .lines()
            .skip(1)
            .all(|line| line.starts_with("  - [")));
        assert!(err.source().is_none());
    }

    #[test]
    fn test_password_reset_requires_auth() {
        let config = acme()
            .with_features([Feature::PasswordReset])
            .with_email_provider(EmailProvider::Smtp);
        let violations = validate(&config).unwrap_err();
        assert!(violations.contains(ViolationCode::FeatureRequiresAuth));
    }

    #[test]
    fn test_otp_requires_email_provider() {
        let config = acme().with_features([Feature::Auth, Feature::EmailOtp]);
        let violations = validate(&config).unwrap_err();
        assert_eq!(
            codes(&violations),
            vec![ViolationCode::FeatureRequiresEmailProvider]
        );
    }

    #[test]
    fn test_document_store_needs_express() {
        let config = acme().with_framework(Framework::Fastify);
        let violations = validate(&config).unwrap_err();
        assert_eq!(codes(&violations), vec![ViolationCode::IncompatibleDatabase]);
        assert!(violations.to_string().contains("Fastify"));
    }

    #[test]
    fn test_relational_with_experimental_framework_warns() {
        let config = Configuration::new("svc")
            .with_framework(Framework::Koa)
            .with_database(Database::Postgres);
        let valid = validate(&config).unwrap();
        assert_eq!(
            valid.warnings(),
            &[ConfigWarning::ExperimentalFramework(Framework::Koa)]
        );
    }

    #[test]
    fn test_unused_email_provider_warns() {
        let config = acme().with_email_provider(EmailProvider::Sendgrid);
        let valid = validate(&config).unwrap();
        assert_eq!(
            valid.warnings(),
            &[ConfigWarning::UnusedEmailProvider(EmailProvider::Sendgrid)]
        );
    }

    #[test]
    fn test_validation_is_deterministic() {
        let config = Configuration::new("").with_features([Feature::PasswordReset]);
        assert_eq!(validate(&config).unwrap_err(), validate(&config).unwrap_err());
    }
}
