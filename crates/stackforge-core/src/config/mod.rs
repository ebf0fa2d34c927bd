//! Configuration model for a generation request
//!
//! This module provides:
//! - The stack enums (framework, database, email provider, frontend)
//! - The raw `Configuration` handed over by an input collector
//! - `ValidConfig`, the derived value the rest of the engine consumes
//! - Project file loading (YAML) with version compatibility checking

pub mod feature;
pub mod file;
pub mod version;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

pub use feature::Feature;
pub use file::{ConfigFileError, ProjectFile};

/// Supported backend frameworks
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Framework {
    Express,
    Fastify,
    Koa,
    Hapi,
}

impl Framework {
    pub const ALL: [Framework; 4] = [
        Framework::Express,
        Framework::Fastify,
        Framework::Koa,
        Framework::Hapi,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Framework::Express => "express",
            Framework::Fastify => "fastify",
            Framework::Koa => "koa",
            Framework::Hapi => "hapi",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Framework::Express => "Express",
            Framework::Fastify => "Fastify",
            Framework::Koa => "Koa",
            Framework::Hapi => "hapi",
        }
    }

    /// Only Express is fully supported; the others generate but are experimental
    pub fn is_experimental(&self) -> bool {
        !matches!(self, Framework::Express)
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Supported databases
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Database {
    #[serde(alias = "postgresql", alias = "pg")]
    #[value(alias = "postgresql", alias = "pg")]
    Postgres,
    #[serde(alias = "mariadb")]
    #[value(alias = "mariadb")]
    Mysql,
    Sqlite,
    #[serde(alias = "mongo")]
    #[value(alias = "mongo")]
    Mongodb,
    None,
}

/// Storage model a database belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseFamily {
    Relational,
    DocumentStore,
    /// No database; persistence is kept in process memory
    Memory,
}

impl DatabaseFamily {
    pub fn id(&self) -> &'static str {
        match self {
            DatabaseFamily::Relational => "relational",
            DatabaseFamily::DocumentStore => "document-store",
            DatabaseFamily::Memory => "memory",
        }
    }
}

impl Database {
    pub const ALL: [Database; 5] = [
        Database::Postgres,
        Database::Mysql,
        Database::Sqlite,
        Database::Mongodb,
        Database::None,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Database::Postgres => "postgres",
            Database::Mysql => "mysql",
            Database::Sqlite => "sqlite",
            Database::Mongodb => "mongodb",
            Database::None => "none",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Database::Postgres => "PostgreSQL",
            Database::Mysql => "MySQL",
            Database::Sqlite => "SQLite",
            Database::Mongodb => "MongoDB",
            Database::None => "None",
        }
    }

    pub fn family(&self) -> DatabaseFamily {
        match self {
            Database::Postgres | Database::Mysql | Database::Sqlite => DatabaseFamily::Relational,
            Database::Mongodb => DatabaseFamily::DocumentStore,
            Database::None => DatabaseFamily::Memory,
        }
    }
}

impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Transactional email providers
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum EmailProvider {
    Resend,
    Sendgrid,
    #[serde(alias = "nodemailer")]
    #[value(alias = "nodemailer")]
    Smtp,
    #[default]
    None,
}

impl EmailProvider {
    pub const ALL: [EmailProvider; 4] = [
        EmailProvider::Resend,
        EmailProvider::Sendgrid,
        EmailProvider::Smtp,
        EmailProvider::None,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            EmailProvider::Resend => "resend",
            EmailProvider::Sendgrid => "sendgrid",
            EmailProvider::Smtp => "smtp",
            EmailProvider::None => "none",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            EmailProvider::Resend => "Resend",
            EmailProvider::Sendgrid => "SendGrid",
            EmailProvider::Smtp => "SMTP (Nodemailer)",
            EmailProvider::None => "None",
        }
    }
}

impl fmt::Display for EmailProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Optional client application generated next to the backend
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Frontend {
    #[default]
    None,
    React,
    Vue,
    Svelte,
}

impl Frontend {
    pub const ALL: [Frontend; 4] = [
        Frontend::None,
        Frontend::React,
        Frontend::Vue,
        Frontend::Svelte,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Frontend::None => "none",
            Frontend::React => "react",
            Frontend::Vue => "vue",
            Frontend::Svelte => "svelte",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Frontend::None => "None",
            Frontend::React => "React",
            Frontend::Vue => "Vue",
            Frontend::Svelte => "Svelte",
        }
    }
}

impl fmt::Display for Frontend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A generation request as collected from the user
///
/// `framework` and `database` are optional because an input collector may
/// leave them unanswered; validation reports their absence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Project identifier, also the name of the output directory
    #[serde(default)]
    pub project_name: String,

    #[serde(default)]
    pub framework: Option<Framework>,

    #[serde(default)]
    pub database: Option<Database>,

    /// Selected optional features
    #[serde(default)]
    pub features: BTreeSet<Feature>,

    #[serde(default)]
    pub email_provider: EmailProvider,

    #[serde(default)]
    pub frontend: Frontend,
}

impl Configuration {
    /// Start a configuration with only the project name filled in
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            framework: None,
            database: None,
            features: BTreeSet::new(),
            email_provider: EmailProvider::None,
            frontend: Frontend::None,
        }
    }

    pub fn with_framework(mut self, framework: Framework) -> Self {
        self.framework = Some(framework);
        self
    }

    pub fn with_database(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    pub fn with_features(mut self, features: impl IntoIterator<Item = Feature>) -> Self {
        self.features.extend(features);
        self
    }

    pub fn with_email_provider(mut self, provider: EmailProvider) -> Self {
        self.email_provider = provider;
        self
    }

    pub fn with_frontend(mut self, frontend: Frontend) -> Self {
        self.frontend = frontend;
        self
    }

    pub fn has(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }
}

/// Non-fatal observations about a configuration that passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigWarning {
    /// The framework generates, but is not the fully supported stack
    ExperimentalFramework(Framework),
    /// An email provider was chosen but no feature sends email
    UnusedEmailProvider(EmailProvider),
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::ExperimentalFramework(fw) => write!(
                f,
                "{} support is experimental; {} is the fully supported framework",
                fw.display_name(),
                Framework::Express.display_name()
            ),
            ConfigWarning::UnusedEmailProvider(p) => write!(
                f,
                "Email provider {} is ignored because no selected feature sends email",
                p.display_name()
            ),
        }
    }
}

/// A configuration that passed every validation rule
///
/// Only the rule validator constructs this value, so holding one proves the
/// request is coherent. Downstream stages read it and never mutate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidConfig {
    project_name: String,
    framework: Framework,
    database: Database,
    features: BTreeSet<Feature>,
    email_provider: EmailProvider,
    frontend: Frontend,
    warnings: Vec<ConfigWarning>,
}

impl ValidConfig {
    pub(crate) fn new(
        config: &Configuration,
        framework: Framework,
        database: Database,
        warnings: Vec<ConfigWarning>,
    ) -> Self {
        Self {
            project_name: config.project_name.clone(),
            framework,
            database,
            features: config.features.clone(),
            email_provider: config.email_provider,
            frontend: config.frontend,
            warnings,
        }
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn framework(&self) -> Framework {
        self.framework
    }

    pub fn database(&self) -> Database {
        self.database
    }

    pub fn features(&self) -> &BTreeSet<Feature> {
        &self.features
    }

    pub fn email_provider(&self) -> EmailProvider {
        self.email_provider
    }

    pub fn frontend(&self) -> Frontend {
        self.frontend
    }

    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }

    pub fn has(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    /// Whether any selected feature sends transactional email
    pub fn sends_email(&self) -> bool {
        self.features.iter().any(Feature::requires_email)
    }
}
