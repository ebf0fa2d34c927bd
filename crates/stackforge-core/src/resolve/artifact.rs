//! Artifact vocabulary and the static artifact table
//!
//! Every logical file the engine can generate has one entry here: its stable
//! id, the path template it is placed at, the namespace it belongs to, how its
//! variant is chosen, and which variants have a registered body.

use std::fmt;

/// One logical generated file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Artifact {
    // Base
    PackageManifest,
    EntryPoint,
    AppComposition,
    EnvTemplate,
    DatabaseClient,
    Gitignore,
    Readme,
    // Authentication
    AuthController,
    AuthRoutes,
    AuthMiddleware,
    UserModel,
    EmailService,
    // Email OTP
    OtpModel,
    OtpService,
    // Password reset
    ResetTokenModel,
    PasswordResetService,
    // Redis
    RedisClient,
    SessionMiddleware,
    // Rate limiting
    RateLimitMiddleware,
    // Logging
    Logger,
    RequestLogger,
    // Validation
    ValidationMiddleware,
    AuthSchemas,
    // CORS / security headers
    CorsConfig,
    SecurityHeaders,
    // File uploads
    UploadMiddleware,
    UploadRoutes,
    UploadsDir,
    // API docs
    OpenApiSpec,
    DocsRoutes,
    // Docker
    Dockerfile,
    Dockerignore,
    DockerCompose,
    // Tests
    TestSetup,
    HealthTest,
    AuthTest,
    // CI
    CiWorkflow,
    // Frontend
    ClientManifest,
    ClientIndexHtml,
    ClientViteConfig,
    ClientEntry,
    ClientRoot,
    ClientApi,
}

/// Which part of the project an artifact belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Server code at the project root
    Backend,
    /// Client application under `client/`
    Frontend,
}

impl Namespace {
    /// Subfolder every path in this namespace is placed under
    pub fn directory(&self) -> Option<&'static str> {
        match self {
            Namespace::Backend => None,
            Namespace::Frontend => Some("client"),
        }
    }
}

/// The configuration input an artifact's variant is derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantRule {
    /// Single implementation, variant `default`
    Fixed,
    /// One implementation per backend framework
    Framework,
    /// One implementation per database driver
    Database,
    /// One implementation per storage family (`relational`, `document-store`, `memory`)
    Storage,
    /// One implementation per email provider
    EmailProvider,
    /// One implementation per client framework
    Frontend,
}

/// Static description of an artifact
#[derive(Debug, Clone, Copy)]
pub struct ArtifactSpec {
    /// Path relative to the namespace directory. Placeholders:
    /// `{project}`, `{Project}`, `{Entity}`, `{script}`, `{component}`
    pub path: &'static str,
    /// Identifier of the type this file defines, if any
    pub entity: Option<&'static str>,
    pub namespace: Namespace,
    pub rule: VariantRule,
    /// Variants with a registered body
    pub variants: &'static [&'static str],
}

pub const DEFAULT_VARIANT: &str = "default";

const FIXED: &[&str] = &[DEFAULT_VARIANT];
const FRAMEWORKS: &[&str] = &["express", "fastify", "koa", "hapi"];
const DATABASES: &[&str] = &["postgres", "mysql", "sqlite", "mongodb", "none"];
const STORAGE: &[&str] = &["relational", "document-store", "memory"];
const EMAIL_PROVIDERS: &[&str] = &["resend", "sendgrid", "smtp"];
const FRONTENDS: &[&str] = &["react", "vue", "svelte"];

const fn backend(
    path: &'static str,
    rule: VariantRule,
    variants: &'static [&'static str],
) -> ArtifactSpec {
    ArtifactSpec {
        path,
        entity: None,
        namespace: Namespace::Backend,
        rule,
        variants,
    }
}

const fn model(entity: &'static str) -> ArtifactSpec {
    ArtifactSpec {
        path: "src/models/{Entity}.js",
        entity: Some(entity),
        namespace: Namespace::Backend,
        rule: VariantRule::Storage,
        variants: STORAGE,
    }
}

const fn client(
    path: &'static str,
    rule: VariantRule,
    variants: &'static [&'static str],
) -> ArtifactSpec {
    ArtifactSpec {
        path,
        entity: None,
        namespace: Namespace::Frontend,
        rule,
        variants,
    }
}

impl Artifact {
    /// Stable kebab-case identifier
    pub fn id(&self) -> &'static str {
        match self {
            Artifact::PackageManifest => "package-manifest",
            Artifact::EntryPoint => "entry-point",
            Artifact::AppComposition => "app-composition",
            Artifact::EnvTemplate => "env-template",
            Artifact::DatabaseClient => "database-client",
            Artifact::Gitignore => "gitignore",
            Artifact::Readme => "readme",
            Artifact::AuthController => "auth-controller",
            Artifact::AuthRoutes => "auth-routes",
            Artifact::AuthMiddleware => "auth-middleware",
            Artifact::UserModel => "user-model",
            Artifact::EmailService => "email-service",
            Artifact::OtpModel => "otp-model",
            Artifact::OtpService => "otp-service",
            Artifact::ResetTokenModel => "reset-token-model",
            Artifact::PasswordResetService => "password-reset-service",
            Artifact::RedisClient => "redis-client",
            Artifact::SessionMiddleware => "session-middleware",
            Artifact::RateLimitMiddleware => "rate-limit-middleware",
            Artifact::Logger => "logger",
            Artifact::RequestLogger => "request-logger",
            Artifact::ValidationMiddleware => "validation-middleware",
            Artifact::AuthSchemas => "auth-schemas",
            Artifact::CorsConfig => "cors-config",
            Artifact::SecurityHeaders => "security-headers",
            Artifact::UploadMiddleware => "upload-middleware",
            Artifact::UploadRoutes => "upload-routes",
            Artifact::UploadsDir => "uploads-dir",
            Artifact::OpenApiSpec => "openapi-spec",
            Artifact::DocsRoutes => "docs-routes",
            Artifact::Dockerfile => "dockerfile",
            Artifact::Dockerignore => "dockerignore",
            Artifact::DockerCompose => "docker-compose",
            Artifact::TestSetup => "test-setup",
            Artifact::HealthTest => "health-test",
            Artifact::AuthTest => "auth-test",
            Artifact::CiWorkflow => "ci-workflow",
            Artifact::ClientManifest => "client-manifest",
            Artifact::ClientIndexHtml => "client-index-html",
            Artifact::ClientViteConfig => "client-vite-config",
            Artifact::ClientEntry => "client-entry",
            Artifact::ClientRoot => "client-root",
            Artifact::ClientApi => "client-api",
        }
    }

    pub fn spec(&self) -> ArtifactSpec {
        use VariantRule as R;
        match self {
            Artifact::PackageManifest => backend("package.json", R::Framework, FRAMEWORKS),
            Artifact::EntryPoint => backend("src/server.js", R::Framework, FRAMEWORKS),
            Artifact::AppComposition => backend("src/app.js", R::Framework, FRAMEWORKS),
            Artifact::EnvTemplate => backend(".env.example", R::Fixed, FIXED),
            Artifact::DatabaseClient => backend("src/config/database.js", R::Database, DATABASES),
            Artifact::Gitignore => backend(".gitignore", R::Fixed, FIXED),
            Artifact::Readme => backend("README.md", R::Fixed, FIXED),
            Artifact::AuthController => {
                backend("src/controllers/auth.controller.js", R::Fixed, FIXED)
            }
            Artifact::AuthRoutes => backend("src/routes/auth.routes.js", R::Framework, FRAMEWORKS),
            Artifact::AuthMiddleware => {
                backend("src/middleware/auth.middleware.js", R::Framework, FRAMEWORKS)
            }
            Artifact::UserModel => model("user"),
            Artifact::EmailService => backend(
                "src/services/email.service.js",
                R::EmailProvider,
                EMAIL_PROVIDERS,
            ),
            Artifact::OtpModel => model("otp-code"),
            Artifact::OtpService => backend("src/services/otp.service.js", R::Fixed, FIXED),
            Artifact::ResetTokenModel => model("reset-token"),
            Artifact::PasswordResetService => {
                backend("src/services/password-reset.service.js", R::Fixed, FIXED)
            }
            Artifact::RedisClient => backend("src/config/redis.js", R::Fixed, FIXED),
            Artifact::SessionMiddleware => {
                backend("src/middleware/session.middleware.js", R::Framework, FRAMEWORKS)
            }
            Artifact::RateLimitMiddleware => backend(
                "src/middleware/rate-limit.middleware.js",
                R::Framework,
                FRAMEWORKS,
            ),
            Artifact::Logger => backend("src/utils/logger.js", R::Fixed, FIXED),
            Artifact::RequestLogger => backend(
                "src/middleware/request-logger.middleware.js",
                R::Framework,
                FRAMEWORKS,
            ),
            Artifact::ValidationMiddleware => {
                backend("src/middleware/validate.middleware.js", R::Framework, FRAMEWORKS)
            }
            Artifact::AuthSchemas => backend("src/validators/auth.schemas.js", R::Fixed, FIXED),
            Artifact::CorsConfig => backend("src/config/cors.js", R::Framework, FRAMEWORKS),
            Artifact::SecurityHeaders => {
                backend("src/config/security.js", R::Framework, FRAMEWORKS)
            }
            Artifact::UploadMiddleware => {
                backend("src/middleware/upload.middleware.js", R::Framework, FRAMEWORKS)
            }
            Artifact::UploadRoutes => {
                backend("src/routes/upload.routes.js", R::Framework, FRAMEWORKS)
            }
            Artifact::UploadsDir => backend("uploads/.gitkeep", R::Fixed, FIXED),
            Artifact::OpenApiSpec => backend("docs/openapi.yaml", R::Fixed, FIXED),
            Artifact::DocsRoutes => backend("src/routes/docs.routes.js", R::Framework, FRAMEWORKS),
            Artifact::Dockerfile => backend("Dockerfile", R::Fixed, FIXED),
            Artifact::Dockerignore => backend(".dockerignore", R::Fixed, FIXED),
            Artifact::DockerCompose => backend("docker-compose.yml", R::Database, DATABASES),
            Artifact::TestSetup => backend("tests/setup.js", R::Storage, STORAGE),
            Artifact::HealthTest => backend("tests/health.test.js", R::Fixed, FIXED),
            Artifact::AuthTest => backend("tests/auth.test.js", R::Fixed, FIXED),
            Artifact::CiWorkflow => {
                backend(".github/workflows/{project}-ci.yml", R::Database, DATABASES)
            }
            Artifact::ClientManifest => client("package.json", R::Frontend, FRONTENDS),
            Artifact::ClientIndexHtml => client("index.html", R::Frontend, FRONTENDS),
            Artifact::ClientViteConfig => client("vite.config.js", R::Frontend, FRONTENDS),
            Artifact::ClientEntry => client("src/main.{script}", R::Frontend, FRONTENDS),
            Artifact::ClientRoot => client("src/{Project}App.{component}", R::Frontend, FRONTENDS),
            Artifact::ClientApi => client("src/lib/api.js", R::Fixed, FIXED),
        }
    }

    /// Persistence-layer artifacts, whose variant follows the storage family
    pub fn is_persistence(&self) -> bool {
        self.spec().rule == VariantRule::Storage
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
