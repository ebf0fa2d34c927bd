//! Stackforge Core - configuration-to-file-tree engine for backend projects
//!
//! This library turns a declarative stack description (framework, database,
//! features, email provider, client) into a complete project tree. It is used
//! by the `stackforge` binary and can be embedded by other front ends.
//!
//! # Architecture
//!
//! The pipeline is organized into stages, each pure except the last:
//!
//! - **Validate** (`rules`) - collects every violated rule or produces a `ValidConfig`
//! - **Resolve** (`resolve`) - expands features into ordered, de-duplicated tasks
//! - **Assemble** (`assemble`) - renders tasks into an in-memory `VirtualTree`
//! - **Emit** (`emit`) - flushes the tree into a `Sink` (directory or zip)
//!
//! `pipeline::generate` runs the first three stages in one call.
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based interactive wizard
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use stackforge_core::{generate, BuiltinRenderer, Configuration, Database, Feature, Framework};
//!
//! let config = Configuration::new("acme-api")
//!     .with_framework(Framework::Express)
//!     .with_database(Database::Postgres)
//!     .with_features([Feature::Auth, Feature::Docker]);
//! let generation = generate(&config, &BuiltinRenderer)?;
//! let mut sink = FsSink::create(Path::new("."), "acme-api").await?;
//! generation.emit(&mut sink).await?;
//! ```

pub mod assemble;
pub mod bodies;
pub mod config;
pub mod emit;
pub mod error;
pub mod pipeline;
pub mod resolve;
pub mod rules;
pub mod runtime;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use assemble::{assemble, ArtifactRenderer, AssembleError, RenderError, VirtualTree};
pub use bodies::BuiltinRenderer;
pub use config::{
    ConfigFileError, ConfigWarning, Configuration, Database, EmailProvider, Feature, Framework,
    Frontend, ProjectFile, ValidConfig,
};
pub use emit::{emit, ArchiveSink, EmitError, EmitReport, FsSink, Sink, SinkError};
pub use error::GenerateError;
pub use pipeline::{generate, Generation};
pub use resolve::{resolve, Artifact, GenerationTask, ResolveError};
pub use rules::{validate, Violation, ViolationCode, Violations};
pub use runtime::{check_runtimes, RuntimeInfo};

#[cfg(feature = "tui")]
pub use tui::run;

#[cfg(all(test, not(feature = "tui")))]
mod tests {
    use super::*;

    #[test]
    fn test_engine_runs_without_wizard() {
        let config = Configuration::new("svc")
            .with_framework(Framework::Express)
            .with_database(Database::Sqlite);
        let generation = generate(&config, &BuiltinRenderer).unwrap();
        assert!(generation.tree.contains("src/app.js"));
    }
}
