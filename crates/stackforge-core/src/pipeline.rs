//! End-to-end generation: validate, resolve, assemble, then emit on demand

use crate::assemble::{assemble, ArtifactRenderer, VirtualTree};
use crate::config::{Configuration, Feature, Frontend, ValidConfig};
use crate::emit::{emit, EmitError, EmitReport, Sink};
use crate::error::GenerateError;
use crate::resolve::{resolve, GenerationTask};
use crate::rules::validate;
use std::path::Path;

/// Result of a successful in-memory generation
#[derive(Debug, Clone)]
pub struct Generation {
    pub config: ValidConfig,
    pub tasks: Vec<GenerationTask>,
    pub tree: VirtualTree,
}

/// Run the pure pipeline; nothing is written anywhere
pub fn generate<R: ArtifactRenderer + ?Sized>(
    config: &Configuration,
    renderer: &R,
) -> Result<Generation, GenerateError> {
    let config = validate(config)?;
    for warning in config.warnings() {
        tracing::warn!("{}", warning);
    }

    let tasks = resolve(&config)?;
    let tree = assemble(&tasks, renderer, &config)?;
    Ok(Generation {
        config,
        tasks,
        tree,
    })
}

impl Generation {
    /// Flush the tree into `sink`
    pub async fn emit<S: Sink>(&self, sink: &mut S) -> Result<EmitReport, EmitError> {
        emit(&self.tree, sink).await
    }

    /// Shell commands to get the generated project running from `dir`
    pub fn next_steps(&self, dir: &Path) -> Vec<String> {
        let mut steps = vec![
            format!("cd {}", dir.display()),
            "cp .env.example .env".to_string(),
        ];
        if self.config.has(Feature::Docker) {
            steps.push("docker compose up -d".to_string());
        }
        steps.push("npm install".to_string());
        steps.push("npm run dev".to_string());
        if self.config.has(Feature::Tests) {
            steps.push("npm test".to_string());
        }
        if self.config.frontend() != Frontend::None {
            steps.push("cd client && npm install && npm run dev".to_string());
        }
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bodies::BuiltinRenderer;
    use crate::config::{Database, Framework};
    use crate::rules::ViolationCode;

    #[test]
    fn test_generate_builds_tree() {
        let config = Configuration::new("acme-api")
            .with_framework(Framework::Express)
            .with_database(Database::Postgres)
            .with_features([Feature::Auth]);
        let generation = generate(&config, &BuiltinRenderer).unwrap();
        assert_eq!(generation.tree.len(), generation.tasks.len());
        assert!(generation.tree.contains("src/routes/auth.routes.js"));
    }

    #[test]
    fn test_generate_reports_violations() {
        let config = Configuration::new("acme-api").with_features([Feature::EmailOtp]);
        let err = generate(&config, &BuiltinRenderer).unwrap_err();
        let violations = err.violations().unwrap();
        assert!(violations.contains(ViolationCode::MissingFramework));
        assert!(violations.contains(ViolationCode::FeatureRequiresAuth));
    }

    #[test]
    fn test_next_steps_follow_features() {
        let config = Configuration::new("shop")
            .with_framework(Framework::Fastify)
            .with_database(Database::Mysql)
            .with_features([Feature::Docker, Feature::Tests])
            .with_frontend(Frontend::React);
        let generation = generate(&config, &BuiltinRenderer).unwrap();
        let steps = generation.next_steps(Path::new("shop"));
        assert_eq!(steps[0], "cd shop");
        assert!(steps.contains(&"docker compose up -d".to_string()));
        assert!(steps.contains(&"npm test".to_string()));
        assert_eq!(steps.last().unwrap(), "cd client && npm install && npm run dev");
    }

    #[tokio::test]
    async fn test_emit_into_archive() {
        let config = Configuration::new("svc")
            .with_framework(Framework::Koa)
            .with_database(Database::None);
        let generation = generate(&config, &BuiltinRenderer).unwrap();
        let mut sink = crate::emit::ArchiveSink::new("svc");
        let report = generation.emit(&mut sink).await.unwrap();
        assert_eq!(report.written, generation.tree.len());
        assert_eq!(sink.len(), generation.tree.len());
    }
}
