//! Runtime detection for Node.js, npm and Docker

use crate::config::{Feature, ValidConfig};
use std::fmt;
use std::process::Command;

/// Runtime detection result
#[derive(Debug, Clone)]
pub struct RuntimeInfo {
    pub name: &'static str,
    pub version: Option<String>,
    pub available: bool,
    /// Where to get it when missing
    pub install_hint: &'static str,
}

impl fmt::Display for RuntimeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.version, self.available) {
            (Some(version), true) => write!(f, "{} {}", self.name, version),
            (None, true) => write!(f, "{}", self.name),
            (_, false) => write!(f, "{} not found (install from {})", self.name, self.install_hint),
        }
    }
}

/// Run `<program> --version` and capture the first line of its output
fn probe(program: &str, name: &'static str, install_hint: &'static str) -> RuntimeInfo {
    let output = Command::new(program).arg("--version").output();

    match output {
        Ok(out) if out.status.success() => {
            let version = String::from_utf8_lossy(&out.stdout)
                .lines()
                .next()
                .unwrap_or_default()
                .trim()
                .to_string();
            RuntimeInfo {
                name,
                version: (!version.is_empty()).then_some(version),
                available: true,
                install_hint,
            }
        }
        _ => RuntimeInfo {
            name,
            version: None,
            available: false,
            install_hint,
        },
    }
}

/// Check if Node.js is available
pub fn check_node() -> RuntimeInfo {
    probe("node", "Node.js", "https://nodejs.org")
}

/// Check if npm is available
pub fn check_npm() -> RuntimeInfo {
    probe("npm", "npm", "https://nodejs.org")
}

/// Check if Docker is available
pub fn check_docker() -> RuntimeInfo {
    probe("docker", "Docker", "https://docs.docker.com/get-docker")
}

/// Report the tools `config` needs; missing ones are logged, never fatal
pub fn check_runtimes(config: &ValidConfig) -> Vec<RuntimeInfo> {
    let mut results = vec![check_node(), check_npm()];
    if config.has(Feature::Docker) {
        results.push(check_docker());
    }

    for info in results.iter().filter(|r| !r.available) {
        tracing::warn!(runtime = info.name, "runtime not found");
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Configuration, Database, Framework};
    use crate::rules::validate;

    #[test]
    fn test_missing_program_is_unavailable() {
        let info = probe("stackforge-no-such-binary", "Nothing", "https://example.com");
        assert!(!info.available);
        assert!(info.version.is_none());
        assert_eq!(
            info.to_string(),
            "Nothing not found (install from https://example.com)"
        );
    }

    #[test]
    fn test_docker_checked_only_with_docker_feature() {
        let base = Configuration::new("svc")
            .with_framework(Framework::Express)
            .with_database(Database::None);

        let plain = validate(&base).unwrap();
        let names: Vec<_> = check_runtimes(&plain).iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Node.js", "npm"]);

        let docker = validate(&base.with_features([Feature::Docker])).unwrap();
        let names: Vec<_> = check_runtimes(&docker).iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Node.js", "npm", "Docker"]);
    }
}
