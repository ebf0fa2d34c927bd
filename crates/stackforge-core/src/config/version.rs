//! Version comparison between the CLI and a project file

use semver::Version;

/// Compare the running CLI version against the minimum a project file asks for.
/// Returns a warning message if the CLI is older than the file expects.
pub fn check_compatibility(
    cli_version: &str,
    required_version: &str,
    upgrade_command: &str,
) -> Option<String> {
    let cli_ver = parse_version(cli_version)?;
    // Can't compare, skip warning
    let required_ver = parse_version(required_version)?;

    if cli_ver < required_ver {
        Some(format!(
            "This project file was written for stackforge {} or newer.\n\
             You are running version {}.\n\
             Consider updating: {}",
            required_version, cli_version, upgrade_command
        ))
    } else {
        None
    }
}

/// Parse a version string, tolerating a leading `v`
fn parse_version(version_str: &str) -> Option<Version> {
    let cleaned = version_str.trim();
    let cleaned = cleaned.strip_prefix('v').unwrap_or(cleaned);
    Version::parse(cleaned).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const UPGRADE: &str = "cargo install stackforge-cli --force";

    #[test]
    fn test_cli_older_than_file() {
        let warning = check_compatibility("0.1.0", "0.2.0", UPGRADE);
        assert!(warning.is_some());
        assert!(warning.unwrap().contains("0.2.0"));
    }

    #[test]
    fn test_cli_same_as_file() {
        assert!(check_compatibility("0.3.0", "0.3.0", UPGRADE).is_none());
    }

    #[test]
    fn test_cli_newer_than_file() {
        assert!(check_compatibility("0.3.0", "v0.1.0", UPGRADE).is_none());
    }

    #[test]
    fn test_invalid_versions() {
        assert!(check_compatibility("invalid", "0.1.0", UPGRADE).is_none());
        assert!(check_compatibility("0.1.0", "latest", UPGRADE).is_none());
    }
}
