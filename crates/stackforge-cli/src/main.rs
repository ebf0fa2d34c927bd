//! Stackforge CLI - backend project generation from a declarative stack description

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use stackforge_core::tui::{CreateArgs, UPGRADE_COMMAND};
use stackforge_core::{
    generate, BuiltinRenderer, Database, EmailProvider, Feature, Framework, Frontend, ProjectFile,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(name = "stackforge")]
#[command(about = "Generate backend projects from a declarative stack description")]
#[command(version)]
pub struct Args {
    /// Log engine decisions to stderr (same as STACKFORGE_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new project
    Create(CliCreateArgs),
    /// Check a project file and report every violated rule
    Validate(ValidateArgs),
}

#[derive(Parser, Debug)]
pub struct CliCreateArgs {
    /// Project name (also the name of the generated directory)
    pub name: Option<String>,

    /// Web framework
    #[arg(short, long, value_enum)]
    pub framework: Option<Framework>,

    /// Database driver
    #[arg(long, value_enum)]
    pub database: Option<Database>,

    /// Features to include (comma-separated, e.g. auth,email-otp,docker)
    #[arg(long, value_enum, value_delimiter = ',')]
    pub features: Option<Vec<Feature>>,

    /// Email provider for OTP and password reset mail
    #[arg(long = "email-provider", value_enum)]
    pub email_provider: Option<EmailProvider>,

    /// Client to generate under client/
    #[arg(long, value_enum)]
    pub frontend: Option<Frontend>,

    /// Project file (YAML) to start from; flags override its values
    #[arg(short, long = "config")]
    pub config: Option<PathBuf>,

    /// Parent directory of the project
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// Write a zip archive to this path instead of a directory
    #[arg(long, conflicts_with = "directory")]
    pub archive: Option<PathBuf>,

    /// List the files that would be generated without writing anything
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Accept defaults for everything not given (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

impl From<CliCreateArgs> for CreateArgs {
    fn from(args: CliCreateArgs) -> Self {
        CreateArgs {
            name: args.name,
            framework: args.framework,
            database: args.database,
            features: args.features,
            email_provider: args.email_provider,
            frontend: args.frontend,
            config_file: args.config,
            directory: args.directory,
            archive: args.archive,
            dry_run: args.dry_run,
            yes: args.yes,
        }
    }
}

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Project file (YAML) to check
    pub file: PathBuf,

    /// Also list the files the configuration would generate
    #[arg(long)]
    pub list: bool,
}

/// Initialize tracing on stderr so prompts and listings keep stdout
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("stackforge_core=debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_env("STACKFORGE_LOG")
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn validate_file(args: ValidateArgs) -> Result<()> {
    let file = ProjectFile::load(&args.file).await?;
    if let Some(warning) = file.version_warning(CLI_VERSION, UPGRADE_COMMAND) {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }

    let generation = match generate(&file.config, &BuiltinRenderer) {
        Ok(generation) => generation,
        Err(err) => {
            if let Some(violations) = err.violations() {
                for violation in violations.iter() {
                    eprintln!(
                        "{} {} {}",
                        "✗".red().bold(),
                        format!("[{}]", violation.code).red(),
                        violation.message
                    );
                }
                anyhow::bail!(
                    "{} is invalid: {} violation(s)",
                    args.file.display(),
                    violations.len()
                );
            }
            return Err(err).context("Generation failed; this is a bug in stackforge");
        }
    };

    for warning in generation.config.warnings() {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }
    println!(
        "{} {} is valid ({} files, {} bytes)",
        "✓".green().bold(),
        generation.config.project_name().bold(),
        generation.tree.len(),
        generation.tree.total_bytes()
    );
    if args.list {
        for path in generation.tree.paths() {
            println!("  {}", path.dimmed());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    init_tracing(args.verbose);

    match args.command {
        Some(Command::Create(create_args)) => {
            let result = stackforge_core::run(create_args.into(), CLI_VERSION).await;

            // Ensure cursor is visible on normal exit
            let _ = console::Term::stderr().show_cursor();

            result
        }
        Some(Command::Validate(validate_args)) => validate_file(validate_args).await,
        None => {
            // No subcommand provided, default to interactive create
            let result = stackforge_core::run(CreateArgs::default(), CLI_VERSION).await;

            // Ensure cursor is visible on normal exit
            let _ = console::Term::stderr().show_cursor();

            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_create_flags_parse_aliases() {
        let args = Args::parse_from([
            "stackforge",
            "create",
            "acme-api",
            "--framework",
            "express",
            "--database",
            "pg",
            "--features",
            "auth,otp,docker",
            "--email-provider",
            "resend",
            "--dry-run",
        ]);
        let Some(Command::Create(create)) = args.command else {
            panic!("expected create");
        };
        let create: CreateArgs = create.into();
        assert_eq!(create.name.as_deref(), Some("acme-api"));
        assert_eq!(create.database, Some(Database::Postgres));
        assert_eq!(
            create.features,
            Some(vec![Feature::Auth, Feature::EmailOtp, Feature::Docker])
        );
        assert!(create.dry_run);
    }

    #[test]
    fn test_archive_conflicts_with_directory() {
        let result = Args::try_parse_from([
            "stackforge",
            "create",
            "--archive",
            "out.zip",
            "--directory",
            "projects",
        ]);
        assert!(result.is_err());
    }
}
