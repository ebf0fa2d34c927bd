//! Charm-style wizard for the create command

use crate::bodies::BuiltinRenderer;
use crate::config::{
    Configuration, Database, EmailProvider, Feature, Framework, Frontend, ProjectFile,
};
use crate::emit::{ArchiveSink, FsSink};
use crate::pipeline::{generate, Generation};
use crate::rules::{is_valid_project_name, validate, ViolationCode, Violations};
use crate::runtime::check;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const UPGRADE_COMMAND: &str = "cargo install stackforge-cli --force";

const DEFAULT_NAME: &str = "my-api";

/// CLI arguments for the create command
#[derive(Debug, Clone, Default)]
pub struct CreateArgs {
    pub name: Option<String>,
    pub framework: Option<Framework>,
    pub database: Option<Database>,
    pub features: Option<Vec<Feature>>,
    pub email_provider: Option<EmailProvider>,
    pub frontend: Option<Frontend>,

    /// Project file to start from; flags override its values
    pub config_file: Option<PathBuf>,

    /// Parent directory of the project (defaults to the current directory)
    pub directory: Option<PathBuf>,

    /// Write a zip archive here instead of a directory
    pub archive: Option<PathBuf>,

    /// Print the files that would be generated without writing anything
    pub dry_run: bool,

    /// Accept defaults for everything not given (non-interactive mode)
    pub yes: bool,
}

/// Fields the wizard still has to ask about
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Pending {
    name: bool,
    framework: bool,
    database: bool,
    features: bool,
    email_provider: bool,
    frontend: bool,
}

impl Pending {
    /// Everything not already settled by the project file or flags
    fn initial(config: &Configuration, args: &CreateArgs, from_file: bool) -> Self {
        Self {
            name: config.project_name.is_empty(),
            framework: config.framework.is_none(),
            database: config.database.is_none(),
            features: !from_file && args.features.is_none(),
            email_provider: !from_file && args.email_provider.is_none(),
            frontend: !from_file && args.frontend.is_none(),
        }
    }

    /// Fields to ask again so the user can fix `violations`
    fn from_violations(violations: &Violations) -> Self {
        let mut pending = Self::default();
        for violation in violations.iter() {
            match violation.code {
                ViolationCode::InvalidProjectName => pending.name = true,
                ViolationCode::MissingFramework => pending.framework = true,
                ViolationCode::MissingDatabase => pending.database = true,
                ViolationCode::FeatureRequiresAuth => pending.features = true,
                ViolationCode::FeatureRequiresEmailProvider => {
                    pending.features = true;
                    pending.email_provider = true;
                }
                ViolationCode::IncompatibleDatabase => {
                    pending.framework = true;
                    pending.database = true;
                }
            }
        }
        pending
    }
}

/// Overlay explicit flags on a configuration
fn apply_flags(config: &mut Configuration, args: &CreateArgs) {
    if let Some(name) = &args.name {
        config.project_name = name.clone();
    }
    if let Some(framework) = args.framework {
        config.framework = Some(framework);
    }
    if let Some(database) = args.database {
        config.database = Some(database);
    }
    if let Some(features) = &args.features {
        config.features = features.iter().copied().collect();
    }
    if let Some(provider) = args.email_provider {
        config.email_provider = provider;
    }
    if let Some(frontend) = args.frontend {
        config.frontend = frontend;
    }
}

/// Defaults used for unanswered fields in `--yes` mode
fn apply_defaults(config: &mut Configuration, pending: Pending) {
    if pending.name && config.project_name.is_empty() {
        config.project_name = DEFAULT_NAME.to_string();
    }
    if pending.framework && config.framework.is_none() {
        config.framework = Some(Framework::Express);
    }
    if pending.database && config.database.is_none() {
        config.database = Some(Database::Sqlite);
    }
}

/// Run the create command with interactive prompts
pub async fn run(args: CreateArgs, cli_version: &str) -> Result<()> {
    cliclack::intro("stackforge")?;

    // Step 1: Start from the project file, if any
    let mut config = match &args.config_file {
        Some(path) => load_project_file(path, cli_version).await?,
        None => Configuration::default(),
    };
    let from_file = args.config_file.is_some();
    apply_flags(&mut config, &args);

    // Step 2: Ask for everything still open until the configuration is valid
    let mut pending = Pending::initial(&config, &args, from_file);
    loop {
        if args.yes {
            apply_defaults(&mut config, pending);
        } else {
            prompt(&mut config, pending)?;
        }

        match validate(&config) {
            Ok(valid) => {
                for warning in valid.warnings() {
                    cliclack::log::warning(warning.to_string())?;
                }
                break;
            }
            Err(violations) => {
                for violation in violations.iter() {
                    cliclack::log::error(violation.to_string())?;
                }
                if args.yes {
                    anyhow::bail!(
                        "Invalid configuration ({} violation(s)); fix the flags or project file",
                        violations.len()
                    );
                }
                pending = Pending::from_violations(&violations);
            }
        }
    }

    // Step 3: Build the tree in memory
    let generation = generate(&config, &BuiltinRenderer)?;
    cliclack::log::success(format!(
        "{} files planned ({} bytes)",
        generation.tree.len(),
        generation.tree.total_bytes()
    ))?;

    if args.dry_run {
        let listing = generation.tree.paths().collect::<Vec<_>>().join("\n");
        cliclack::note("Dry run", listing)?;
        cliclack::outro("Nothing was written.")?;
        return Ok(());
    }

    // Step 4: Emit
    let project_dir = match &args.archive {
        Some(path) => {
            write_archive(&generation, path).await?;
            None
        }
        None => {
            let parent = select_parent(&args)?;
            Some(write_directory(&generation, &parent).await?)
        }
    };

    // Step 5: Check runtimes (advisory)
    check_runtimes(&generation)?;

    // Step 6: Show next steps
    match project_dir {
        Some(dir) => print_next_steps(&generation, &dir)?,
        None => cliclack::outro("Archive ready. Unzip it and follow the README.")?,
    }

    Ok(())
}

async fn load_project_file(path: &Path, cli_version: &str) -> Result<Configuration> {
    let file = ProjectFile::load(path).await?;
    cliclack::log::info(format!("Using project file {}", path.display()))?;

    if let Some(warning) = file.version_warning(cli_version, UPGRADE_COMMAND) {
        cliclack::log::warning(format!(
            "Version warning: {}",
            warning.lines().next().unwrap_or(&warning)
        ))?;
    }
    Ok(file.config)
}

fn prompt(config: &mut Configuration, pending: Pending) -> Result<()> {
    if pending.name {
        let initial = if config.project_name.is_empty() {
            DEFAULT_NAME.to_string()
        } else {
            config.project_name.clone()
        };
        config.project_name = cliclack::input("Project name")
            .placeholder(DEFAULT_NAME)
            .default_input(&initial)
            .validate(|input: &String| {
                if is_valid_project_name(input) {
                    Ok(())
                } else {
                    Err("Start with a letter; use letters, digits, '-' or '_'")
                }
            })
            .interact()?;
    }

    if pending.framework {
        let mut select = cliclack::select("Framework")
            .initial_value(config.framework.unwrap_or(Framework::Express));
        for framework in Framework::ALL {
            let hint = if framework.is_experimental() {
                "experimental"
            } else {
                ""
            };
            select = select.item(framework, framework.display_name(), hint);
        }
        config.framework = Some(select.interact()?);
    }

    if pending.database {
        let mut select = cliclack::select("Database")
            .initial_value(config.database.unwrap_or(Database::Postgres));
        for database in Database::ALL {
            select = select.item(database, database.display_name(), database.family().id());
        }
        config.database = Some(select.interact()?);
    }

    if pending.features {
        let mut multi = cliclack::multiselect("Features")
            .initial_values(config.features.iter().copied().collect())
            .required(false);
        for feature in Feature::ALL {
            let hint = if feature.requires_auth() {
                "needs auth and an email provider"
            } else {
                ""
            };
            multi = multi.item(feature, feature.display_name(), hint);
        }
        let selected: Vec<Feature> = multi.interact()?;
        config.features = selected.into_iter().collect();
    }

    let needs_email = config.features.iter().any(Feature::requires_email);
    if pending.email_provider && needs_email {
        let mut select = cliclack::select("Email provider").initial_value(
            match config.email_provider {
                EmailProvider::None => EmailProvider::Resend,
                provider => provider,
            },
        );
        for provider in EmailProvider::ALL {
            select = select.item(provider, provider.display_name(), "");
        }
        config.email_provider = select.interact()?;
    }

    if pending.frontend {
        let mut select = cliclack::select("Client").initial_value(config.frontend);
        for frontend in Frontend::ALL {
            select = select.item(frontend, frontend.display_name(), "");
        }
        config.frontend = select.interact()?;
    }

    Ok(())
}

fn select_parent(args: &CreateArgs) -> Result<PathBuf> {
    let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let path = match &args.directory {
        Some(dir) if dir.is_absolute() => dir.clone(),
        Some(dir) => current_dir.join(dir),
        None => current_dir,
    };

    if !path.is_dir() {
        anyhow::bail!("Parent directory does not exist: {}", path.display());
    }
    Ok(path)
}

async fn write_directory(generation: &Generation, parent: &Path) -> Result<PathBuf> {
    let spinner = cliclack::spinner();
    spinner.start("Creating project...");

    let mut sink = match FsSink::create(parent, generation.config.project_name()).await {
        Ok(sink) => sink,
        Err(e) => {
            spinner.stop("Cannot create project directory");
            return Err(e.into());
        }
    };

    match generation.emit(&mut sink).await {
        Ok(report) => {
            spinner.stop(format!(
                "Created {} files in {}",
                report.written,
                sink.root().display()
            ));
            Ok(sink.root().to_path_buf())
        }
        Err(e) => {
            spinner.stop("Project creation stopped");
            cliclack::log::error(format!(
                "{} file(s) were written to {} before the failure and were left in place",
                e.written,
                sink.root().display()
            ))?;
            Err(e.into())
        }
    }
}

async fn write_archive(generation: &Generation, path: &Path) -> Result<()> {
    let spinner = cliclack::spinner();
    spinner.start("Packaging project...");

    let mut sink = ArchiveSink::new(generation.config.project_name());
    let report = generation.emit(&mut sink).await?;
    let bytes = sink.finish()?;
    tokio::fs::write(path, &bytes)
        .await
        .with_context(|| format!("Failed to write archive {}", path.display()))?;

    spinner.stop(format!(
        "Packaged {} files into {} ({} bytes)",
        report.written,
        path.display(),
        bytes.len()
    ));
    Ok(())
}

fn check_runtimes(generation: &Generation) -> Result<()> {
    let spinner = cliclack::spinner();
    spinner.start("Checking runtimes...");

    let runtimes = check::check_runtimes(&generation.config);
    let summary: Vec<String> = runtimes.iter().map(|r| r.to_string()).collect();
    if runtimes.iter().all(|r| r.available) {
        spinner.stop(format!("Detected runtimes: {}", summary.join(", ")));
    } else {
        spinner.stop("Some runtimes are missing");
        for runtime in runtimes.iter().filter(|r| !r.available) {
            cliclack::log::warning(runtime.to_string())?;
        }
    }
    Ok(())
}

fn print_next_steps(generation: &Generation, project_dir: &Path) -> Result<()> {
    let steps = generation.next_steps(project_dir);

    println!();
    println!("  Next steps");
    println!();

    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, step);
    }

    cliclack::outro("Happy building!")?;

    Ok(())
}
