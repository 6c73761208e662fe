use anyhow::{Context, Result};
use chrono::Local;
use clap::{ArgAction, Parser, Subcommand};
use fragments::{CollectOptions, CollectReport, FragmentsConfig, GitOps};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fragments")]
#[command(version, about = "changelog fragment manager", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// path to the repository (defaults to current directory)
    #[arg(short = 'C', long, default_value = ".", global = true)]
    path: PathBuf,

    /// output format (json or human)
    #[arg(short, long, default_value = "human", global = true)]
    format: OutputFormat,

    /// log more details, repeat for even more
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Json,
    Human,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" => Ok(OutputFormat::Human),
            _ => Err(format!(
                "invalid output format: {}, use 'json' or 'human'",
                s
            )),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// create a new changelog entry
    Create {
        /// 'git add' the created file
        #[arg(long, overrides_with = "no_add")]
        add: bool,

        /// don't 'git add' the created file
        #[arg(long, overrides_with = "add")]
        no_add: bool,

        /// open the created file in your text editor
        #[arg(long, overrides_with = "no_edit")]
        edit: bool,

        /// don't open the created file in your text editor
        #[arg(long, overrides_with = "edit")]
        no_edit: bool,
    },

    /// collect entries into the changelog
    Collect {
        /// text holding the version being released (defaults to the configured version)
        #[arg(long = "release", value_name = "VERSION")]
        release: Option<String>,

        /// don't delete the collected entry files
        #[arg(long)]
        keep: bool,

        /// 'git add' the changelog and the removed entries
        #[arg(long, overrides_with = "no_add")]
        add: bool,

        /// don't touch the git index
        #[arg(long, overrides_with = "add")]
        no_add: bool,

        /// open the changelog in your text editor
        #[arg(long, overrides_with = "no_edit")]
        edit: bool,

        /// don't open the changelog in your text editor
        #[arg(long, overrides_with = "edit")]
        no_edit: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let root = GitOps::detect_repository_root(&cli.path).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "not in a git repository, using path as root");
        cli.path.clone()
    });
    let config = FragmentsConfig::load_or_default(&root).context("failed to load configuration")?;

    match cli.command {
        Commands::Create {
            add,
            no_add,
            edit,
            no_edit,
        } => {
            let add = resolve_flag(&root, add, no_add, "fragments.create.add");
            let edit = resolve_flag(&root, edit, no_edit, "fragments.create.edit");
            handle_create(&root, &config, &cli.format, add, edit)?;
        }
        Commands::Collect {
            release,
            keep,
            add,
            no_add,
            edit,
            no_edit,
        } => {
            let add = resolve_flag(&root, add, no_add, "fragments.collect.add");
            let edit = resolve_flag(&root, edit, no_edit, "fragments.collect.edit");
            let options = CollectOptions {
                version: release,
                keep,
                date: None,
            };
            handle_collect(&root, &config, &cli.format, &options, add, edit)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// explicit flags win, otherwise ask git config
fn resolve_flag(root: &Path, yes: bool, no: bool, key: &str) -> bool {
    if yes {
        return true;
    }
    if no {
        return false;
    }
    GitOps::config_bool(root, key).unwrap_or_else(|e| {
        tracing::debug!(key, error = %e, "could not read git config");
        false
    })
}

fn handle_create(
    root: &Path,
    config: &FragmentsConfig,
    format: &OutputFormat,
    add: bool,
    edit: bool,
) -> Result<()> {
    let nick = GitOps::user_nick(root);
    let branch = GitOps::current_branch_name(root).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "no branch name available");
        None
    });

    let path = fragments::create_entry(
        config,
        root,
        &nick,
        branch.as_deref(),
        Local::now().naive_local(),
    )
    .context("failed to create entry")?;

    if edit {
        GitOps::edit(root, &path).context("failed to edit entry")?;
    }
    if add {
        GitOps::add(root, [&path]).context("failed to stage entry")?;
    }

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "path": path,
                "added": add,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Human => {
            println!("Created {}", path.display());
        }
    }

    Ok(())
}

fn handle_collect(
    root: &Path,
    config: &FragmentsConfig,
    format: &OutputFormat,
    options: &CollectOptions,
    add: bool,
    edit: bool,
) -> Result<()> {
    let report = fragments::collect_entries(config, root, options)
        .context("failed to collect entries")?;

    if edit {
        GitOps::edit(root, &report.output_file).context("failed to edit changelog")?;
    }
    if add {
        GitOps::add(root, [&report.output_file]).context("failed to stage changelog")?;
        if report.removed {
            GitOps::stage_removal(root, &report.fragments)
                .context("failed to stage removed entries")?;
        }
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Human => print_collect_report(&report),
    }

    Ok(())
}

fn print_collect_report(report: &CollectReport) {
    println!(
        "Collected {} entries into {} under '{}'",
        report.fragments.len(),
        report.output_file.display(),
        report.title
    );
    if report.prerelease {
        println!("  (pre-release)");
    }
    if report.removed {
        for path in &report.fragments {
            println!("  removed {}", path.display());
        }
    }
}
