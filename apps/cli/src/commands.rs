//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use foldertoc_shared::{
    AggregateConfig, AppConfig, RegenerateReport, init_config, load_config, load_config_from,
};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// foldertoc: keep a README's folder index in sync with the folders on disk.
#[derive(Parser)]
#[command(
    name = "foldertoc",
    version,
    about = "Regenerate a README's table of contents from its top-level folders.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Project root to scan (defaults to the current directory).
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// README to rewrite (defaults to <root>/README.md).
    #[arg(long, global = true)]
    pub readme: Option<PathBuf>,

    /// Config file (defaults to <root>/foldertoc.toml, then ~/.foldertoc/foldertoc.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Command to run; regenerates the README when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Regenerate the README in place.
    Run {
        /// Remove entries for folders that no longer exist.
        #[arg(long)]
        prune: bool,

        /// Print the run report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Fail if the README is out of date. Never writes.
    Check {
        /// Treat entries for missing folders as stale.
        #[arg(long)]
        prune: bool,

        /// Print the check report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a default foldertoc.toml into the project root.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so `--json`
/// output on stdout stays machine-readable.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "foldertoc=info",
        1 => "foldertoc=debug",
        _ => "foldertoc=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Paths and settings resolved from flags + config file.
struct Resolved {
    root: PathBuf,
    readme: PathBuf,
    app: AppConfig,
}

impl Resolved {
    fn from_cli(cli: &Cli) -> Result<Self> {
        let root = match &cli.root {
            Some(p) => p.clone(),
            None => std::env::current_dir()
                .map_err(|e| eyre!("cannot determine working directory: {e}"))?,
        };
        if !root.is_dir() {
            return Err(eyre!("project root '{}' is not a directory", root.display()));
        }

        let app = match &cli.config {
            Some(path) => load_config_from(path)?,
            None => load_config(&root)?,
        };

        let readme = cli
            .readme
            .clone()
            .unwrap_or_else(|| root.join(&app.readme.file_name));

        Ok(Self { root, readme, app })
    }

    fn aggregate_config(&self, prune: bool) -> AggregateConfig {
        let mut config = AggregateConfig::from(&self.app);
        config.prune |= prune;
        config
    }
}

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let resolved = Resolved::from_cli(&cli)?;

    match cli.command {
        None => cmd_run(&resolved, false, false),
        Some(Command::Run { prune, json }) => cmd_run(&resolved, prune, json),
        Some(Command::Check { prune, json }) => cmd_check(&resolved, prune, json),
        Some(Command::Config { action }) => match action {
            ConfigAction::Init => cmd_config_init(&resolved.root),
            ConfigAction::Show => cmd_config_show(&resolved.app),
        },
    }
}

fn cmd_run(resolved: &Resolved, prune: bool, json: bool) -> Result<()> {
    let config = resolved.aggregate_config(prune);
    info!(
        root = %resolved.root.display(),
        readme = %resolved.readme.display(),
        "regenerating README"
    );

    let report = foldertoc_core::regenerate(&resolved.root, &resolved.readme, &config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn cmd_check(resolved: &Resolved, prune: bool, json: bool) -> Result<()> {
    let config = resolved.aggregate_config(prune);
    let report = foldertoc_core::check(&resolved.root, &resolved.readme, &config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if report.changed {
        return Err(eyre!(
            "{} is out of date; run `foldertoc` to regenerate it",
            report.readme_path.display()
        ));
    }

    if !json {
        println!("{} is up to date", report.readme_path.display());
    }
    Ok(())
}

fn print_summary(report: &RegenerateReport) {
    if !report.written {
        println!("{} is up to date", report.readme_path.display());
        return;
    }

    println!();
    println!("  README updated: {}", report.readme_path.display());
    println!("  Links added:        {}", list_or_dash(&report.links_added));
    println!("  Sections added:     {}", list_or_dash(&report.sections_added));
    println!("  Sections refreshed: {}", list_or_dash(&report.sections_refreshed));
    if !report.pruned.is_empty() {
        println!("  Pruned:             {}", report.pruned.join(", "));
    }
    if report.unrecognized_lines > 0 {
        println!("  Dropped lines:      {}", report.unrecognized_lines);
    }
    println!();
}

fn list_or_dash(names: &[String]) -> String {
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(", ")
    }
}

fn cmd_config_init(root: &Path) -> Result<()> {
    let path = init_config(root)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}
