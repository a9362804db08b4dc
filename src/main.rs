mod cli;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::cli::output::{OutputFormat, OutputOptions};
use planquota::core::config::{AppConfig, ConfigError};

#[derive(Parser)]
#[command(name = "pq", about = "Usage-quota and plan-entitlement accounting", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text|json)
    #[arg(short, long, global = true)]
    format: Option<String>,

    /// Shorthand for --format json
    #[arg(short = 'j', long = "json", global = true)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    /// Verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize usage for an account on a plan
    Summary {
        /// Plan ID from the catalog
        #[arg(short, long)]
        plan: String,

        /// Chat messages sent in the current window
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        chat_used: i64,

        /// Project requests made in the current window
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        projects_used: i64,

        /// Instant the counters were read at (RFC 3339, default: now)
        #[arg(long)]
        at: Option<String>,
    },
    /// Show the current usage window
    Window {
        /// Reference instant (RFC 3339, default: now)
        #[arg(long)]
        at: Option<String>,
    },
    /// List plans or show a plan's entitlements
    Plans {
        #[command(subcommand)]
        action: Option<PlansAction>,

        /// Include retired plans
        #[arg(short, long)]
        all: bool,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum PlansAction {
    /// Show resolved limits and features for a plan
    Show {
        /// Plan ID
        plan: String,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Generate default config file
    Init,
    /// Validate config file
    Check,
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Query commands refuse to run on a config that failed to parse.
fn require_config(loaded: Result<AppConfig, ConfigError>) -> anyhow::Result<AppConfig> {
    loaded.with_context(|| {
        format!(
            "Failed to load config from {}",
            AppConfig::config_path().display()
        )
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let loaded = AppConfig::load();
    let settings = match &loaded {
        Ok(config) => config.settings.clone(),
        Err(e) => {
            log::warn!("using default output settings: {}", e);
            Default::default()
        }
    };

    let format = if cli.json {
        OutputFormat::Json
    } else {
        let name = cli.format.as_deref().unwrap_or(&settings.default_format);
        OutputFormat::from_name(name)
            .with_context(|| format!("Unknown output format '{}' (must be text or json)", name))?
    };

    let output_opts = OutputOptions {
        format,
        pretty: cli.pretty,
        use_color: cli::output::detect_color(!cli.no_color, &settings.color),
    };

    match cli.command {
        Commands::Config { action } => match action {
            ConfigAction::Init => cli::config_cmd::init()?,
            ConfigAction::Check => cli::config_cmd::check()?,
        },
        Commands::Summary {
            plan,
            chat_used,
            projects_used,
            at,
        } => cli::summary_cmd::run(
            &require_config(loaded)?,
            &plan,
            chat_used,
            projects_used,
            at.as_deref(),
            &output_opts,
        )?,
        Commands::Window { at } => {
            cli::summary_cmd::window(&require_config(loaded)?, at.as_deref(), &output_opts)?
        }
        Commands::Plans { action, all } => {
            let config = require_config(loaded)?;
            match action {
                Some(PlansAction::Show { plan }) => {
                    cli::plans_cmd::show(&config, &plan, &output_opts)?
                }
                None => cli::plans_cmd::list(&config, all, &output_opts)?,
            }
        }
    }

    Ok(())
}
