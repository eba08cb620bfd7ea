//! # Bundlr Configuration Validator
//!
//! Command-line tool for validating Bundlr configuration files across
//! environments. Catches bad values and broken pipeline templates before a
//! service starts.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use bundlr_core::config::{BundlrConfig, ConfigManager};

const KNOWN_ENVIRONMENTS: [&str; 3] = ["development", "test", "production"];

#[derive(Parser)]
#[command(name = "config-validator")]
#[command(about = "Validate Bundlr configuration files")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Environment to validate (development, test, production)
    #[arg(short, long, default_value = "development")]
    environment: String,

    /// Configuration directory path (default: ./config or BUNDLR_CONFIG_DIR)
    #[arg(short, long)]
    config_dir: Option<PathBuf>,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate the configuration for one environment
    Validate,

    /// Validate every known environment
    All,

    /// List known environments
    Environments,

    /// Show the configured pipeline templates
    Templates,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let _subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .try_init();

    let result = match &cli.command {
        Some(Commands::Validate) | None => validate_environment(&cli, &cli.environment).map(|_| ()),
        Some(Commands::All) => validate_all(&cli),
        Some(Commands::Environments) => {
            list_environments();
            Ok(())
        }
        Some(Commands::Templates) => show_templates(&cli),
    };

    match result {
        Ok(()) => {
            info!("Configuration validation completed successfully");
        }
        Err(e) => {
            error!("Configuration validation failed: {:#}", e);
            eprintln!("❌ {e:#}");
            process::exit(1);
        }
    }
}

fn load(cli: &Cli, environment: &str) -> anyhow::Result<BundlrConfig> {
    let manager = ConfigManager::load_from_directory_with_env(cli.config_dir.clone(), environment)
        .with_context(|| format!("loading configuration for '{environment}'"))?;
    Ok(manager.config().clone())
}

fn validate_environment(cli: &Cli, environment: &str) -> anyhow::Result<BundlrConfig> {
    println!("🔧 Validating Bundlr Configuration");
    println!("Environment: {environment}");
    if let Some(config_dir) = &cli.config_dir {
        println!("Config Directory: {}", config_dir.display());
    }

    let config = load(cli, environment)?;
    println!("✅ Configuration loaded and validated");
    println!(
        "   database: {}:{} (pool {})",
        config.database.host, config.database.port, config.database.pool
    );
    println!(
        "   pipeline: poll every {}s, monitor {}",
        config.pipeline.blocker_poll_interval_seconds,
        if config.pipeline.monitor_enabled {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!("   events: channel capacity {}", config.events.channel_capacity);
    println!("   templates: {}", config.templates.len());
    println!();
    Ok(config)
}

fn validate_all(cli: &Cli) -> anyhow::Result<()> {
    let mut failures = Vec::new();
    for environment in KNOWN_ENVIRONMENTS {
        if let Err(e) = validate_environment(cli, environment) {
            println!("❌ {environment}: {e:#}");
            failures.push(environment);
        }
    }

    if !failures.is_empty() {
        bail!("invalid configuration for: {}", failures.join(", "));
    }
    Ok(())
}

fn list_environments() {
    println!("📋 Available Environments:");
    for environment in KNOWN_ENVIRONMENTS {
        println!("  • {environment}");
    }
    println!(
        "Current (BUNDLR_ENV / APP_ENV): {}",
        ConfigManager::detect_environment()
    );
}

fn show_templates(cli: &Cli) -> anyhow::Result<()> {
    let config = load(cli, &cli.environment)?;
    let registry = config.template_registry()?;

    println!("📚 Pipeline Templates ({}):", registry.len());
    for id in registry.ids() {
        let Some(template) = registry.get(id) else {
            continue;
        };
        println!("  • {} ({})", template.name, template.id);
        for stage in template.ordered_stages() {
            let required: Vec<&str> = stage
                .required_deliverables
                .iter()
                .map(String::as_str)
                .collect();
            println!(
                "      {}. {} [{}]",
                stage.order,
                stage.name,
                if required.is_empty() {
                    "no requirements".to_string()
                } else {
                    required.join(", ")
                }
            );
        }
    }
    Ok(())
}
