//! usagegate - Client-side usage metering and tiered feature gating

mod cli;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use usagegate_core::{
    ActionKind, BackendKind, Dimension, Environment, GateConfig, QuotaService, Remaining, Tier,
};

#[derive(Parser)]
#[command(
    name = "usagegate",
    version,
    about = "Client-side usage metering and tiered feature gating",
    long_about = "Tracks daily usage counters and answers allow/deny questions against\n\
                  the active subscription tier.\n\
                  \n\
                  Examples:\n\
                    usagegate check pdf_export       # Exit 0 if allowed, 1 if denied\n\
                    usagegate record pdfDownloads    # Count one PDF export\n\
                    usagegate record uploads -n 3    # Count three uploads\n\
                    usagegate report                 # Per-action quota table\n\
                    usagegate tier pro               # Switch to the Pro tier\n\
                  \n\
                  Environment Variables:\n\
                    USAGEGATE_CONFIG                 # Config file path\n\
                    USAGEGATE_DATA_DIR               # Override data directory\n\
                    USAGEGATE_ENVIRONMENT            # production | trusted-development\n\
                    USAGEGATE_NO_COLOR               # Disable ANSI colors\n\
                    RUST_LOG                         # Log filter (default: warn)"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file (default: <config dir>/usagegate/config.toml)
    #[arg(long, env = "USAGEGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding persisted quota state
    #[arg(long, env = "USAGEGATE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Deployment environment (production | trusted-development)
    #[arg(long, env = "USAGEGATE_ENVIRONMENT")]
    environment: Option<Environment>,

    /// Storage backend (json | sqlite | memory)
    #[arg(long, env = "USAGEGATE_BACKEND")]
    backend: Option<BackendKind>,

    /// Disable ANSI colors (log-friendly)
    #[arg(long, env = "USAGEGATE_NO_COLOR")]
    no_color: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Check whether an action is allowed (exit code 1 when denied)
    Check {
        /// upload | pdf_export | data_export | comparison | batch_processing
        action: String,
    },
    /// Record completed usage on a dimension
    Record {
        /// Counter name, e.g. uploads, pdfDownloads, imagesProcessed
        dimension: String,

        /// Amount to add
        #[arg(short = 'n', long, default_value_t = 1)]
        count: u64,
    },
    /// Print today's usage counters
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Print the active tier limits
    Limits {
        #[arg(long)]
        json: bool,
    },
    /// Switch the subscription tier (free | pro | teams | enterprise)
    Tier { tier: Tier },
    /// Per-action quota report with alert levels
    Report {
        #[arg(long)]
        json: bool,
    },
    /// Clear today's usage counters
    Reset,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .init();

    let config = load_config(&cli)?;
    let service = QuotaService::from_config(&config).context("Failed to open quota state")?;

    match cli.command {
        Command::Check { action } => run_check(&service, &action),
        Command::Record { dimension, count } => {
            run_record(&service, &dimension, count)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Stats { json } => {
            println!("{}", cli::format_stats(&service.current_stats(), json));
            Ok(ExitCode::SUCCESS)
        }
        Command::Limits { json } => {
            println!("{}", cli::format_limits(&service.current_limits(), json));
            Ok(ExitCode::SUCCESS)
        }
        Command::Tier { tier } => {
            let limits = service
                .set_tier(tier)
                .with_context(|| format!("Failed to switch to {} tier", tier))?;
            println!("{}", cli::format_limits(&limits, false));
            Ok(ExitCode::SUCCESS)
        }
        Command::Report { json } => {
            println!(
                "{}",
                cli::format_report(&service.quota_report(), json, cli.no_color)
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::Reset => {
            service.reset().context("Failed to reset usage")?;
            println!("Usage counters cleared");
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Config file, then command-line and environment overrides
fn load_config(cli: &Cli) -> Result<GateConfig> {
    let mut config = match cli.config.clone().or_else(GateConfig::default_path) {
        Some(path) => GateConfig::load(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => GateConfig::default(),
    };

    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.clone());
    }
    if let Some(environment) = cli.environment {
        config.environment = environment;
    }
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }

    Ok(config)
}

fn run_check(service: &QuotaService, action: &str) -> Result<ExitCode> {
    let Some(kind) = ActionKind::parse(action) else {
        eprintln!("Unknown action '{}': denied", action);
        return Ok(ExitCode::FAILURE);
    };

    let allowed = service.can_perform_action(kind);
    println!("{}", check_message(service, kind, allowed));
    Ok(if allowed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn check_message(service: &QuotaService, kind: ActionKind, allowed: bool) -> String {
    if !allowed {
        return format!("{}: limit reached", kind.as_str());
    }
    if service.environment().is_trusted() {
        return format!("{}: allowed (trusted environment)", kind.as_str());
    }
    match service.remaining(kind) {
        Remaining::Unlimited => format!("{}: allowed (unlimited)", kind.as_str()),
        Remaining::Limited(left) => format!("{}: allowed ({} left today)", kind.as_str(), left),
    }
}

fn run_record(service: &QuotaService, dimension: &str, count: u64) -> Result<()> {
    let Some(dimension) = Dimension::parse(dimension) else {
        bail!(
            "Unknown dimension '{}' (expected one of: {})",
            dimension,
            Dimension::ALL
                .iter()
                .map(|d| d.field_name())
                .collect::<Vec<_>>()
                .join(", ")
        );
    };

    let stats = service
        .track_many(dimension, count)
        .with_context(|| format!("Failed to record {}", dimension))?;
    println!("{}: {}", dimension.field_name(), stats.get(dimension));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_record_with_count() {
        let cli = Cli::try_parse_from(["usagegate", "record", "uploads", "-n", "3"]).unwrap();
        match cli.command {
            Command::Record { dimension, count } => {
                assert_eq!(dimension, "uploads");
                assert_eq!(count, 3);
            }
            _ => panic!("expected record"),
        }
    }

    #[test]
    fn test_parse_tier_and_environment() {
        let cli = Cli::try_parse_from([
            "usagegate",
            "--environment",
            "trusted-development",
            "tier",
            "Teams",
        ])
        .unwrap();
        assert_eq!(cli.environment, Some(Environment::TrustedDevelopment));
        assert!(matches!(cli.command, Command::Tier { tier: Tier::Teams }));
    }

    #[test]
    fn test_parse_rejects_unknown_tier() {
        assert!(Cli::try_parse_from(["usagegate", "tier", "platinum"]).is_err());
    }

    fn memory_service(environment: Environment) -> QuotaService {
        QuotaService::from_config(&GateConfig {
            backend: BackendKind::Memory,
            environment,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_check_message_in_trusted_environment() {
        let service = memory_service(Environment::TrustedDevelopment);
        let kind = ActionKind::BatchProcessing;
        assert!(service.can_perform_action(kind));
        assert_eq!(
            check_message(&service, kind, true),
            "batch_processing: allowed (trusted environment)"
        );
    }

    #[test]
    fn test_check_message_in_production() {
        let service = memory_service(Environment::Production);
        assert_eq!(
            check_message(&service, ActionKind::PdfExport, true),
            "pdf_export: allowed (2 left today)"
        );
        assert!(!service.can_perform_action(ActionKind::BatchProcessing));
        assert_eq!(
            check_message(&service, ActionKind::BatchProcessing, false),
            "batch_processing: limit reached"
        );
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = std::env::temp_dir().join("usagegate-cli-test-absent");
        let cli = Cli::try_parse_from([
            "usagegate",
            "--config",
            dir.join("missing.toml").to_str().unwrap(),
            "--data-dir",
            dir.to_str().unwrap(),
            "--backend",
            "memory",
            "stats",
        ])
        .unwrap();

        let config = load_config(&cli).unwrap();
        assert_eq!(config.backend, BackendKind::Memory);
        assert_eq!(config.data_dir, Some(dir));
        assert_eq!(config.environment, Environment::Production);
    }
}
