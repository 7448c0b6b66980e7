mod config;

use clap::{Args, Parser};
use config::{Config, LoggingConfig, MetricsConfig};
use metrics_exporter_statsd::StatsdBuilder;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(version, about = "Redirects template requests to their example projects")]
enum CliCommand {
    /// Run the redirect service
    Run(ConfigArgs),
    /// Load and validate a config file, then exit
    ValidateConfig(ConfigArgs),
}

#[derive(Args)]
struct ConfigArgs {
    #[arg(long)]
    config_file: PathBuf,
}

fn main() {
    let cli = CliCommand::parse();

    match cli {
        CliCommand::Run(args) => {
            let config = load_config(&args.config_file);
            let _sentry = init_logging(config.common.logging.as_ref());
            init_metrics(config.common.metrics.as_ref());

            tracing::info!("Starting redirector");
            if let Err(e) = run_async(config.redirector) {
                tracing::error!(error = %e, "Redirector error");
                process::exit(1);
            }
        }
        CliCommand::ValidateConfig(args) => {
            load_config(&args.config_file);
            println!("{} is valid", args.config_file.display());
        }
    }
}

fn load_config(path: &std::path::Path) -> Config {
    match Config::from_file(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {e}", path.display());
            process::exit(1);
        }
    }
}

fn run_async(config: redirector::config::Config) -> Result<(), redirector::errors::RedirectError> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    rt.block_on(redirector::run(config))
}

/// Installs the tracing subscriber, forwarding events to Sentry when a DSN
/// is configured. The returned guard flushes Sentry on drop.
fn init_logging(config: Option<&LoggingConfig>) -> Option<sentry::ClientInitGuard> {
    let default_level = config
        .and_then(|c| c.level.as_deref())
        .unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let guard = config
        .and_then(|c| c.sentry_dsn.as_deref())
        .map(|dsn| {
            sentry::init((
                dsn,
                sentry::ClientOptions {
                    release: sentry::release_name!(),
                    ..Default::default()
                },
            ))
        });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(guard.as_ref().map(|_| sentry::integrations::tracing::layer()))
        .init();

    guard
}

fn init_metrics(config: Option<&MetricsConfig>) {
    let Some(config) = config else {
        tracing::info!("No metrics backend configured");
        return;
    };

    let recorder = match StatsdBuilder::from(config.statsd_host.clone(), config.statsd_port)
        .build(Some(&config.prefix))
    {
        Ok(recorder) => recorder,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build statsd recorder, metrics are disabled");
            return;
        }
    };

    if let Err(e) = metrics::set_global_recorder(recorder) {
        tracing::error!(error = %e, "Failed to install metrics recorder");
        return;
    }

    shared::metrics_defs::describe_all(redirector::metrics_defs::ALL_METRICS);
    tracing::info!(host = %config.statsd_host, port = config.statsd_port, "Sending metrics to statsd");
}
