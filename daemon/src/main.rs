//! Registration desk daemon: loads configuration, opens the audit log and
//! serves the desk over HTTP until SIGINT/SIGTERM.

use anyhow::Context;
use clap::Parser;
use regdesk_desk::{DeskConfig, EventDesk, LogMailer, ShutdownController};
use regdesk_rpc::RpcServer;
use regdesk_types::EventConfig;
use regdesk_utils::{init_logging, LogFormat};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "regdesk-daemon", about = "Event registration desk daemon")]
struct Cli {
    /// Address to bind the HTTP server to.
    #[arg(long, env = "REGDESK_LISTEN_ADDR")]
    listen_addr: Option<String>,

    /// HTTP port.
    #[arg(long, env = "REGDESK_PORT")]
    port: Option<u16>,

    /// Audit journal path. Without one the audit log is kept in memory.
    #[arg(long, env = "REGDESK_AUDIT_JOURNAL")]
    audit_journal: Option<PathBuf>,

    /// Enable Prometheus metrics endpoint.
    #[arg(long, env = "REGDESK_ENABLE_METRICS")]
    metrics: bool,

    /// Disable permissive CORS.
    #[arg(long, env = "REGDESK_DISABLE_CORS")]
    disable_cors: bool,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "REGDESK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "REGDESK_LOG_FORMAT")]
    log_format: Option<String>,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "REGDESK_CONFIG")]
    config: Option<PathBuf>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the desk.
    Run {
        /// Event configuration (JSON) to open at startup. Repeatable.
        #[arg(long = "event")]
        events: Vec<PathBuf>,
    },
    /// Print the effective configuration as TOML and exit.
    PrintConfig,
}

fn resolve_config(cli: &Cli) -> anyhow::Result<DeskConfig> {
    let base = match &cli.config {
        Some(path) => {
            let path_str = path.to_str().context("config path is not valid UTF-8")?;
            DeskConfig::from_toml_file(path_str)
                .with_context(|| format!("loading config from {}", path.display()))?
        }
        None => DeskConfig::default(),
    };

    Ok(DeskConfig {
        listen_addr: cli.listen_addr.clone().unwrap_or(base.listen_addr),
        port: cli.port.unwrap_or(base.port),
        audit_journal: cli.audit_journal.clone().or(base.audit_journal),
        log_format: cli.log_format.clone().unwrap_or(base.log_format),
        log_level: cli.log_level.clone().unwrap_or(base.log_level),
        enable_metrics: cli.metrics || base.enable_metrics,
        enable_cors: !cli.disable_cors && base.enable_cors,
        ..base
    })
}

fn load_event(path: &Path) -> anyhow::Result<EventConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading event file {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing event file {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    let events = match cli.command {
        Command::PrintConfig => {
            print!("{}", config.to_toml_string()?);
            return Ok(());
        }
        Command::Run { events } => events,
    };

    let format: LogFormat = config.log_format.parse()?;
    init_logging(format, &config.log_level)?;

    tracing::info!(
        "Starting registration desk on {} (metrics: {}, audit: {})",
        config.bind_addr(),
        if config.enable_metrics { "on" } else { "off" },
        config
            .audit_journal
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "memory".into()),
    );

    let desk = Arc::new(EventDesk::from_config(&config, Arc::new(LogMailer))?);
    for path in &events {
        let event = load_event(path)?;
        let summary = desk.open_event(event)?;
        tracing::info!(event = %summary.event_id, capacity = summary.capacity, "event loaded");
    }

    let shutdown = Arc::new(ShutdownController::new());
    let server = RpcServer::new(&config, Arc::clone(&desk));
    let server_shutdown = shutdown.subscribe();
    let server_task = tokio::spawn(async move { server.start(server_shutdown).await });

    let signals = Arc::clone(&shutdown);
    tokio::spawn(async move { signals.trigger_on_os_signal().await });

    server_task.await??;
    tracing::info!("Registration desk exited cleanly");
    Ok(())
}
