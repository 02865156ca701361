//! Metadata adapter - main entry point.
//!
//! Subcommands:
//! - `serve`: HTTP API with startup warm-up
//! - `check`: one local discovery pass, printed
//! - `status`: query a running server
//! - `update`: ask a running server to install or upgrade the tool
//! - `fix`: run the metadata fixer on a running server

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use metadata_adapter::api::{ApiServer, StatusClient};
use metadata_adapter::fixer::FixerRequest;
use metadata_adapter::timefmt::format_time_ago;
use metadata_adapter::{AdapterService, Config, ToolStatus};

#[derive(Debug, Parser)]
#[command(name = "metadata-adapter", version, about)]
struct Cli {
    /// JSON config file; flags and environment variables override it.
    #[arg(long, global = true, env = "METADATA_ADAPTER_CONFIG")]
    config: Option<PathBuf>,

    /// Root the bundled tool directory is resolved against.
    #[arg(long, global = true, env = "METADATA_ADAPTER_INSTALL_ROOT")]
    install_root: Option<PathBuf>,

    /// Upper bound for each tool invocation, in milliseconds.
    #[arg(long, global = true, env = "METADATA_ADAPTER_PROBE_TIMEOUT_MS")]
    probe_timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API.
    Serve {
        /// Bind address, e.g. 127.0.0.1:7801.
        #[arg(long, env = "METADATA_ADAPTER_LISTEN")]
        listen: Option<String>,

        /// Skip the startup refresh; the first status request computes it.
        #[arg(long)]
        no_warm_up: bool,
    },
    /// Run discovery once and print the result.
    Check,
    /// Print the status reported by a running server.
    Status {
        #[command(flatten)]
        remote: RemoteArgs,

        /// Ask the server to recompute instead of returning its cache.
        #[arg(long)]
        refresh: bool,
    },
    /// Ask a running server to download or update the tool.
    Update {
        #[command(flatten)]
        remote: RemoteArgs,
    },
    /// Run the metadata fixer on a running server.
    Fix {
        #[command(flatten)]
        remote: RemoteArgs,

        /// Images to fix.
        images: Vec<PathBuf>,
    },
}

#[derive(Debug, Args)]
struct RemoteArgs {
    #[arg(long, env = "METADATA_ADAPTER_URL", default_value = "http://127.0.0.1:7801")]
    url: String,
}

impl RemoteArgs {
    fn client(&self) -> metadata_adapter::Result<StatusClient> {
        StatusClient::new(self.url.clone(), Duration::from_secs(10))
    }
}

fn load_config(cli: &Cli) -> metadata_adapter::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(root) = &cli.install_root {
        config.tool.install_root = Some(root.clone());
    }
    if let Some(ms) = cli.probe_timeout_ms {
        config.tool.probe_timeout = Duration::from_millis(ms);
    }
    if let Command::Serve {
        listen: Some(listen),
        ..
    } = &cli.command
    {
        config.server.listen_addr = listen.clone();
    }
    if let Command::Serve {
        no_warm_up: true, ..
    } = &cli.command
    {
        config.server.warm_up = false;
    }
    config.validate()?;
    Ok(config)
}

fn print_status(status: &ToolStatus) {
    println!("{}", status.summary());
    println!(
        "Checked {}",
        format_time_ago(status.last_checked_utc(), Utc::now())
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = load_config(&cli)?;

    // Initialize observability
    metadata_adapter::observability::init_tracing(&config.observability);

    match cli.command {
        Command::Serve { .. } => {
            let service = Arc::new(AdapterService::from_config(&config.tool));
            if config.server.warm_up {
                // Detached: a slow or hanging tool must not delay startup
                let _ = service.start_warm_up();
            }

            let addr = config.server.listen_addr.parse()?;
            let server = ApiServer::new(service, addr);

            let cancel = server.cancel_token();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("shutdown signal received");
                    cancel.cancel();
                }
            });

            server.serve().await?;
        }
        Command::Check => {
            let service = AdapterService::from_config(&config.tool);
            let status = service.refresh_status().await;
            print_status(&status);
        }
        Command::Status { remote, refresh } => {
            let client = remote.client()?;
            let status = if refresh {
                client.refresh().await?
            } else {
                client.check().await?
            };
            print_status(&status);
        }
        Command::Update { remote } => {
            let report = remote.client()?.download_or_update().await?;
            if report.update.performed {
                println!(
                    "Downloaded/Updated: {} ({})",
                    report.status.version(),
                    report.status.path()
                );
            } else {
                println!("Failed to download/update CLI");
                if let Some(error) = &report.update.error {
                    println!("  {}", error);
                }
            }
            print_status(&report.status);
        }
        Command::Fix { remote, images } => {
            let report = remote.client()?.run_fixer(&FixerRequest { images }).await?;
            println!("Fixed: {}, Errors: {}", report.fixed, report.errors);
        }
    }

    Ok(())
}
