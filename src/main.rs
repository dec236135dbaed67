//! jobgate - a bounded-concurrency job execution engine.
//!
//! Usage:
//!   jobgate serve [--config FILE]     Start the engine and HTTP gateway (stops on SIGTERM/SIGINT)
//!   jobgate check-config FILE         Validate a configuration file

use clap::{Parser, Subcommand};
use jobgate::api::{ApiConfig, create_api_state, start_server};
use jobgate::shutdown::install_shutdown_handler;
use jobgate::{Event, EventBus, EventHandler, Scheduler, ServerConfig, YamlLoader};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

/// jobgate - a bounded-concurrency job execution engine
#[derive(Parser)]
#[command(name = "jobgate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the job engine and HTTP gateway
    Serve {
        /// Path to a YAML configuration file
        #[arg(short, long, value_name = "FILE", env = "JOBGATE_CONFIG")]
        config: Option<PathBuf>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Maximum concurrently scheduled jobs (also the worker count)
        #[arg(short = 'j', long)]
        max_concurrency: Option<usize>,

        /// Dispatch queue buffer size
        #[arg(long)]
        queue_capacity: Option<usize>,

        /// Simulated job duration in milliseconds
        #[arg(long)]
        job_duration_ms: Option<u64>,
    },

    /// Validate a configuration file without starting anything
    CheckConfig {
        /// Path to the YAML configuration file
        #[arg(value_name = "FILE")]
        config: PathBuf,
    },
}

/// Command-line values that take precedence over the config file.
struct Overrides {
    host: Option<String>,
    port: Option<u16>,
    max_concurrency: Option<usize>,
    queue_capacity: Option<usize>,
    job_duration_ms: Option<u64>,
}

impl Overrides {
    fn apply(self, config: &mut ServerConfig) {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(max) = self.max_concurrency {
            config.max_concurrency = max;
        }
        if let Some(capacity) = self.queue_capacity {
            config.queue_capacity = capacity;
        }
        if let Some(ms) = self.job_duration_ms {
            config.job_duration_ms = ms;
        }
    }
}

/// Logs every lifecycle event.
struct LoggingHandler;

#[async_trait::async_trait]
impl EventHandler for LoggingHandler {
    async fn handle(&self, event: &Event) {
        match event {
            Event::JobStarted { job_id, worker, .. } => {
                info!("Job '{}' started on worker {}", job_id, worker);
            }
            Event::JobCompleted {
                job_id, duration, ..
            } => {
                info!("Job '{}' completed in {:?}", job_id, duration);
            }
            Event::JobFailed {
                job_id,
                error,
                duration,
                ..
            } => {
                error!("Job '{}' failed after {:?}: {}", job_id, duration, error);
            }
            Event::JobRejected {
                client_id, reason, ..
            } => {
                warn!("Rejected job from client '{}': {}", client_id, reason);
            }
            _ => {}
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            config,
            host,
            port,
            max_concurrency,
            queue_capacity,
            job_duration_ms,
        } => {
            let overrides = Overrides {
                host,
                port,
                max_concurrency,
                queue_capacity,
                job_duration_ms,
            };
            serve(config, overrides).await?;
        }
        Commands::CheckConfig { config } => {
            check_config(config)?;
        }
    }

    Ok(())
}

/// Run the engine and gateway until SIGTERM or Ctrl+C.
async fn serve(
    config_path: Option<PathBuf>,
    overrides: Overrides,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &config_path {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            YamlLoader::load_config(path)?
        }
        None => ServerConfig::default(),
    };
    overrides.apply(&mut config);
    config.validate()?;

    let event_bus = EventBus::new();
    event_bus.register(Arc::new(LoggingHandler)).await;

    let scheduler = Scheduler::from_config(&config).with_event_bus(event_bus);
    info!(
        "Starting {} worker(s), queue capacity {}, job duration {:?}",
        scheduler.max_concurrency(),
        scheduler.queue_capacity(),
        config.job_duration()
    );
    let handle = scheduler.start();

    let api_shutdown = install_shutdown_handler()?;
    let (addr, server_task) = start_server(
        ApiConfig::from(&config),
        create_api_state(handle.clone()),
        api_shutdown.clone(),
    )
    .await?;
    info!("Gateway ready on http://{}", addr);
    info!("Press Ctrl+C to stop");

    // The gateway stops taking requests when the signal arrives; wait for
    // it to finish, then drain the worker pool.
    api_shutdown.cancelled().await;
    info!("Shutting down...");
    if let Err(e) = server_task.await {
        warn!("API server task ended abnormally: {}", e);
    }
    handle.shutdown().await;

    let capacity = handle.capacity()?;
    info!("Goodbye! ({} job(s) left pending)", capacity.current);
    Ok(())
}

/// Validate a configuration file and print the effective values.
fn check_config(path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    match YamlLoader::load_config(&path) {
        Ok(config) => {
            println!("{} is valid:", path.display());
            println!("  host: {}", config.host);
            println!("  port: {}", config.port);
            println!("  max_concurrency: {}", config.max_concurrency);
            println!("  queue_capacity: {}", config.queue_capacity);
            println!("  job_duration_ms: {}", config.job_duration_ms);
            Ok(())
        }
        Err(e) => {
            error!("Validation failed: {}", e);
            Err(e.into())
        }
    }
}
