use clap::{Parser, Subcommand};
use maestro_discovery::DiscoveryClient;
use maestro_gateway::GatewayServer;
use maestro_orchestrator::{AgentDispatcher, Orchestrator, ProcessorConfig};
use maestro_queue::InMemoryBroker;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "maestro", about = "Maestro — A2A multi-agent orchestrator")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "maestro.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the orchestrator gateway
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run one discovery pass and print the discovered agents
    Agents,
}

#[derive(Debug, Default, Deserialize)]
struct MaestroConfig {
    #[serde(default)]
    agent_endpoints: Vec<String>,
    #[serde(default)]
    server: ServerConfig,
    #[serde(default)]
    discovery: DiscoveryConfig,
    #[serde(default)]
    dispatch: DispatchConfig,
    #[serde(default)]
    queue: QueueConfig,
}

#[derive(Debug, Deserialize)]
struct ServerConfig {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DiscoveryConfig {
    #[serde(default = "default_discovery_timeout")]
    timeout_secs: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_discovery_timeout(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DispatchConfig {
    #[serde(default = "default_dispatch_timeout")]
    timeout_secs: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_dispatch_timeout(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct QueueConfig {
    /// When enabled, an in-process broker backs the async task path.
    #[serde(default = "default_true")]
    enabled: bool,
    #[serde(default = "default_batch_size")]
    batch_size: usize,
    #[serde(default = "default_max_wait")]
    max_wait_secs: u64,
    #[serde(default = "default_batch_pause")]
    batch_pause_secs: u64,
    #[serde(default = "default_error_backoff")]
    error_backoff_secs: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            batch_size: default_batch_size(),
            max_wait_secs: default_max_wait(),
            batch_pause_secs: default_batch_pause(),
            error_backoff_secs: default_error_backoff(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_discovery_timeout() -> u64 {
    10
}
fn default_dispatch_timeout() -> u64 {
    120
}
fn default_true() -> bool {
    true
}
fn default_batch_size() -> usize {
    10
}
fn default_max_wait() -> u64 {
    5
}
fn default_batch_pause() -> u64 {
    1
}
fn default_error_backoff() -> u64 {
    5
}

async fn load_config(path: &Path) -> anyhow::Result<MaestroConfig> {
    match tokio::fs::read_to_string(path).await {
        Ok(config_str) => Ok(toml::from_str(&config_str)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(config = %path.display(), "Config file not found, using defaults");
            Ok(MaestroConfig::default())
        }
        Err(e) => Err(anyhow::anyhow!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        )),
    }
}

fn build_orchestrator(config: &MaestroConfig) -> Orchestrator {
    let mut orchestrator = Orchestrator::new(config.agent_endpoints.clone())
        .with_discovery(DiscoveryClient::with_timeout(Duration::from_secs(
            config.discovery.timeout_secs,
        )))
        .with_dispatcher(AgentDispatcher::with_timeout(Duration::from_secs(
            config.dispatch.timeout_secs,
        )));

    if config.queue.enabled {
        orchestrator = orchestrator
            .with_transport(Arc::new(InMemoryBroker::new()))
            .with_processor_config(ProcessorConfig {
                batch_size: config.queue.batch_size,
                max_wait: Duration::from_secs(config.queue.max_wait_secs),
                batch_pause: Duration::from_secs(config.queue.batch_pause_secs),
                error_backoff: Duration::from_secs(config.queue.error_backoff_secs),
            });
    }

    orchestrator
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config).await?;

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);

            let orchestrator = Arc::new(build_orchestrator(&config));

            let found = orchestrator.discover().await;
            info!(agents = found, "Initial discovery complete");

            let token = CancellationToken::new();
            let processor = if orchestrator.queue_available() {
                Some(orchestrator.spawn_processor(token.clone())?)
            } else {
                None
            };

            let app = GatewayServer::build(orchestrator);
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            info!("Maestro gateway listening on {addr}");

            let shutdown_token = token.clone();
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = tokio::signal::ctrl_c().await;
                    info!("Shutdown signal received");
                    shutdown_token.cancel();
                })
                .await?;

            // Let the processor drain its in-flight work before exit.
            token.cancel();
            if let Some(handle) = processor {
                handle.await?;
                info!("Queue processor drained");
            }
        }
        Commands::Agents => {
            let orchestrator = build_orchestrator(&config);
            let found = orchestrator.discover().await;
            println!("Discovered {found} agent(s):");
            for agent in orchestrator.list_agents().await {
                println!(
                    "  {} — {} ({} skill(s), {})",
                    agent.name,
                    agent.description,
                    agent.skills.len(),
                    agent.base_url
                );
            }
        }
    }

    Ok(())
}
