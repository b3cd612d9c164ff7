use anyhow::{Context, Result};
use clap::Parser;
use std::{fmt::Debug, path::PathBuf};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hr_directory_server::config::{self, SearchEngine};
use hr_directory_server::repository::open_primary_db;
use hr_directory_server::search::create_search_indexes;
use hr_directory_server::server::{metrics, run_server, RequestsLoggingLevel, ServerState};

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path {}: {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| e.to_string())?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory holding primary.db and search.db.
    /// Can also be specified in config file.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 8080)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Application name used in the X-{app}-alert headers.
    #[clap(long)]
    pub app_name: Option<String>,

    /// Search engine mirroring the entities.
    #[clap(long, value_enum, default_value_t = SearchEngine::Fts5)]
    pub search_engine: SearchEngine,

    /// Rebuild every search index from the primary store before serving.
    #[clap(long)]
    pub reindex: bool,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,
}

impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            db_dir: args.db_dir.clone(),
            port: args.port,
            metrics_port: args.metrics_port,
            logging_level: args.logging_level.clone(),
            app_name: args.app_name.clone(),
            search_engine: args.search_engine,
            reindex: args.reindex,
            frontend_dir_path: args.frontend_dir_path.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  db_dir: {:?}", app_config.db_dir);
    info!("  port: {}", app_config.port);
    info!("  metrics_port: {}", app_config.metrics_port);
    info!("  app_name: {}", app_config.app_name);
    info!("  search_engine: {:?}", app_config.search_engine);
    info!("  logging_level: {}", app_config.logging_level);

    info!("Initializing metrics...");
    metrics::init_metrics();

    info!(
        "Opening SQLite primary database at {:?}...",
        app_config.primary_db_path()
    );
    let primary_db = open_primary_db(app_config.primary_db_path())?;
    let search_indexes =
        create_search_indexes(&app_config.search_engine, &app_config.search_db_dir())?;

    let state = ServerState::new(app_config.server_config(), primary_db, search_indexes);

    if app_config.reindex {
        info!("Reindexing search indexes from the primary store...");
        let employees = state.employees.reindex()?;
        let jobs = state.jobs.reindex()?;
        let job_histories = state.job_histories.reindex()?;
        info!(
            "Reindexed {} employees, {} jobs, {} job histories",
            employees, jobs, job_histories
        );
    }

    run_server(state).await
}
