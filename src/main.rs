use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use ossindex_client::cache::{PersistentCache, SqliteStore};
use ossindex_client::config::{self, ClientConfig};
use ossindex_client::registry::ResourceRegistry;
use ossindex_client::resource::RemoteResource;

#[derive(Parser)]
#[command(name = "ossindex-client")]
#[command(version, about = "Identify files that are open source (found in OSS Index)")]
struct Cli {
    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Use the local development server
    #[arg(long)]
    debug_server: bool,

    /// Keep the cache in memory instead of on disk
    #[arg(long)]
    memory_cache: bool,

    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,
}

fn init_logging() -> anyhow::Result<WorkerGuard> {
    let log_path = config::log_path();
    let log_dir = log_path.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;

    let file_name = log_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "ossindex-client.log".to_string());
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(
        log_dir, file_name,
    ));

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}

fn load_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            ClientConfig::from_json(&json)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => ClientConfig::default(),
    };
    if cli.debug_server {
        config.base_url = ClientConfig::debug().base_url;
    }
    Ok(config)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let client_config = load_config(&cli)?;

    let cache = if cli.memory_cache {
        PersistentCache::in_memory()
    } else {
        PersistentCache::new(SqliteStore::open(&config::db_path())?)
    };
    let registry = ResourceRegistry::new(&client_config, cache)?;

    let files: Vec<PathBuf> = cli.files.into_iter().filter(|f| f.is_file()).collect();
    let resources = registry.find_file_resources(&files).await?;
    if resources.len() != files.len() {
        anyhow::bail!(
            "Mismatch between request size and response size. {} != {}",
            files.len(),
            resources.len()
        );
    }

    if cli.verbose {
        println!("The following files were found in the OSS Index:");
    }
    let mut identified = 0;
    for (file, resource) in files.iter().zip(&resources) {
        if resource.exists() {
            identified += 1;
            let path = std::path::absolute(file).unwrap_or_else(|_| file.clone());
            if cli.verbose {
                print!("  ");
            }
            println!("{}", path.display());
        }
    }
    if cli.verbose {
        println!("Checked {} files", files.len());
        println!("Identified {} files", identified);
    }

    registry.close()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging()?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}
