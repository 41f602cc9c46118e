use crate::config::Config;
use crate::db::connection::Database;
use crate::responses::error_to_response;
use crate::router::handle;
use crate::service::AppService;
use astra::Server;
use clap::{Parser, Subcommand};
use std::error::Error;
use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod agent;
mod config;
mod db;
mod domain;
mod errors;
mod etl;
mod repl;
mod responses;
mod router;
mod service;

#[cfg(test)]
mod tests;

#[derive(Parser)]
#[command(about = "Ask natural-language questions about restaurant listings")]
struct Args {
    /// SQLite database file (overrides DATABASE_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rebuild the restaurants table from the per-city CSV files
    Etl {
        /// Directory holding one CSV file per city (overrides DATA_DIR)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Serve the question-answering HTTP API
    Serve {
        /// Address to listen on (overrides BIND_ADDR)
        #[arg(long)]
        addr: Option<String>,

        /// Number of worker threads (overrides MAX_WORKERS)
        #[arg(long)]
        workers: Option<NonZeroUsize>,
    },
    /// Ask questions interactively from the terminal
    Chat,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("restaurant_agent=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let mut cfg = Config::from_env();
    if let Some(db) = args.db {
        cfg.database_path = db;
    }

    let result = match args.command {
        Command::Etl { data_dir } => {
            if let Some(dir) = data_dir {
                cfg.data_dir = dir;
            }
            run_etl(&cfg)
        }
        Command::Serve { addr, workers } => {
            if let Some(addr) = addr {
                cfg.bind_addr = addr;
            }
            if let Some(workers) = workers {
                cfg.max_workers = workers.get();
            }
            serve(&cfg)
        }
        Command::Chat => chat(&cfg),
    };

    if let Err(e) = result {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run_etl(cfg: &Config) -> Result<(), Box<dyn Error>> {
    let db = Database::new(&cfg.database_path);
    etl::run_etl(&cfg.data_dir, &db)
        .map_err(|e| format!("ETL aborted, database left unchanged: {e}"))?;
    Ok(())
}

fn serve(cfg: &Config) -> Result<(), Box<dyn Error>> {
    let addr: SocketAddr = cfg
        .bind_addr
        .parse()
        .map_err(|e| format!("Invalid bind address '{}': {e}", cfg.bind_addr))?;

    let service = Arc::new(AppService::from_config(cfg)?);
    if !service.database().path().exists() {
        warn!(
            "Database {} does not exist yet; run the etl command first",
            service.database().path().display()
        );
    }
    let shared = Arc::clone(&service);

    info!("Starting server at http://{addr}");
    let server = Server::bind(&addr).max_workers(cfg.max_workers);

    let result = server.serve(move |req, _info| match handle(req, &shared) {
        Ok(resp) => resp,
        Err(err) => {
            if err.status() >= 500 {
                error!("Request failed: {err}");
            }
            error_to_response(err)
        }
    });

    service.shutdown();
    result?;
    info!("Server shut down cleanly.");
    Ok(())
}

fn chat(cfg: &Config) -> Result<(), Box<dyn Error>> {
    if cfg.google_api_key.is_none() {
        return Err("GOOGLE_API_KEY is not set; the agent cannot be used".into());
    }

    let service = AppService::from_config(cfg)?;
    let stdin = std::io::stdin();
    let asked = repl::run_chat(&service, stdin.lock(), std::io::stdout())?;

    info!("Chat session ended after {asked} questions");
    service.shutdown();
    Ok(())
}
