use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::{Parser, ValueEnum};

use crate::constants::{DEFAULT_DB_PATH, DEFAULT_HISTORY_CONCURRENCY, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::data_backend::{
    postgrest_store::PostgrestStore, sqlite_store::SqliteStore, SharedStore,
};
use crate::errors::{ConfigError, StoreError};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// hosted Supabase project (REST)
    Supabase,
    /// local SQLite file
    Sqlite,
}

/// Telegram bot to keep track of recipes, guests and the meals shared with them.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// The telegram bot token to be used
    #[arg(short, long, env = "TELOXIDE_TOKEN")]
    pub token: String,
    /// Where recipes, guests and meals are stored
    #[arg(long, env = "RECETTES_STORE", value_enum, default_value_t = StoreKind::Supabase)]
    pub store: StoreKind,
    /// Supabase project url{n}Example: <https://abcdefgh.supabase.co>
    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: Option<String>,
    /// Supabase anon key
    #[arg(long, env = "SUPABASE_ANON_KEY", hide_env_values = true)]
    pub supabase_key: Option<String>,
    /// SQLite database file, used with --store sqlite
    #[arg(long, env = "RECETTES_DB", default_value = DEFAULT_DB_PATH)]
    pub db_path: PathBuf,
    /// Give up on a backend request after this many seconds
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,
    /// Meals whose details are fetched at the same time in a history
    #[arg(long, default_value_t = DEFAULT_HISTORY_CONCURRENCY)]
    pub history_concurrency: usize,
    /// Enable verbose logging (mostly performance metrics){n}[SETS env: RUST_LOG=debug]
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreConfig {
    Supabase {
        endpoint: String,
        api_key: String,
        timeout: Duration,
    },
    Sqlite {
        path: PathBuf,
    },
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

impl Args {
    pub fn store_config(&self) -> Result<StoreConfig, ConfigError> {
        match self.store {
            StoreKind::Sqlite => Ok(StoreConfig::Sqlite {
                path: self.db_path.clone(),
            }),
            StoreKind::Supabase => {
                let endpoint = non_blank(&self.supabase_url).ok_or(ConfigError::MissingEndpoint)?;
                let api_key =
                    non_blank(&self.supabase_key).ok_or(ConfigError::MissingCredential)?;

                if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
                    return Err(ConfigError::InvalidEndpoint(endpoint.to_string()));
                }

                Ok(StoreConfig::Supabase {
                    endpoint: endpoint.to_string(),
                    api_key: api_key.to_string(),
                    timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
                })
            }
        }
    }
}

pub fn open_store(config: &StoreConfig) -> Result<SharedStore, StoreError> {
    match config {
        StoreConfig::Supabase {
            endpoint,
            api_key,
            timeout,
        } => {
            log::info!("Using Supabase at {}", endpoint);
            Ok(Arc::new(PostgrestStore::new(endpoint, api_key, *timeout)?))
        }
        StoreConfig::Sqlite { path } => {
            log::info!("Using SQLite database {}", path.display());
            Ok(Arc::new(SqliteStore::open(path)?))
        }
    }
}
