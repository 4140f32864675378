//! CLI module for the key console
//!
//! One-shot subcommands for scripting plus an interactive `console` session.
//! Every entry point goes through the passkey gate before touching keys.

pub mod console;
pub mod keys;
mod render;
pub mod state;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::config::AppConfig;
use crate::domain::SystemClock;
use crate::infrastructure::api_key::{KeyService, KeyStore};
use crate::infrastructure::gate::Gate;
use crate::infrastructure::logging;
use crate::infrastructure::storage::{StorageConfig, StorageFactory};

pub use state::AppState;

/// Lua Auth key console - generate, browse, revoke and test access keys
#[derive(Parser, Debug)]
#[command(name = "lua-auth-keys")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub options: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Passkey that unlocks the console
    #[arg(long, env = "LUA_AUTH_PASSKEY", global = true, hide_env_values = true)]
    pub passkey: Option<String>,

    /// Keep keys in memory only; nothing is read from or written to disk
    #[arg(long, global = true)]
    pub ephemeral: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a batch of keys
    Generate(keys::GenerateArgs),

    /// List stored keys, newest first
    List,

    /// Search keys by token or note (case-insensitive)
    Search {
        /// Text to look for
        query: String,
    },

    /// Revoke (delete) a key by id or unique id prefix
    Revoke {
        id: String,
    },

    /// Delete ALL keys
    Wipe {
        /// Confirm the irreversible wipe
        #[arg(long)]
        yes: bool,
    },

    /// Export keys to a text file
    Export {
        /// Only export keys matching this search
        query: Option<String>,

        /// Output directory (overrides config)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Check a token against the stored keys
    Validate {
        token: String,
    },

    /// Start an interactive session
    Console,
}

/// Load `.env`, configuration and logging. Invalid configuration falls back to defaults.
pub fn load_config() -> AppConfig {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging);
    config
}

/// Build the session: open storage and load the key store exactly once
pub async fn open_state(config: &AppConfig, options: &GlobalArgs) -> anyhow::Result<AppState> {
    let storage_config = if options.ephemeral {
        StorageConfig::in_memory()
    } else {
        StorageConfig::from_backend(&config.storage.backend, &config.storage.path)?
    };
    info!(storage = ?storage_config, "Opening key storage");

    let storage = StorageFactory::create(&storage_config);
    let store = KeyStore::load(storage, &config.storage.namespace).await;
    let service =
        KeyService::new(store, Arc::new(SystemClock)).with_latency(config.simulator.latency());

    Ok(AppState::new(
        service,
        Gate::new(&config.gate.passkey),
        &config.export.directory,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from([
            "lua-auth-keys",
            "--ephemeral",
            "generate",
            "--length",
            "20",
            "--quantity",
            "3",
            "--duration",
            "0",
            "--note",
            "Buyer",
            "--save",
        ])
        .unwrap();

        assert!(cli.options.ephemeral);
        match cli.command {
            Command::Generate(args) => {
                let request = args.request();
                assert_eq!(request.length(), 20);
                assert_eq!(request.quantity(), 3);
                assert!(request.duration().is_lifetime());
                assert_eq!(request.note(), "Buyer");
                assert!(args.save);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_generate_defaults() {
        let cli = Cli::try_parse_from(["lua-auth-keys", "generate"]).unwrap();

        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        let request = args.request();
        assert_eq!(request.note(), "Premium User");
        assert_eq!(request.length(), 15);
        assert_eq!(request.quantity(), 1);
        assert!(!args.save);
    }

    #[test]
    fn test_parse_wipe_and_global_passkey_after_subcommand() {
        let cli =
            Cli::try_parse_from(["lua-auth-keys", "wipe", "--yes", "--passkey", "Exviun"]).unwrap();

        assert_eq!(cli.options.passkey.as_deref(), Some("Exviun"));
        assert!(matches!(cli.command, Command::Wipe { yes: true }));
    }

    #[tokio::test]
    async fn test_open_state_ephemeral() {
        let options = GlobalArgs {
            passkey: None,
            ephemeral: true,
        };

        let state = open_state(&AppConfig::default(), &options).await.unwrap();
        assert!(state.service.store().is_empty());
        assert!(!state.is_unlocked());
    }

    #[tokio::test]
    async fn test_open_state_rejects_unknown_backend() {
        let mut config = AppConfig::default();
        config.storage.backend = "redis".to_string();

        assert!(open_state(&config, &GlobalArgs::default()).await.is_err());
    }
}
