//! Key commands
//!
//! Each handler works on an [`AppState`] and returns the text to print, so the
//! one-shot subcommands and the console share them.

use std::path::Path;

use anyhow::bail;
use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::api_key::GenerationRequest;
use crate::infrastructure::api_key::WipeConfirmation;

use super::render;
use super::state::AppState;
use super::{open_state, Command, GlobalArgs};

/// Arguments for generating a batch
///
/// Numbers are taken as raw text; anything unparseable or out of range falls back to the default.
#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Token length (10-64)
    #[arg(short, long, default_value = "15")]
    pub length: String,

    /// Number of keys (1-100)
    #[arg(short, long, default_value = "1")]
    pub quantity: String,

    /// Validity in days: 1, 7, 30, 365 or 0 for lifetime
    #[arg(short, long, default_value = "7")]
    pub duration: String,

    /// Note attached to every key in the batch
    #[arg(short, long, default_value = "Premium User")]
    pub note: String,

    /// Save the batch to the key store
    #[arg(long)]
    pub save: bool,

    /// Write the batch to an export file
    #[arg(long)]
    pub export: bool,
}

impl GenerateArgs {
    pub fn request(&self) -> GenerationRequest {
        GenerationRequest::from_raw(
            &self.length,
            &self.quantity,
            self.note.as_str(),
            &self.duration,
        )
    }
}

/// Generate a batch and hold it as the session preview
pub fn generate(state: &mut AppState, request: &GenerationRequest) -> String {
    let batch = state.service.preview(request);
    let text = render::preview(&batch, request.duration());
    state.set_preview(batch);
    text
}

/// Save the previewed batch
pub async fn save(state: &mut AppState) -> anyhow::Result<String> {
    let batch = state.take_preview();
    if batch.is_empty() {
        bail!("Nothing to save. Generate some keys first.");
    }

    let saved = state.service.save_batch(batch).await?;
    Ok(format!("Saved {} key(s). Total: {}", saved, state.service.store().len()))
}

/// Drop the previewed batch
pub fn discard(state: &mut AppState) -> String {
    let dropped = state.take_preview().len();
    format!("Discarded {} unsaved key(s)", dropped)
}

pub fn list(state: &AppState) -> String {
    let keys: Vec<_> = state.service.store().records().iter().collect();
    render::key_table(&keys, state.service.now())
}

pub fn search(state: &AppState, query: &str) -> String {
    render::key_table(&state.service.search(query), state.service.now())
}

/// Revoke by full id or unique id prefix
pub async fn revoke(state: &mut AppState, input: &str) -> anyhow::Result<String> {
    let Some(id) = state.service.resolve_id(input)? else {
        bail!("No key with id '{}'", input.trim());
    };

    state.service.revoke(&id).await?;
    Ok(format!("Revoked key {}", id))
}

pub async fn wipe(state: &mut AppState, confirmation: WipeConfirmation) -> anyhow::Result<String> {
    let deleted = state.service.wipe(confirmation).await?;
    Ok(format!("Deleted {} key(s)", deleted))
}

/// Export stored keys matching `query` (all keys when absent)
pub async fn export(
    state: &AppState,
    query: Option<&str>,
    dir: Option<&Path>,
) -> anyhow::Result<String> {
    let keys = state.service.search(query.unwrap_or(""));
    if keys.is_empty() {
        bail!("No keys to export");
    }

    let dir = dir.unwrap_or(state.export_dir());
    let path = state.service.export(keys.iter().copied(), dir).await?;
    Ok(format!("Exported {} key(s) to {}", keys.len(), path.display()))
}

/// Export the unsaved preview
pub async fn export_preview(state: &AppState, dir: Option<&Path>) -> anyhow::Result<String> {
    if state.preview().is_empty() {
        bail!("No keys to export");
    }

    let dir = dir.unwrap_or(state.export_dir());
    let path = state.service.export(state.preview(), dir).await?;
    Ok(format!(
        "Exported {} key(s) to {}",
        state.preview().len(),
        path.display()
    ))
}

pub async fn validate(state: &AppState, token: &str) -> String {
    match state.service.validate(token).await {
        Some(result) => render::validation(&result),
        None => "Validation cancelled".to_string(),
    }
}

/// Run a single subcommand and exit
pub async fn run(config: &AppConfig, options: &GlobalArgs, command: Command) -> anyhow::Result<()> {
    let mut state = open_state(config, options).await?;

    let passkey = options.passkey.as_deref().unwrap_or_default();
    if !state.unlock(passkey) {
        bail!("Invalid Key. Pass the passkey with --passkey or LUA_AUTH_PASSKEY.");
    }

    let output = match command {
        Command::Generate(args) => {
            let mut lines = vec![generate(&mut state, &args.request())];
            if args.export {
                lines.push(export_preview(&state, None).await?);
            }
            if args.save {
                lines.push(save(&mut state).await?);
            }
            lines.join("\n")
        }
        Command::List => list(&state),
        Command::Search { query } => search(&state, &query),
        Command::Revoke { id } => revoke(&mut state, &id).await?,
        Command::Wipe { yes } => {
            if !yes {
                bail!("Refusing to delete ALL keys without --yes. This cannot be undone.");
            }
            wipe(&mut state, WipeConfirmation::affirmed()).await?
        }
        Command::Export { query, dir } => {
            export(&state, query.as_deref(), dir.as_deref()).await?
        }
        Command::Validate { token } => {
            eprintln!("Verifying...");
            validate(&state, &token).await
        }
        Command::Console => bail!("Use the console entry point for interactive sessions"),
    };

    info!("Command finished");
    println!("{}", output);
    Ok(())
}
