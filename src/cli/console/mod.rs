//! Interactive console
//!
//! Starts behind the access gate: a decoy 403 page that reveals the passkey
//! prompt after four `r` presses. Once unlocked, every line is parsed as a
//! command. A line typed while a validation is in flight cancels it.

use std::mem;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::infrastructure::api_key::WipeConfirmation;
use crate::infrastructure::gate::RevealTrigger;

use super::keys::{self, GenerateArgs};
use super::state::AppState;
use super::{open_state, GlobalArgs};

const DECOY: &str = "403 Forbidden\n\nYou don't have permission to access this resource.";
const WIPE_QUESTION: &str =
    "Are you sure you want to delete ALL keys? This cannot be undone. [y/N]";

#[derive(Parser, Debug)]
#[command(name = "console", no_binary_name = true)]
struct ConsoleLine {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Generate a batch (kept as an unsaved preview unless --save)
    Generate(GenerateArgs),
    /// Save the unsaved preview
    Save,
    /// Drop the unsaved preview
    Discard,
    /// List stored keys
    List,
    /// Search by token or note
    Search {
        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,
    },
    /// Revoke a key by id or unique id prefix
    Revoke { id: String },
    /// Delete ALL keys
    Wipe {
        #[arg(long)]
        yes: bool,
    },
    /// Export stored keys, or the unsaved preview with --preview
    Export {
        query: Option<String>,
        #[arg(long)]
        preview: bool,
    },
    /// Check a token against the stored keys
    Validate { token: String },
    /// Leave the console
    #[command(visible_alias = "exit")]
    Quit,
}

/// Run the console on stdin/stdout
pub async fn run(config: &AppConfig, options: &GlobalArgs) -> anyhow::Result<()> {
    let mut state = open_state(config, options).await?;
    if let Some(passkey) = options.passkey.as_deref() {
        state.unlock(passkey);
    }

    session(
        &mut state,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await
}

/// Drive a console session until `quit` or end of input
pub async fn session<R, W>(state: &mut AppState, input: R, mut out: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    if !state.is_unlocked() && !unlock(state, &mut lines, &mut out).await? {
        return Ok(());
    }
    info!("Console unlocked");
    say(&mut out, "Access granted. Type 'help' for commands.").await?;

    let mut carried: Option<String> = None;
    loop {
        prompt(&mut out, "> ").await?;
        let line = match carried.take() {
            Some(line) => line,
            None => match lines.next_line().await? {
                Some(line) => line,
                None => break,
            },
        };

        let args = split_args(&line);
        if args.is_empty() {
            continue;
        }

        let action = match ConsoleLine::try_parse_from(&args) {
            Ok(parsed) => parsed.action,
            Err(e) => {
                say(&mut out, e.to_string().trim_end()).await?;
                continue;
            }
        };
        debug!(?action, "Console command");

        let result = match action {
            Action::Quit => break,
            Action::Generate(args) => {
                let mut text = keys::generate(state, &args.request());
                if args.export {
                    text = join(text, keys::export_preview(state, None).await);
                }
                if args.save {
                    text = join(text, keys::save(state).await);
                }
                Ok(text)
            }
            Action::Save => keys::save(state).await,
            Action::Discard => Ok(keys::discard(state)),
            Action::List => Ok(keys::list(state)),
            Action::Search { words } => Ok(keys::search(state, &words.join(" "))),
            Action::Revoke { id } => keys::revoke(state, &id).await,
            Action::Wipe { yes } => {
                let confirmation = if yes {
                    Some(WipeConfirmation::affirmed())
                } else if state.service.store().is_empty() {
                    say(&mut out, "No keys to wipe").await?;
                    continue;
                } else {
                    prompt(&mut out, &format!("{} ", WIPE_QUESTION)).await?;
                    lines
                        .next_line()
                        .await?
                        .and_then(|answer| WipeConfirmation::from_answer(&answer))
                };

                match confirmation {
                    Some(confirmation) => keys::wipe(state, confirmation).await,
                    None => Ok("Wipe cancelled".to_string()),
                }
            }
            Action::Export { query, preview } => {
                if preview {
                    keys::export_preview(state, None).await
                } else {
                    keys::export(state, query.as_deref(), None).await
                }
            }
            Action::Validate { token } => {
                say(&mut out, "Verifying...").await?;
                let (text, next) = validate_interruptible(state, &token, &mut lines).await?;
                carried = next;
                Ok(text)
            }
        };

        match result {
            Ok(text) => say(&mut out, &text).await?,
            Err(e) => say(&mut out, &format!("Error: {}", e)).await?,
        }
    }

    info!("Console closed");
    Ok(())
}

/// Locked phase. Returns false if input ended before the passkey was accepted.
async fn unlock<R, W>(
    state: &mut AppState,
    lines: &mut Lines<R>,
    out: &mut W,
) -> anyhow::Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    say(out, DECOY).await?;

    let mut trigger = RevealTrigger::new();
    let mut revealed = false;

    while let Some(line) = lines.next_line().await? {
        if !revealed {
            revealed = trigger.press_all(&line);
            if revealed {
                say(out, "System Unlock\nEnter passkey to bypass restriction.").await?;
                prompt(out, "Passkey: ").await?;
            }
            continue;
        }

        // an empty line closes the prompt
        if line.is_empty() {
            revealed = false;
            continue;
        }

        if state.unlock(&line) {
            return Ok(true);
        }
        say(out, "Invalid Key").await?;
        prompt(out, "Passkey: ").await?;
    }

    Ok(false)
}

/// Run a validation unless a new line arrives first. The line is handed back to be run next.
async fn validate_interruptible<R>(
    state: &AppState,
    token: &str,
    lines: &mut Lines<R>,
) -> anyhow::Result<(String, Option<String>)>
where
    R: AsyncBufRead + Unpin,
{
    let validation = keys::validate(state, token);
    tokio::pin!(validation);
    let mut input_open = true;

    loop {
        tokio::select! {
            text = &mut validation => return Ok((text, None)),
            next = lines.next_line(), if input_open => match next? {
                Some(line) => {
                    state.service.cancel_validation();
                    return Ok(("Validation cancelled".to_string(), Some(line)));
                }
                None => input_open = false,
            },
        }
    }
}

fn join(text: String, more: anyhow::Result<String>) -> String {
    match more {
        Ok(more) => format!("{}\n{}", text, more),
        Err(e) => format!("{}\nError: {}", text, e),
    }
}

async fn say<W: AsyncWrite + Unpin>(out: &mut W, text: &str) -> std::io::Result<()> {
    out.write_all(text.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await
}

async fn prompt<W: AsyncWrite + Unpin>(out: &mut W, text: &str) -> std::io::Result<()> {
    out.write_all(text.as_bytes()).await?;
    out.flush().await
}

/// Split a command line on whitespace, honoring single and double quotes
fn split_args(line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_arg = true;
            }
            None if c.is_whitespace() => {
                if in_arg {
                    args.push(mem::take(&mut current));
                    in_arg = false;
                }
            }
            None => {
                current.push(c);
                in_arg = true;
            }
        }
    }

    if in_arg {
        args.push(current);
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::api_key::{ApiKey, ApiKeyId};
    use crate::domain::FixedClock;
    use crate::infrastructure::api_key::{KeyService, KeyStore, DEFAULT_NAMESPACE};
    use crate::infrastructure::gate::Gate;
    use crate::infrastructure::storage::InMemoryStorage;
    use chrono::DateTime;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    const T: i64 = 1_700_000_000_000;

    async fn state(latency: Duration, export_dir: &TempDir) -> AppState {
        let clock = Arc::new(FixedClock::new(DateTime::from_timestamp_millis(T).unwrap()));
        let store = KeyStore::load(Arc::new(InMemoryStorage::new()), DEFAULT_NAMESPACE).await;
        let service = KeyService::new(store, clock).with_latency(latency);
        AppState::new(service, Gate::default(), export_dir.path())
    }

    async fn drive(state: &mut AppState, input: &str) -> String {
        let mut out = Vec::new();
        session(state, input.as_bytes(), &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_split_args() {
        assert_eq!(split_args("  list  "), vec!["list"]);
        assert_eq!(
            split_args("generate --note \"VIP buyer\" -q 3"),
            vec!["generate", "--note", "VIP buyer", "-q", "3"]
        );
        assert_eq!(split_args("generate --note ''"), vec!["generate", "--note", ""]);
        assert!(split_args("   ").is_empty());
    }

    #[tokio::test]
    async fn test_locked_until_trigger_and_passkey() {
        let dir = TempDir::new().unwrap();
        let mut state = state(Duration::ZERO, &dir).await;

        // passkey typed before the prompt is revealed does nothing
        let output = drive(&mut state, "Exviun\nr\nrrr\nexviun\nExviun\nlist\nquit\n").await;

        assert!(output.starts_with("403 Forbidden"));
        assert_eq!(output.matches("Invalid Key").count(), 1);
        assert!(output.contains("Access granted"));
        assert!(output.contains("No keys found. Generate some keys to get started."));
        assert!(state.is_unlocked());
    }

    #[tokio::test]
    async fn test_input_ends_while_locked() {
        let dir = TempDir::new().unwrap();
        let mut state = state(Duration::ZERO, &dir).await;

        let output = drive(&mut state, "rr\n").await;

        assert!(!output.contains("System Unlock"));
        assert!(!state.is_unlocked());
    }

    #[tokio::test]
    async fn test_generate_save_and_wipe() {
        let dir = TempDir::new().unwrap();
        let mut state = state(Duration::ZERO, &dir).await;
        state.unlock("Exviun");

        let output = drive(
            &mut state,
            "generate -q 2 --note \"VIP buyer\"\nsave\nsearch vip\nwipe\nno\nwipe\ny\nquit\n",
        )
        .await;

        assert!(output.contains("Saved 2 key(s). Total: 2"));
        assert!(output.contains("VIP buyer"));
        assert!(output.contains("Wipe cancelled"));
        assert!(output.contains("Deleted 2 key(s)"));
        assert!(state.service.store().is_empty());
    }

    #[tokio::test]
    async fn test_parse_errors_are_reported() {
        let dir = TempDir::new().unwrap();
        let mut state = state(Duration::ZERO, &dir).await;
        state.unlock("Exviun");

        let output = drive(&mut state, "frobnicate\nsave\nexit\n").await;

        assert!(output.contains("frobnicate"));
        assert!(output.contains("Error: Nothing to save"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_validate_completes_at_end_of_input() {
        let dir = TempDir::new().unwrap();
        let mut state = state(Duration::from_millis(800), &dir).await;
        state.unlock("Exviun");
        let key = ApiKey::new(
            ApiKeyId::generate(),
            "ABC123",
            "",
            DateTime::from_timestamp_millis(T - 10).unwrap(),
            Some(DateTime::from_timestamp_millis(T - 1).unwrap()),
        );
        state.service.save_batch(vec![key]).await.unwrap();

        let output = drive(&mut state, "validate ABC123\n").await;

        assert!(output.contains("Verifying..."));
        assert!(output.contains("KEY EXPIRED"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_line_cancels_validation() {
        let dir = TempDir::new().unwrap();
        let mut state = state(Duration::from_millis(800), &dir).await;
        state.unlock("Exviun");

        let output = drive(&mut state, "validate nothing\nlist\n").await;

        assert!(output.contains("Validation cancelled"));
        assert!(!output.contains("INVALID KEY"));
        assert!(output.contains("No keys found"));
        assert!(!state.service.is_validating());
    }
}
