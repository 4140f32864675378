//! Session state shared by the one-shot commands and the console

use std::path::{Path, PathBuf};

use crate::domain::api_key::ApiKey;
use crate::infrastructure::api_key::KeyService;
use crate::infrastructure::gate::Gate;

/// Everything a session holds. Nothing here except the key store outlives the process.
#[derive(Debug)]
pub struct AppState {
    pub service: KeyService,
    gate: Gate,
    unlocked: bool,
    preview: Vec<ApiKey>,
    export_dir: PathBuf,
}

impl AppState {
    pub fn new(service: KeyService, gate: Gate, export_dir: impl Into<PathBuf>) -> Self {
        Self {
            service,
            gate,
            unlocked: false,
            preview: Vec::new(),
            export_dir: export_dir.into(),
        }
    }

    /// Try to unlock the session, true on success. Once unlocked it stays unlocked.
    pub fn unlock(&mut self, passkey: &str) -> bool {
        if !self.unlocked {
            self.unlocked = self.gate.check_passkey(passkey);
        }
        self.unlocked
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Replace the unsaved batch
    pub fn set_preview(&mut self, batch: Vec<ApiKey>) {
        self.preview = batch;
    }

    pub fn preview(&self) -> &[ApiKey] {
        &self.preview
    }

    /// Take the unsaved batch, leaving none behind
    pub fn take_preview(&mut self) -> Vec<ApiKey> {
        std::mem::take(&mut self.preview)
    }
}
