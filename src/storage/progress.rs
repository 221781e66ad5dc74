//! Resumable record of which community URLs have been handled.
//!
//! Every worker merges its URL here after each page, whatever the outcome.
//! Merges are serialized by a process-local mutex and written through a temp
//! file + rename so an interrupted write never truncates earlier progress.

use crate::models::ProgressState;
use anyhow::{Context, Result};
use chrono::Utc;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, error, warn};

pub struct ProgressStore {
    path: PathBuf,
    state: Mutex<ProgressState>,
}

impl ProgressStore {
    /// Load progress from `path`, or create a fresh progress file there
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let state = if path.exists() {
            match read_state(&path) {
                Ok(state) => state,
                Err(e) => {
                    let backup = path.with_extension("json.corrupt");
                    warn!(
                        "Progress file {} is unreadable ({:#}); moving it to {} and starting fresh",
                        path.display(),
                        e,
                        backup.display()
                    );
                    std::fs::rename(&path, &backup).with_context(|| {
                        format!("Failed to move aside corrupt progress file {}", path.display())
                    })?;
                    ProgressState::new()
                }
            }
        } else {
            ProgressState::new()
        };

        if !path.exists() {
            write_atomic(&path, &state)?;
        }

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of every URL marked processed so far
    pub fn processed(&self) -> HashSet<String> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.processed_urls.iter().cloned().collect()
    }

    pub fn contains(&self, url: &str) -> bool {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.processed_urls.contains(url)
    }

    pub fn len(&self) -> usize {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.processed_urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Union `urls` into the stored set and persist it.
    ///
    /// Returns the total number of processed URLs. The in-memory set is updated
    /// even when the write fails, so the next successful merge still carries it.
    pub fn merge<I>(&self, urls: I) -> Result<usize>
    where
        I: IntoIterator<Item = String>,
    {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        // Pick up anything written to the file since we loaded it
        if self.path.exists() {
            match read_state(&self.path) {
                Ok(on_disk) => {
                    state.absorb(on_disk.processed_urls);
                }
                Err(e) => warn!("Could not re-read {}: {:#}", self.path.display(), e),
            }
        }

        let added = state.absorb(urls);
        state.last_updated = Some(Utc::now());
        debug!("Progress: {} new, {} total", added, state.total_processed);

        if let Err(e) = write_atomic(&self.path, &state) {
            error!("Failed to update progress file {}: {:#}", self.path.display(), e);
            write_direct(&self.path, &state).context("Fallback progress write failed")?;
        }

        Ok(state.total_processed)
    }
}

fn read_state(path: &Path) -> Result<ProgressState> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let state = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(state)
}

fn write_atomic(path: &Path, state: &ProgressState) -> Result<()> {
    let temp_path = path.with_extension("json.tmp");
    let content = serde_json::to_string_pretty(state)?;

    {
        let mut file = std::fs::File::create(&temp_path)
            .with_context(|| format!("Failed to create {}", temp_path.display()))?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }

    std::fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

fn write_direct(path: &Path, state: &ProgressState) -> Result<()> {
    let content = serde_json::to_string_pretty(state)?;
    std::fs::write(path, content)?;
    Ok(())
}
