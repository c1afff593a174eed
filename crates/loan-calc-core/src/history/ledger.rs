//! Append-only, write-through log of past loan requests.
//!
//! The whole sequence lives in a single storage slot as a JSON array, in
//! insertion order. Every mutation rewrites the slot before the in-memory
//! copy changes, so a failed write leaves both sides as they were.

use std::fmt;

use log::{debug, warn};
use serde::Serialize;

use crate::error::LoanCalcError;
use crate::history::storage::KeyValueStore;
use crate::history::window::HistoryWindow;
use crate::request::LoanRequest;
use crate::LoanCalcResult;

/// Storage slot holding the serialized history.
pub const HISTORY_SLOT: &str = "loanHistory";

/// A history row as displayed: 1-based position plus the request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub position: usize,
    #[serde(flatten)]
    pub request: LoanRequest,
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Loan {}: {} USD, Rate: {}%, Term: {} years",
            self.position,
            self.request.principal(),
            self.request.annual_rate_percent(),
            self.request.term_years()
        )
    }
}

pub struct HistoryStore<S: KeyValueStore> {
    storage: S,
    entries: Vec<LoanRequest>,
}

impl<S: KeyValueStore> HistoryStore<S> {
    /// Restore the history from `storage`.
    ///
    /// Never fails: an absent slot is an empty history, and an unreadable
    /// or malformed one is logged and treated as empty.
    pub fn load(storage: S) -> Self {
        let entries = read_entries(&storage).unwrap_or_else(|e| {
            warn!("discarding stored history: {e}");
            Vec::new()
        });
        debug!("loaded {} history entries", entries.len());
        Self { storage, entries }
    }

    /// Re-read the slot, replacing the in-memory copy.
    pub fn reload(&mut self) -> &[LoanRequest] {
        self.entries = read_entries(&self.storage).unwrap_or_else(|e| {
            warn!("discarding stored history: {e}");
            Vec::new()
        });
        &self.entries
    }

    pub fn entries(&self) -> &[LoanRequest] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Add `request` to the end and persist the full sequence.
    pub fn append(&mut self, request: LoanRequest) -> LoanCalcResult<()> {
        let mut next = self.entries.clone();
        next.push(request);
        self.write(&next)?;
        self.entries = next;
        Ok(())
    }

    /// Overwrite the whole sequence (bulk seed) and persist it.
    pub fn replace_all(&mut self, requests: Vec<LoanRequest>) -> LoanCalcResult<()> {
        self.write(&requests)?;
        self.entries = requests;
        Ok(())
    }

    /// Empty the history and delete the slot, so a reload sees "absent"
    /// rather than an empty array.
    pub fn clear(&mut self) -> LoanCalcResult<()> {
        self.storage.remove(HISTORY_SLOT)?;
        self.entries.clear();
        Ok(())
    }

    /// The first `min(visible_count, len)` entries.
    pub fn visible_slice(&self, window: &HistoryWindow) -> &[LoanRequest] {
        &self.entries[..window.shown(self.entries.len())]
    }

    /// Visible entries numbered for display.
    pub fn visible_entries(&self, window: &HistoryWindow) -> Vec<HistoryEntry> {
        self.visible_slice(window)
            .iter()
            .enumerate()
            .map(|(i, request)| HistoryEntry {
                position: i + 1,
                request: request.clone(),
            })
            .collect()
    }

    fn write(&mut self, entries: &[LoanRequest]) -> LoanCalcResult<()> {
        let json = serde_json::to_string(entries)?;
        self.storage.set(HISTORY_SLOT, &json)?;
        debug!("persisted {} history entries", entries.len());
        Ok(())
    }
}

fn read_entries<S: KeyValueStore>(storage: &S) -> LoanCalcResult<Vec<LoanRequest>> {
    match storage.get(HISTORY_SLOT)? {
        None => Ok(Vec::new()),
        Some(raw) => serde_json::from_str(&raw)
            .map_err(|e| LoanCalcError::PersistenceRead(e.to_string())),
    }
}
