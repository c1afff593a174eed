//! Bulk seeding of the history from an external `{ "loans": [...] }` document.
//!
//! Seeding runs once at startup and may finish after the user has already
//! acted. Ordering is explicit: a [`SeedTicket`] taken before the fetch
//! records the history revision, and the seed only lands if no user action
//! has bumped the revision since.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::LoanCalcError;
use crate::request::LoanRequest;
use crate::LoanCalcResult;

/// Shape of a seed document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedDocument {
    pub loans: Vec<LoanRequest>,
}

/// Where the initial history comes from.
pub trait SeedSource {
    fn fetch(&self) -> LoanCalcResult<Vec<LoanRequest>>;
}

/// Seed read from a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileSeed {
    path: PathBuf,
}

impl FileSeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SeedSource for FileSeed {
    fn fetch(&self) -> LoanCalcResult<Vec<LoanRequest>> {
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            LoanCalcError::DataFetch(format!("Failed to read '{}': {}", self.path.display(), e))
        })?;
        parse_seed(&contents)
            .map_err(|e| LoanCalcError::DataFetch(format!("'{}': {}", self.path.display(), e)))
    }
}

/// Parse a seed document. Every loan must satisfy the request invariant.
pub fn parse_seed(json: &str) -> LoanCalcResult<Vec<LoanRequest>> {
    let doc: SeedDocument =
        serde_json::from_str(json).map_err(|e| LoanCalcError::DataFetch(e.to_string()))?;
    Ok(doc.loans)
}

/// Proof of the history revision at the moment a seed fetch started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedTicket {
    pub(crate) revision: u64,
}

/// What happened to a seed once its fetch resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SeedOutcome {
    /// The history now holds exactly this many seeded loans.
    Applied { loans: usize },
    /// A calculate or reset happened after the ticket was issued.
    Superseded,
    /// The fetch failed; the history was not touched.
    Failed { reason: String },
}
