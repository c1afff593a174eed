//! Calculation history: persisted log of past loan requests plus the
//! display window used to page through it.

pub mod ledger;
pub mod storage;
pub mod window;

pub use ledger::{HistoryEntry, HistoryStore, HISTORY_SLOT};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use window::HistoryWindow;
