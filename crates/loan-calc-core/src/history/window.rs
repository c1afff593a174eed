/// Rows shown before any "view more".
pub const DEFAULT_VISIBLE: usize = 3;

/// Rows added by each "view more".
pub const PAGE_SIZE: usize = 3;

/// Display cursor over the history. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryWindow {
    visible_count: usize,
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self {
            visible_count: DEFAULT_VISIBLE,
        }
    }
}

impl HistoryWindow {
    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    /// One more page. Whether that reveals anything is up to the caller.
    pub fn expand(self) -> Self {
        Self {
            visible_count: self.visible_count.saturating_add(PAGE_SIZE),
        }
    }

    /// Number of rows actually shown for a history of `total` entries.
    pub fn shown(&self, total: usize) -> usize {
        self.visible_count.min(total)
    }

    /// Whether a "view more" control should be offered.
    pub fn has_more(&self, total: usize) -> bool {
        total > self.visible_count
    }
}
