use serde::{Deserialize, Serialize};
use tracing::warn;

/// Number of structural units (pages, paragraphs, slides, rows, lines)
/// dropped from each end of a document before its text is used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    #[serde(default)]
    pub skip_start: usize,
    #[serde(default)]
    pub skip_end: usize,
}

impl Window {
    pub fn new(skip_start: usize, skip_end: usize) -> Self {
        Self {
            skip_start,
            skip_end,
        }
    }

    /// Select the units that survive the window.
    ///
    /// Returns an empty slice when the window covers every unit.
    pub fn apply<'a, T>(&self, units: &'a [T], unit: &str) -> &'a [T] {
        let start = self.skip_start;
        let end = units.len().saturating_sub(self.skip_end);

        if start >= end {
            warn!(
                unit,
                total = units.len(),
                start,
                end,
                "Window leaves no units, returning empty text"
            );
            return &[];
        }

        &units[start..end]
    }
}
