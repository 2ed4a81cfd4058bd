use polars::prelude::*;
use tracing::info;

use crate::error::Result;

/// Drops rows identical in every column to an earlier row
pub struct Deduplicator;

impl Deduplicator {
    pub fn new() -> Self {
        Self
    }

    /// Returns the deduplicated frame and the number of rows removed
    pub fn deduplicate(&self, frame: &DataFrame) -> Result<(DataFrame, usize)> {
        let deduped = frame
            .clone()
            .lazy()
            .unique_stable(None, UniqueKeepStrategy::First)
            .collect()?;

        let removed = frame.height() - deduped.height();
        if removed > 0 {
            info!(removed, "Removed duplicate rows");
        }

        Ok((deduped, removed))
    }
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new()
    }
}
