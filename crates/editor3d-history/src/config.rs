/// Configuration for the history pipeline.
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

/// Limits applied by a `Pipeline`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of operations kept. The oldest entries are evicted
    /// once the history grows past this. `None` keeps everything.
    pub max_depth: Option<NonZeroUsize>,
}

impl HistoryConfig {
    /// History without a depth limit.
    pub fn unbounded() -> Self {
        Self { max_depth: None }
    }

    /// History capped at `depth` entries. A depth of zero means unbounded.
    pub fn with_max_depth(depth: usize) -> Self {
        Self {
            max_depth: NonZeroUsize::new(depth),
        }
    }
}
