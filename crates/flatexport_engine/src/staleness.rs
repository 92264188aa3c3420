use std::fs;
use std::path::Path;

use crate::persist::epoch_seconds;

/// Decides whether a target file must be (re)written.
///
/// A target is fresh only when it exists and its mtime equals the source
/// timestamp to the second. `force` makes every target stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StalenessOracle {
    force: bool,
}

impl StalenessOracle {
    pub fn new(force: bool) -> Self {
        Self { force }
    }

    pub fn is_stale(&self, target: &Path, source_timestamp: i64) -> bool {
        if self.force {
            return true;
        }
        file_timestamp(target) != Some(source_timestamp)
    }
}

/// Last-modified time of `path` in whole epoch seconds, `None` if it cannot be read.
pub fn file_timestamp(path: &Path) -> Option<i64> {
    let modified = fs::metadata(path).ok()?.modified().ok()?;
    Some(epoch_seconds(modified))
}
