//! 内存中的加载历史（参考实现）

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use super::{HistoryEntry, LoadHistory};

/// 只追加的加载历史，由宿主在每次加载后调用 [`record`](Self::record)
#[derive(Debug, Default)]
pub struct RecordedHistory {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl RecordedHistory {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, Vec<HistoryEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record(&self, source: impl Into<PathBuf>, artifact: Option<PathBuf>) {
        self.guard().push(HistoryEntry {
            source: source.into(),
            artifact,
        });
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LoadHistory for RecordedHistory {
    fn entries(&self) -> Vec<HistoryEntry> {
        self.guard().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_are_a_snapshot() {
        let history = RecordedHistory::new();
        history.record("/a.el", None);

        let snapshot = history.entries();
        history.record("/b.el", Some(PathBuf::from("/b.eln")));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(history.len(), 2);
        assert_eq!(history.entries()[1].artifact, Some(PathBuf::from("/b.eln")));
    }
}
