//! 可修改的源码后缀集合（参考实现）

use std::sync::{Arc, RwLock};

use super::SourceSuffixes;

/// 进程范围的源码后缀集合；克隆出的句柄共享同一份数据
#[derive(Clone, Debug, Default)]
pub struct SharedSuffixes {
    inner: Arc<RwLock<Vec<String>>>,
}

impl SharedSuffixes {
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inner: Arc::new(RwLock::new(suffixes.into_iter().map(Into::into).collect())),
        }
    }

    pub fn set<I, S>(&self, suffixes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = suffixes.into_iter().map(Into::into).collect();
    }

    pub fn push(&self, suffix: impl Into<String>) {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(suffix.into());
    }
}

impl SourceSuffixes for SharedSuffixes {
    fn source_suffixes(&self) -> Vec<String> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}
