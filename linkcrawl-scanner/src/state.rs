use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Inner {
    visited: HashSet<String>,
    pages: HashMap<String, usize>,
    skipped: Vec<String>,
    overflow: Vec<String>,
}

/// State shared by every worker of one crawl.
///
/// Each method takes the lock for its own duration only, so no caller can
/// hold it across a fetch. Nothing spans two calls: `size()` followed by an
/// enqueue can race with another worker recording a page.
#[derive(Debug, Default)]
pub struct CrawlState {
    inner: Mutex<Inner>,
}

/// Copy of the reportable collections.
#[derive(Debug, Clone, Default)]
pub struct StateSnapshot {
    pub pages: HashMap<String, usize>,
    pub skipped: Vec<String>,
    pub overflow: Vec<String>,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_visited(&self, key: &str) -> bool {
        self.inner.lock().await.visited.contains(key)
    }

    pub async fn mark_visited(&self, key: &str) {
        self.inner.lock().await.visited.insert(key.to_string());
    }

    /// Marks `key` visited and reports whether this call was the one that did it.
    pub async fn claim(&self, key: &str) -> bool {
        self.inner.lock().await.visited.insert(key.to_string())
    }

    pub async fn record_page(&self, key: &str, link_count: usize) {
        self.inner.lock().await.pages.insert(key.to_string(), link_count);
    }

    pub async fn size(&self) -> usize {
        self.inner.lock().await.pages.len()
    }

    pub async fn record_skipped(&self, url: String) {
        self.inner.lock().await.skipped.push(url);
    }

    pub async fn record_overflow(&self, url: String) {
        self.inner.lock().await.overflow.push(url);
    }

    pub async fn snapshot(&self) -> StateSnapshot {
        let inner = self.inner.lock().await;
        StateSnapshot {
            pages: inner.pages.clone(),
            skipped: inner.skipped.clone(),
            overflow: inner.overflow.clone(),
        }
    }
}
