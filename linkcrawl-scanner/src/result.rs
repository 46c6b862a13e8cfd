use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Everything a finished (or interrupted) crawl hands back for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlReport {
    pub base_url: String,
    /// Normalized page key to the number of links found on that page.
    pub pages: HashMap<String, usize>,
    /// Links pointing at another host.
    pub skipped: Vec<String>,
    /// Same-host links dropped because the queue was full when they were found.
    pub overflow: Vec<String>,
    pub interrupted: bool,
}

impl CrawlReport {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            pages: HashMap::new(),
            skipped: Vec::new(),
            overflow: Vec::new(),
            interrupted: false,
        }
    }

    /// Pages ordered by descending link count. Ties come out in no particular order.
    pub fn ranked_pages(&self) -> Vec<(&str, usize)> {
        let mut pairs: Vec<(&str, usize)> = self
            .pages
            .iter()
            .map(|(key, count)| (key.as_str(), *count))
            .collect();
        pairs.sort_unstable_by(|a, b| b.1.cmp(&a.1));
        pairs
    }

    pub fn total_links(&self) -> usize {
        self.pages.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranked_pages_descending() {
        let mut report = CrawlReport::new("https://x.test/".to_string());
        report.pages.insert("x.test/a".to_string(), 1);
        report.pages.insert("x.test".to_string(), 7);
        report.pages.insert("x.test/b".to_string(), 4);

        let ranked = report.ranked_pages();
        assert_eq!(ranked, vec![("x.test", 7), ("x.test/b", 4), ("x.test/a", 1)]);
        assert_eq!(report.total_links(), 12);
    }

    #[test]
    fn test_ranked_pages_with_ties_keeps_every_page() {
        let mut report = CrawlReport::new("https://x.test/".to_string());
        report.pages.insert("x.test/a".to_string(), 2);
        report.pages.insert("x.test/b".to_string(), 2);
        report.pages.insert("x.test".to_string(), 5);

        let ranked = report.ranked_pages();
        assert_eq!(ranked[0], ("x.test", 5));
        let mut tied: Vec<&str> = ranked[1..].iter().map(|(k, _)| *k).collect();
        tied.sort();
        assert_eq!(tied, vec!["x.test/a", "x.test/b"]);
    }

    #[test]
    fn test_empty_report() {
        let report = CrawlReport::new("https://x.test/".to_string());
        assert!(report.ranked_pages().is_empty());
        assert_eq!(report.total_links(), 0);
        assert!(!report.interrupted);
    }
}
