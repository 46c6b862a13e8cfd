use crate::error::{Result, ScanError};
use crate::extract::{HtmlLinkExtractor, LinkExtractor};
use crate::fetch::{DocumentFetcher, HttpFetcher};
use crate::normalize::normalize_url;
use crate::queue::{Offer, WorkQueue};
use crate::result::CrawlReport;
use crate::state::CrawlState;
use crate::target::CrawlTarget;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// Breadth-first crawler for a single host.
///
/// A fixed pool of workers drains one bounded queue. A crawl ends when every
/// admitted URL has been processed, or when the cancellation token fires.
pub struct Crawler {
    fetcher: Arc<dyn DocumentFetcher>,
    extractor: Arc<dyn LinkExtractor>,
    max_pages: usize,
    queue_capacity: usize,
    progress_callback: Option<ProgressCallback>,
    cancel: CancellationToken,
}

/// What each worker task needs, shared behind one `Arc`.
struct Worker {
    target: CrawlTarget,
    state: Arc<CrawlState>,
    queue: Arc<WorkQueue>,
    fetcher: Arc<dyn DocumentFetcher>,
    extractor: Arc<dyn LinkExtractor>,
    max_pages: usize,
    progress_callback: Option<ProgressCallback>,
    cancel: CancellationToken,
}

impl Crawler {
    pub fn new() -> Result<Self> {
        Ok(Self::from_fetcher(Arc::new(HttpFetcher::new()?)))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Ok(Self::from_fetcher(Arc::new(HttpFetcher::with_timeout(timeout)?)))
    }

    pub fn from_fetcher(fetcher: Arc<dyn DocumentFetcher>) -> Self {
        Self {
            fetcher,
            extractor: Arc::new(HtmlLinkExtractor),
            max_pages: usize::MAX,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            progress_callback: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn LinkExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Cancelling the token stops the crawl early. `crawl` then returns what
    /// was gathered so far with `interrupted` set.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub async fn crawl(&self, start_url: &str, workers: usize) -> Result<CrawlReport> {
        if workers == 0 {
            return Err(ScanError::Other("at least one worker is required".to_string()));
        }

        let target = CrawlTarget::parse(start_url)?;
        info!(
            "Starting crawl of {} with {} workers (max pages: {}, queue capacity: {})",
            target.as_str(),
            workers,
            self.max_pages,
            self.queue_capacity
        );

        let state = Arc::new(CrawlState::new());
        let queue = Arc::new(WorkQueue::new(self.queue_capacity));

        if let Offer::Full(url) | Offer::Closed(url) = queue.offer(target.as_str().to_string()) {
            return Err(ScanError::Other(format!("could not seed queue with {}", url)));
        }

        let worker = Arc::new(Worker {
            target: target.clone(),
            state: state.clone(),
            queue: queue.clone(),
            fetcher: self.fetcher.clone(),
            extractor: self.extractor.clone(),
            max_pages: self.max_pages,
            progress_callback: self.progress_callback.clone(),
            cancel: self.cancel.clone(),
        });

        let mut worker_handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            debug!("Deployed worker {}", worker_id + 1);
            let worker = worker.clone();
            worker_handles.push(tokio::spawn(async move { worker.run(worker_id).await }));
        }

        // Cancelled workers drop their items, so the queue can go idle in the
        // same instant. The token decides.
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {}
            _ = queue.wait_idle() => {}
        }
        let interrupted = self.cancel.is_cancelled();
        if interrupted {
            warn!("Crawl of {} cancelled, draining workers", target.as_str());
        }

        queue.close();
        for joined in join_all(worker_handles).await {
            joined?;
        }

        let snapshot = state.snapshot().await;
        let mut report = CrawlReport::new(target.as_str().to_string());
        report.pages = snapshot.pages;
        report.skipped = snapshot.skipped;
        report.overflow = snapshot.overflow;
        report.interrupted = interrupted;

        info!(
            "Crawl complete. Visited {} pages ({} skipped, {} overflowed)",
            report.pages.len(),
            report.skipped.len(),
            report.overflow.len()
        );
        Ok(report)
    }
}

impl Worker {
    async fn run(&self, worker_id: usize) {
        debug!("Worker {} started", worker_id);

        while let Some(item) = self.queue.next().await {
            // The item's unit of work completes when `item` goes out of scope.
            if self.state.size().await >= self.max_pages {
                debug!("[Worker {}] page limit reached, dropping {}", worker_id, item.url());
                continue;
            }

            if let Some(ref callback) = self.progress_callback {
                callback(worker_id, item.url().to_string());
            }
            debug!("[Worker {}] Processing: {}", worker_id, item.url());

            self.process(worker_id, item.url()).await;
        }

        debug!("Worker {} finished", worker_id);
    }

    async fn process(&self, worker_id: usize, raw_url: &str) {
        let key = match normalize_url(raw_url) {
            Ok(key) => key,
            Err(e) => {
                warn!("couldn't normalize {}, got: {}", raw_url, e);
                return;
            }
        };

        if !self.state.claim(&key).await {
            debug!("already visited {}. skipping...", raw_url);
            return;
        }

        let fetched = tokio::select! {
            _ = self.cancel.cancelled() => return,
            fetched = self.fetcher.fetch_document(raw_url) => fetched,
        };
        let body = match fetched {
            Ok(body) => body,
            Err(ScanError::NotDocument(content_type)) => {
                warn!("skipping {}: not an html document ({})", raw_url, content_type);
                return;
            }
            Err(e) => {
                warn!("couldn't get html, ignoring {}: {}", raw_url, e);
                return;
            }
        };

        let links = match self.extractor.extract_links(&body, raw_url) {
            Ok(links) => links,
            Err(e) => {
                warn!("couldn't get urls from html, ignoring {}: {}", raw_url, e);
                return;
            }
        };
        self.state.record_page(&key, links.len()).await;
        debug!("[Worker {}] {} links found on {}", worker_id, links.len(), key);

        for link in links {
            match self.target.is_foreign(&link) {
                Ok(true) => {
                    self.state.record_skipped(link).await;
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    warn!("got error checking url host: {}. proceeding to next...", e);
                    continue;
                }
            }

            let link_key = match normalize_url(&link) {
                Ok(link_key) => link_key,
                Err(e) => {
                    warn!("couldn't normalize {}, got: {}", link, e);
                    continue;
                }
            };
            if self.state.is_visited(&link_key).await {
                continue;
            }

            match self.queue.offer(link) {
                Offer::Admitted => {}
                Offer::Full(link) => {
                    debug!("[Worker {}] queue full, dropping {}", worker_id, link);
                    self.state.record_overflow(link).await;
                }
                Offer::Closed(link) => {
                    debug!("[Worker {}] queue closed, dropping {}", worker_id, link);
                }
            }
        }
    }
}
