use indicatif::{ProgressBar, ProgressStyle};
use linkcrawl_scanner::crawler::DEFAULT_QUEUE_CAPACITY;
use linkcrawl_scanner::error::Result;
use linkcrawl_scanner::fetch::DEFAULT_TIMEOUT_SECS;
use linkcrawl_scanner::{CancellationToken, CrawlReport, Crawler, ProgressCallback};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::info;

/// Options for configuring a crawl operation
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub url: String,
    pub max_concurrency: usize,
    pub max_pages: usize,
    pub queue_capacity: usize,
    pub timeout: Duration,
    pub show_progress_bars: bool,
}

impl CrawlOptions {
    pub fn new(url: impl Into<String>, max_concurrency: usize, max_pages: usize) -> Self {
        Self {
            url: url.into(),
            max_concurrency,
            max_pages,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            show_progress_bars: false,
        }
    }
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Execute a crawl with the given options.
///
/// Cancelling `cancel` ends the crawl early; the partial report is still returned.
pub async fn execute_crawl(
    options: CrawlOptions,
    cancel: CancellationToken,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<CrawlReport> {
    let CrawlOptions {
        url,
        max_concurrency,
        max_pages,
        queue_capacity,
        timeout,
        show_progress_bars,
    } = options;

    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner());
        pb.set_message("Starting crawl...");
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(Arc::new(pb))
    } else {
        None
    };

    let processed_count = Arc::new(AtomicUsize::new(0));

    let internal_progress_callback: ProgressCallback = {
        let pb_clone = progress_bar.clone();
        let count_clone = processed_count.clone();
        let callback_clone = progress_callback.clone();
        Arc::new(move |worker_id: usize, url: String| {
            let count = count_clone.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(ref pb) = pb_clone {
                pb.set_message(format!("Crawling... {} URLs processed", count));
            }
            if let Some(ref callback) = callback_clone {
                callback(format!("[worker {}] {}", worker_id + 1, url));
            }
        })
    };

    let crawler = Crawler::with_timeout(timeout)?
        .with_max_pages(max_pages)
        .with_queue_capacity(queue_capacity)
        .with_progress_callback(internal_progress_callback)
        .with_cancellation(cancel);

    let result = crawler.crawl(&url, max_concurrency).await;

    if let Some(ref pb) = progress_bar {
        pb.finish_and_clear();
    }
    info!(
        "Crawl of {} finished, {} URLs processed",
        url,
        processed_count.load(Ordering::Relaxed)
    );

    result
}
