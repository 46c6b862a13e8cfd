pub mod crawler;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod normalize;
pub mod queue;
pub mod result;
pub mod state;
pub mod target;

pub use crawler::{Crawler, ProgressCallback};
pub use error::ScanError;
pub use extract::{HtmlLinkExtractor, LinkExtractor};
pub use fetch::{DocumentFetcher, HttpFetcher};
pub use normalize::normalize_url;
pub use result::CrawlReport;
pub use target::CrawlTarget;
pub use tokio_util::sync::CancellationToken;
