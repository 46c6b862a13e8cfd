pub mod crawl;
pub mod report;

pub use crawl::{CrawlOptions, CrawlProgressCallback, execute_crawl};
pub use report::{ReportFormat, generate_json_report, generate_text_report, render_report, save_report};
