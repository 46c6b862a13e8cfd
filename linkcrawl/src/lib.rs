pub mod commands;

// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

pub use commands::{CLAP_STYLING, command_argument_builder};
pub use handlers::{build_crawl_options, handle_crawl, init_logging, parse_positive, parse_seed_url};

// Re-export crawl functionality from linkcrawl-core
pub use linkcrawl_core::crawl::{CrawlOptions, execute_crawl};
