// Report generation from a finished crawl

use colored::Colorize;
use linkcrawl_scanner::CrawlReport;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

const BANNER: &str = "==========================";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// One row of the ranked listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedPage {
    pub page: String,
    pub links: usize,
}

pub fn rank_pages(report: &CrawlReport) -> Vec<RankedPage> {
    report
        .ranked_pages()
        .into_iter()
        .map(|(page, links)| RankedPage {
            page: page.to_string(),
            links,
        })
        .collect()
}

pub fn render_report(report: &CrawlReport, format: ReportFormat) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(report)),
        ReportFormat::Json => generate_json_report(report),
    }
}

pub fn generate_text_report(report: &CrawlReport) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "skipped different websites: {}\n",
        report.skipped.len().to_string().yellow()
    ));
    out.push_str(&format!(
        "overflow urls because queue buffer was too small: {}\n",
        report.overflow.len().to_string().yellow()
    ));
    if report.interrupted {
        out.push_str(&format!("{}\n", "crawl interrupted, report is partial".red().bold()));
    }

    out.push_str(BANNER);
    out.push('\n');
    out.push_str(&format!("REPORT for {}\n", report.base_url.bright_white().bold()));
    out.push_str(BANNER);
    out.push('\n');

    for (page, links) in report.ranked_pages() {
        out.push_str(&format!(
            "Found {} internal links to {}\n",
            links.to_string().green(),
            page
        ));
    }

    out
}

pub fn generate_json_report(report: &CrawlReport) -> Result<String, serde_json::Error> {
    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "linkcrawl",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json",
                "interrupted": report.interrupted,
            },
            "target": report.base_url,
            "summary": {
                "total_pages": report.pages.len(),
                "total_links": report.total_links(),
                "skipped": report.skipped.len(),
                "overflow": report.overflow.len(),
            },
            "pages": rank_pages(report),
            "skipped_urls": report.skipped,
            "overflow_urls": report.overflow,
        }
    });

    serde_json::to_string_pretty(&json_report)
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
