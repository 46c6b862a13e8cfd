use anyhow::{Context, anyhow, bail};
use clap::ArgMatches;
use colored::Colorize;
use linkcrawl_core::crawl::{CrawlOptions, execute_crawl};
use linkcrawl_core::report::{ReportFormat, render_report, save_report};
use linkcrawl_scanner::CancellationToken;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Parse the seed URL, trying to add http:// if needed. The result must have a host.
pub fn parse_seed_url(line: &str) -> Option<Url> {
    let line = line.trim();
    match Url::parse(line) {
        Ok(url) => url.host_str().is_some().then_some(url),
        // Try adding http://
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("http://{}", line))
            .ok()
            .filter(|url| url.host_str().is_some()),
        Err(_) => None,
    }
}

/// Parse a positional count argument. Zero is rejected.
pub fn parse_positive(name: &str, raw: &str) -> anyhow::Result<usize> {
    let value: usize = raw
        .trim()
        .parse()
        .with_context(|| format!("{} must be a positive integer, got '{}'", name, raw))?;
    if value == 0 {
        bail!("{} must be greater than zero", name);
    }
    Ok(value)
}

pub fn build_crawl_options(matches: &ArgMatches) -> anyhow::Result<CrawlOptions> {
    let raw_seed = matches
        .get_one::<String>("SEED_URL")
        .ok_or_else(|| anyhow!("missing seed URL"))?;
    let seed = parse_seed_url(raw_seed).ok_or_else(|| anyhow!("invalid base url: {}", raw_seed))?;

    let max_concurrency = parse_positive(
        "maxConcurrency",
        matches
            .get_one::<String>("MAX_CONCURRENCY")
            .ok_or_else(|| anyhow!("missing maxConcurrency"))?,
    )?;
    let max_pages = parse_positive(
        "maxPages",
        matches
            .get_one::<String>("MAX_PAGES")
            .ok_or_else(|| anyhow!("missing maxPages"))?,
    )?;

    let mut options = CrawlOptions::new(seed.as_str(), max_concurrency, max_pages);
    if let Some(capacity) = matches.get_one::<usize>("queue-capacity") {
        options.queue_capacity = *capacity;
    }
    if let Some(seconds) = matches.get_one::<u64>("timeout") {
        options.timeout = Duration::from_secs(*seconds);
    }
    options.show_progress_bars = !matches.get_flag("quiet");
    Ok(options)
}

pub fn report_format(matches: &ArgMatches) -> ReportFormat {
    matches
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text)
}

/// Logs go to stderr so the report on stdout stays clean.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Cancel `cancel` on SIGINT, or SIGTERM on unix. A second signal exits at once.
pub fn spawn_signal_listener(cancel: CancellationToken) {
    let (sender, receiver) = mpsc::unbounded_channel();
    tokio::spawn(forward_os_signals(sender));
    tokio::spawn(relay_shutdown_signals(receiver, cancel, || {
        std::process::exit(1);
    }));
}

/// The first signal cancels the crawl so its partial report can be printed.
/// The next one calls `force_exit`.
pub async fn relay_shutdown_signals(
    mut signals: mpsc::UnboundedReceiver<&'static str>,
    cancel: CancellationToken,
    force_exit: impl FnOnce(),
) {
    let Some(signal) = signals.recv().await else {
        return;
    };
    eprintln!(
        "\n{} Received {}. Cleaning up... (send it again to quit now)",
        "✗".red().bold(),
        signal
    );
    cancel.cancel();

    if let Some(signal) = signals.recv().await {
        eprintln!("{} Received {} again. Quitting.", "✗".red().bold(), signal);
        force_exit();
    }
}

#[cfg(unix)]
async fn forward_os_signals(sender: mpsc::UnboundedSender<&'static str>) {
    use tokio::signal::unix::{SignalKind, signal};

    let (mut interrupt, mut terminate) =
        match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
            (Ok(interrupt), Ok(terminate)) => (interrupt, terminate),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!("couldn't listen for shutdown signals: {}", e);
                return;
            }
        };

    loop {
        let signal = tokio::select! {
            Some(()) = interrupt.recv() => "interrupt",
            Some(()) = terminate.recv() => "terminated",
            else => return,
        };
        if sender.send(signal).is_err() {
            return;
        }
    }
}

#[cfg(not(unix))]
async fn forward_os_signals(sender: mpsc::UnboundedSender<&'static str>) {
    while tokio::signal::ctrl_c().await.is_ok() {
        if sender.send("interrupt").is_err() {
            return;
        }
    }
}

/// Print the report, or write it to `output` when one is given.
pub fn emit_report(content: &str, output: Option<&str>) -> anyhow::Result<()> {
    match output {
        Some(output) => {
            let expanded = shellexpand::tilde(output);
            let path = Path::new(expanded.as_ref());
            save_report(content, path)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            println!(
                "{} Report saved to {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
        }
        None => print!("{}", content),
    }
    Ok(())
}

/// Run a crawl from parsed arguments. Returns whether the crawl was interrupted.
pub async fn handle_crawl(matches: &ArgMatches, cancel: CancellationToken) -> anyhow::Result<bool> {
    let options = build_crawl_options(matches)?;
    let format = report_format(matches);
    let quiet = matches.get_flag("quiet");

    if !quiet {
        println!("Starting crawl of: {}", options.url.bright_white());
    }

    let seed = options.url.clone();
    let report = execute_crawl(options, cancel, None)
        .await
        .with_context(|| format!("failed to crawl {}", seed))?;
    info!("{} pages in report", report.pages.len());

    let output = matches.get_one::<String>("output").map(String::as_str);
    if output.is_some() {
        // Files get plain text even when stdout is a terminal
        colored::control::set_override(false);
    }
    let content = render_report(&report, format).context("failed to render report")?;
    emit_report(&content, output)?;

    Ok(report.interrupted)
}
