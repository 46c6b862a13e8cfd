use clap::error::ErrorKind;
use colored::Colorize;
use linkcrawl::command_argument_builder;
use linkcrawl::handlers::{handle_crawl, init_logging, spawn_signal_listener};
use linkcrawl_scanner::CancellationToken;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let matches = match command_argument_builder().try_get_matches() {
        Ok(matches) => matches,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            // Usage errors exit with 1 rather than clap's default of 2
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    init_logging(matches.get_flag("verbose"));

    let cancel = CancellationToken::new();
    spawn_signal_listener(cancel.clone());

    match handle_crawl(&matches, cancel).await {
        Ok(false) => ExitCode::SUCCESS,
        Ok(true) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
