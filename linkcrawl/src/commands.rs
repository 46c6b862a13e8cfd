use clap::arg;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("linkcrawl")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("linkcrawl")
        .about("Crawl a single website breadth-first and report how often each page is linked")
        .styles(CLAP_STYLING)
        .arg(
            arg!(<SEED_URL>)
                .help("The URL to start crawling from. Links to other hosts are not followed."),
        )
        .arg(
            arg!(<MAX_CONCURRENCY>)
                .help("The number of async workers fetching pages at the same time"),
        )
        .arg(arg!(<MAX_PAGES>).help("Stop fetching new pages once this many have been visited"))
        .arg(arg!(-q --"quiet" "Suppress the progress spinner and non-essential output").required(false))
        .arg(
            arg!(-v --"verbose" "Log crawl progress to stderr (overridden by RUST_LOG)")
                .required(false),
        )
        .arg(
            arg!(--"queue-capacity" <SIZE>)
                .required(false)
                .help("How many discovered URLs may wait in the queue before new ones overflow")
                .value_parser(clap::value_parser!(usize))
                .default_value("1000"),
        )
        .arg(
            arg!(--"timeout" <SECONDS>)
                .required(false)
                .help("Request timeout in seconds")
                .value_parser(clap::value_parser!(u64).range(1..))
                .default_value("3"),
        )
        .arg(
            arg!(-f --"format" <FORMAT>)
                .required(false)
                .help("Report format: text, json")
                .value_parser(["text", "json"])
                .default_value("text"),
        )
        .arg(
            arg!(-o --"output" <PATH>)
                .required(false)
                .help("Save report to file (default: display to screen)"),
        )
}
