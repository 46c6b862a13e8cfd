use crate::error::{Result, ScanError};
use url::{ParseError, Url};

/// Reduce a URL to the key used for deduplication: lower-cased `host[:port]/path`
/// with the scheme, query and fragment dropped and one trailing slash removed.
///
/// Input without a scheme (`test.dev/path`, `test.dev:8080/path`) is read as
/// `host[:port]/path`, so keys normalize to themselves. Ports 80 and 443 are
/// never part of a key.
pub fn normalize_url(raw: &str) -> Result<String> {
    let url = parse_lenient(raw)?;

    let mut key = match url.host_str() {
        Some(host) => match url.port() {
            Some(80 | 443) | None => format!("{}{}", host, url.path()),
            Some(port) => format!("{}:{}{}", host, port, url.path()),
        },
        None => url.path().to_string(),
    };

    if key.ends_with('/') {
        key.pop();
    }

    Ok(key.to_lowercase())
}

fn parse_lenient(raw: &str) -> Result<Url> {
    match Url::parse(raw) {
        // `test.dev:8080/x` parses with `test.dev` as its scheme
        Ok(url) if url.host_str().is_none() && has_port_after_host(raw) => parse_scheme_less(raw),
        Ok(url) => Ok(url),
        Err(ParseError::RelativeUrlWithoutBase) if !raw.starts_with(':') => parse_scheme_less(raw),
        Err(e) => Err(ScanError::InvalidUrl(format!("{}: {}", raw, e))),
    }
}

fn parse_scheme_less(raw: &str) -> Result<Url> {
    Url::parse(&format!("http://{}", raw)).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", raw, e)))
}

fn has_port_after_host(raw: &str) -> bool {
    raw.split_once(':')
        .is_some_and(|(_, rest)| rest.starts_with(|c: char| c.is_ascii_digit()))
}
