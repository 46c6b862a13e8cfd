use crate::error::{Result, ScanError};
use url::Url;

/// The seed of a crawl and the host boundary it must stay within.
#[derive(Debug, Clone)]
pub struct CrawlTarget {
    base: Url,
}

impl CrawlTarget {
    pub fn parse(raw: &str) -> Result<Self> {
        let base = Url::parse(raw).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", raw, e)))?;
        Self::from_url(base)
    }

    pub fn from_url(base: Url) -> Result<Self> {
        if base.host_str().is_none() {
            return Err(ScanError::InvalidUrl(format!("{} has no host", base)));
        }
        Ok(Self { base })
    }

    pub fn as_str(&self) -> &str {
        self.base.as_str()
    }

    /// Hostname without port. Already lower-cased by URL parsing.
    pub fn host(&self) -> &str {
        self.base.host_str().unwrap_or_default()
    }

    /// True when `candidate` lives on a different hostname than the target.
    /// Ports and schemes are not part of the comparison.
    pub fn is_foreign(&self, candidate: &str) -> Result<bool> {
        let parsed = Url::parse(candidate)
            .map_err(|_| ScanError::InvalidUrl(format!("could not parse {} as url", candidate)))?;

        Ok(parsed.host_str().unwrap_or_default() != self.host())
    }
}
