//! Reads a dataset document from a local path or an HTTP(S) URL.

use crate::domain::DomainError;
use reqwest::Client;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    File(PathBuf),
    Url(String),
}

impl Location {
    /// URLs are kept as-is; relative paths are joined onto `base_dir`.
    pub fn resolve(reference: &str, base_dir: &Path) -> Self {
        let reference = reference.trim();
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return Location::Url(reference.to_string());
        }
        let path = Path::new(reference);
        if path.is_absolute() {
            Location::File(path.to_path_buf())
        } else {
            Location::File(base_dir.join(path))
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::File(p) => write!(f, "{}", p.display()),
            Location::Url(u) => f.write_str(u),
        }
    }
}

/// Whole document as text. Any I/O failure or non-success status is `SourceUnavailable`.
pub async fn read_text(location: &Location, client: &Client) -> Result<String, DomainError> {
    match location {
        Location::File(path) => fs::read_to_string(path)
            .await
            .map_err(|e| DomainError::SourceUnavailable(format!("{}: {}", path.display(), e))),
        Location::Url(url) => {
            let res = client
                .get(url)
                .timeout(HTTP_TIMEOUT)
                .send()
                .await
                .map_err(|e| DomainError::SourceUnavailable(format!("{}: request failed: {}", url, e)))?;
            if !res.status().is_success() {
                return Err(DomainError::SourceUnavailable(format!(
                    "{}: HTTP {}",
                    url,
                    res.status()
                )));
            }
            res.text()
                .await
                .map_err(|e| DomainError::SourceUnavailable(format!("{}: read body: {}", url, e)))
        }
    }
}
