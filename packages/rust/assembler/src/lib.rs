//! Book acquisition and read-through caching.
//!
//! The [`BookAssembler`] turns an ordered list of remote HTML fragments into
//! a single plain-text artifact on disk. An artifact is only written when
//! every fragment was fetched and extracted successfully; a failed pass
//! leaves the filesystem untouched, so the presence of the artifact always
//! implies a complete document.

mod fetch;
mod persist;

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, instrument};
use url::Url;

use bookdesk_shared::{BookConfig, BookdeskError, Result};

pub use persist::delimiter;

/// User-Agent string for fragment requests.
const USER_AGENT: &str = concat!("bookdesk/", env!("CARGO_PKG_VERSION"));

/// Acquires a multi-fragment book and caches it as one local text artifact.
///
/// Owns the artifact's lifecycle exclusively: creation, read, and full
/// replacement. Callers serialize invocations; there is no internal locking
/// against concurrent writers on the same location.
#[derive(Debug)]
pub struct BookAssembler {
    client: Client,
    sources: Vec<Url>,
    location: PathBuf,
}

impl BookAssembler {
    /// Create an assembler from the book configuration.
    pub fn new(config: &BookConfig) -> Result<Self> {
        if config.sources.is_empty() {
            return Err(BookdeskError::config("no fragment sources configured"));
        }

        let sources = config
            .sources
            .iter()
            .map(|s| {
                Url::parse(s)
                    .map_err(|e| BookdeskError::config(format!("invalid source URL {s}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .build()
            .map_err(|e| BookdeskError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            sources,
            location: PathBuf::from(&config.artifact_path),
        })
    }

    /// Path of the on-disk artifact.
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Read-through cache: return the artifact, acquiring it on a miss.
    ///
    /// Presence is sufficient — there is no TTL or staleness check. To force
    /// a refresh, delete the artifact or call [`acquire`](Self::acquire).
    #[instrument(skip_all, fields(path = %self.location.display()))]
    pub async fn load(&self) -> Result<String> {
        if self.location.exists() {
            debug!("artifact present, reading from cache");
            return std::fs::read_to_string(&self.location)
                .map_err(|e| BookdeskError::io(&self.location, e));
        }

        self.acquire().await
    }

    /// Fetch every fragment in order, assemble, and persist.
    ///
    /// All-or-nothing: the first fetch error aborts the pass and nothing is
    /// written. A previously cached artifact survives a failed pass.
    #[instrument(skip_all, fields(sources = self.sources.len()))]
    pub async fn acquire(&self) -> Result<String> {
        info!("acquiring book fragments");

        let fragments = fetch::fetch_all(&self.client, &self.sources).await?;
        let content = persist::assemble(&fragments, self.sources.len())?;
        persist::write_artifact(&self.location, &content)?;

        info!(
            chars = content.len(),
            path = %self.location.display(),
            "book artifact saved"
        );

        Ok(content)
    }
}
