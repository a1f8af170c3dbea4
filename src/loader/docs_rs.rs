use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use rustdoc_types::{Crate, FORMAT_VERSION};
use tracing::{debug, info, warn};

use crate::loader::parse_crate;

const DOCS_RS: &str = "https://docs.rs";

/// Downloads rustdoc JSON from docs.rs, caching pinned versions on disk.
pub struct DocsRsClient {
    client: Client,
    cache_dir: Option<PathBuf>,
}

impl DocsRsClient {
    pub fn new(cache_dir: Option<PathBuf>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("symtree/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to create HTTP client")?;
        Ok(Self { client, cache_dir })
    }

    pub fn url(crate_name: &str, version: &str) -> String {
        format!("{}/crate/{}/{}/json/{}", DOCS_RS, crate_name, version, FORMAT_VERSION)
    }

    /// Cache file for a pinned version. `latest` moves, so it is never cached.
    pub fn cache_path(&self, crate_name: &str, version: &str) -> Option<PathBuf> {
        if version == "latest" {
            return None;
        }
        self.cache_dir.as_ref().map(|dir| {
            dir.join(format!("{}-{}-v{}.json", crate_name, version, FORMAT_VERSION))
        })
    }

    /// The crate at `version`, from the cache when a valid copy is there.
    pub fn fetch(&self, crate_name: &str, version: &str) -> Result<Crate> {
        if let Some(crate_data) = self.cached(crate_name, version) {
            return Ok(crate_data);
        }

        let url = Self::url(crate_name, version);
        info!("downloading {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("request to {} failed", url))?
            .error_for_status()
            .with_context(|| {
                format!("docs.rs has no rustdoc JSON for {} {}", crate_name, version)
            })?;
        let body = response.bytes().context("failed to read docs.rs response")?;
        let bytes = decode_body(&body)?;
        let crate_data = parse_crate(&bytes)
            .with_context(|| format!("invalid rustdoc JSON for {} {}", crate_name, version))?;

        if let Some(path) = self.cache_path(crate_name, version) {
            if let Err(err) = store(&path, &bytes) {
                warn!("could not cache {}: {:#}", path.display(), err);
            }
        }
        Ok(crate_data)
    }

    /// A cached copy that still parses. Anything else is downloaded again.
    pub fn cached(&self, crate_name: &str, version: &str) -> Option<Crate> {
        let path = self.cache_path(crate_name, version)?;
        let bytes = fs::read(&path).ok()?;
        match parse_crate(&bytes) {
            Ok(crate_data) => {
                debug!("using cached {}", path.display());
                Some(crate_data)
            }
            Err(err) => {
                warn!("ignoring unreadable cache file {}: {:#}", path.display(), err);
                None
            }
        }
    }
}

/// docs.rs serves zstd; plain JSON passes through untouched.
pub fn decode_body(body: &[u8]) -> Result<Vec<u8>> {
    const ZSTD_MAGIC: [u8; 4] = [0x28, 0xb5, 0x2f, 0xfd];
    if body.starts_with(&ZSTD_MAGIC) {
        zstd::stream::decode_all(body).context("failed to decompress docs.rs response")
    } else {
        Ok(body.to_vec())
    }
}

fn store(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    Ok(())
}
