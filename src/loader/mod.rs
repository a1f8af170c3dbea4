//! Loading rustdoc JSON for the crate a root path names.

pub mod docs_rs;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rustdoc_types::{Crate, FORMAT_VERSION};
use tracing::{debug, info, warn};

pub use docs_rs::DocsRsClient;

/// Where the rustdoc JSON for a crate comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrateSource {
    /// A JSON file on disk, optionally zstd-compressed (`.zst`).
    Json(PathBuf),
    /// A local package, documented on the spot with the nightly toolchain.
    Manifest(PathBuf),
    /// A published crate, downloaded from docs.rs.
    DocsRs { version: String },
}

pub struct Loader {
    cache_dir: Option<PathBuf>,
}

impl Loader {
    pub fn new(cache_dir: Option<PathBuf>) -> Self {
        Self { cache_dir }
    }

    /// Cache under the platform cache directory, when there is one.
    pub fn with_default_cache() -> Self {
        Self::new(dirs::cache_dir().map(|dir| dir.join("symtree")))
    }

    pub fn load(&self, source: &CrateSource, crate_name: &str) -> Result<Crate> {
        match source {
            CrateSource::Json(path) => load_json_file(path),
            CrateSource::Manifest(manifest) => {
                info!("building rustdoc JSON for {}", manifest.display());
                let json_path = rustdoc_json::Builder::default()
                    .toolchain("nightly".to_string())
                    .manifest_path(manifest)
                    .build()
                    .with_context(|| {
                        format!("failed to build rustdoc JSON for {}", manifest.display())
                    })?;
                load_json_file(&json_path)
            }
            CrateSource::DocsRs { version } => {
                let client = DocsRsClient::new(self.cache_dir.clone())?;
                client.fetch(crate_name, version)
            }
        }
    }
}

pub fn load_json_file(path: &Path) -> Result<Crate> {
    debug!("reading {}", path.display());
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let bytes = if path.extension().is_some_and(|ext| ext == "zst") {
        zstd::stream::decode_all(raw.as_slice())
            .with_context(|| format!("failed to decompress {}", path.display()))?
    } else {
        raw
    };
    parse_crate(&bytes).with_context(|| format!("invalid rustdoc JSON in {}", path.display()))
}

pub fn parse_crate(bytes: &[u8]) -> Result<Crate> {
    let crate_data: Crate = serde_json::from_slice(bytes)?;
    if crate_data.format_version != FORMAT_VERSION {
        warn!(
            "rustdoc JSON format {} differs from the supported format {}",
            crate_data.format_version, FORMAT_VERSION
        );
    }
    Ok(crate_data)
}
