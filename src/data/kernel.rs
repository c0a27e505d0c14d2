//! Kernel resolution and download
//!
//! Resolution is split in two: `KernelSearch::plan` builds the ordered list
//! of candidates without touching the filesystem, and
//! `KernelSearch::resolve_with` probes those candidates and falls back to a
//! download through a `KernelSource`.

use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info, warn};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Environment variable naming an explicit kernel file
pub const EPHEMERIS_PATH_ENV: &str = "VEDIC_EPHEMERIS_PATH";

/// Kernel requested when the caller has no preference
pub const DEFAULT_EPHEMERIS_NAME: &str = "de440s.bsp";

/// Fallback kernel names, most accurate first
pub const KERNEL_CANDIDATE_NAMES: [&str; 3] = ["de440s.bsp", "de440.bsp", "de421.bsp"];

/// Public kernel fetched when no local candidate exists
pub const JPL_DE421_URL: &str = "https://ssd.jpl.nasa.gov/ftp/eph/planets/bsp/de421.bsp";

/// File name the downloaded kernel is stored under
pub const DOWNLOAD_NAME: &str = "de421.bsp";

/// Error type for kernel resolution
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("{} is set to {path:?}, which does not exist", EPHEMERIS_PATH_ENV)]
    Configuration { path: PathBuf },

    #[error("Failed to acquire ephemeris kernel: {0}")]
    Acquisition(String),

    #[error("I/O error on {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

type Result<T> = std::result::Result<T, KernelError>;

/// Ordered description of where a kernel will be looked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPlan {
    /// The environment names the kernel; nothing else is consulted
    Override(PathBuf),
    /// Probe each path in order, then download
    Search {
        probes: Vec<PathBuf>,
        download_url: String,
        download_target: PathBuf,
    },
}

/// Something that can stream a kernel from a URL
pub trait KernelSource {
    fn open(&self, url: &str) -> Result<Box<dyn Read>>;
}

/// Blocking HTTPS source
#[derive(Debug, Clone, Default)]
pub struct HttpSource {
    /// Overall request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl KernelSource for HttpSource {
    fn open(&self, url: &str) -> Result<Box<dyn Read>> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| KernelError::Acquisition(format!("Failed to create HTTP client: {}", e)))?;

        let response = client
            .get(url)
            .send()
            .map_err(|e| KernelError::Acquisition(format!("Failed to download {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(KernelError::Acquisition(format!(
                "Failed to download {}, status: {}",
                url,
                response.status()
            )));
        }

        Ok(Box::new(response))
    }
}

/// Inputs to kernel resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelSearch {
    /// Explicit kernel file; when set it is the only candidate
    pub env_override: Option<PathBuf>,
    /// Directories searched before the caches
    pub extra_search_paths: Vec<PathBuf>,
    /// Per-user cache, also the download target
    pub user_cache_dir: PathBuf,
    /// Cache shipped alongside the crate sources
    pub bundled_dir: PathBuf,
    /// Where the fallback kernel is downloaded from
    pub download_url: String,
}

impl KernelSearch {
    /// Default configuration, honoring `VEDIC_EPHEMERIS_PATH`
    pub fn from_env() -> Self {
        let env_override = env::var(EPHEMERIS_PATH_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(|value| expand_home(value.trim()));

        Self {
            env_override,
            extra_search_paths: Vec::new(),
            user_cache_dir: default_user_cache_dir(),
            bundled_dir: Path::new(env!("CARGO_MANIFEST_DIR"))
                .join("data")
                .join("ephemeris"),
            download_url: JPL_DE421_URL.to_string(),
        }
    }

    /// Add directories to search ahead of the caches
    pub fn with_extra_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.extra_search_paths
            .extend(paths.into_iter().map(Into::into));
        self
    }

    /// Build the ordered candidate list for `preferred`
    pub fn plan(&self, preferred: &str) -> SearchPlan {
        if let Some(path) = &self.env_override {
            return SearchPlan::Override(path.clone());
        }

        let mut names: Vec<&str> = vec![preferred];
        for name in KERNEL_CANDIDATE_NAMES {
            if !names.contains(&name) {
                names.push(name);
            }
        }

        let dirs = self
            .extra_search_paths
            .iter()
            .chain([&self.user_cache_dir, &self.bundled_dir]);

        let mut probes: Vec<PathBuf> = Vec::new();
        for dir in dirs {
            for name in &names {
                let candidate = dir.join(name);
                if !probes.contains(&candidate) {
                    probes.push(candidate);
                }
            }
        }

        SearchPlan::Search {
            probes,
            download_url: self.download_url.clone(),
            download_target: self.user_cache_dir.join(DOWNLOAD_NAME),
        }
    }

    /// Resolve a kernel, downloading over HTTPS if needed
    pub fn resolve(&self, preferred: &str) -> Result<PathBuf> {
        self.resolve_with(preferred, &HttpSource::default())
    }

    /// Resolve a kernel using `source` for any download
    pub fn resolve_with(&self, preferred: &str, source: &dyn KernelSource) -> Result<PathBuf> {
        let (probes, download_url, download_target) = match self.plan(preferred) {
            SearchPlan::Override(path) => {
                return if path.exists() {
                    info!("Using ephemeris kernel from {}: {}", EPHEMERIS_PATH_ENV, path.display());
                    Ok(path)
                } else {
                    Err(KernelError::Configuration { path })
                };
            }
            SearchPlan::Search {
                probes,
                download_url,
                download_target,
            } => (probes, download_url, download_target),
        };

        fs::create_dir_all(&self.user_cache_dir).map_err(|source| KernelError::Io {
            path: self.user_cache_dir.clone(),
            source,
        })?;

        for candidate in probes {
            debug!("Probing {}", candidate.display());
            if candidate.is_file() {
                info!("Using ephemeris kernel {}", candidate.display());
                return Ok(candidate);
            }
        }

        download_kernel(source, &download_url, &download_target)
    }
}

/// Resolve a kernel with the default configuration
///
/// `extra_search_paths` are searched after the environment override and
/// before the cache directories.
pub fn ensure_kernel_available(
    preferred_name: &str,
    extra_search_paths: &[PathBuf],
) -> Result<PathBuf> {
    KernelSearch::from_env()
        .with_extra_paths(extra_search_paths.iter().cloned())
        .resolve(preferred_name)
}

/// Expand a leading `~` to the home directory
pub fn expand_home(path: &str) -> PathBuf {
    let home = dirs::home_dir();
    match (path, home) {
        ("~", Some(home)) => home,
        (p, Some(home)) if p.starts_with("~/") => home.join(&p[2..]),
        (p, _) => PathBuf::from(p),
    }
}

fn default_user_cache_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cache")
        .join("vedic-ephemeris")
}

/// Stream `url` into `target`, staging in a temp file in the same directory
fn download_kernel(source: &dyn KernelSource, url: &str, target: &Path) -> Result<PathBuf> {
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    info!("Downloading {} to {}", url, target.display());

    let mut reader = source.open(url).map_err(|e| {
        warn!("Kernel download failed: {}", e);
        e
    })?;

    // Dropping the temp file on any early return deletes it
    let mut staged = NamedTempFile::new_in(dir)
        .map_err(|e| KernelError::Acquisition(format!("Failed to stage download in {}: {}", dir.display(), e)))?;

    let bytes = io::copy(&mut reader, &mut staged).map_err(|e| {
        warn!("Kernel download from {} interrupted: {}", url, e);
        KernelError::Acquisition(format!("Failed to read {}: {}", url, e))
    })?;
    if bytes == 0 {
        warn!("Kernel download from {} returned no data", url);
        return Err(KernelError::Acquisition(format!("{} returned an empty body", url)));
    }

    staged
        .as_file()
        .sync_all()
        .map_err(|e| KernelError::Acquisition(format!("Failed to flush download: {}", e)))?;
    staged.persist(target).map_err(|e| {
        warn!("Could not move downloaded kernel into place: {}", e.error);
        KernelError::Acquisition(format!(
            "Failed to store kernel at {}: {}",
            target.display(),
            e.error
        ))
    })?;

    info!("Downloaded {} bytes to {}", bytes, target.display());
    Ok(target.to_path_buf())
}
