//! Local cache of MTGJSON parquet files.
//!
//! Files are fetched lazily from the CDN on first use and refreshed when
//! `Meta.json` reports a newer data version than the one recorded in
//! `version.txt`.

use reqwest::blocking::Client;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config;
use crate::error::{ForgeError, Result};

const VERSION_FILE: &str = "version.txt";

/// Downloads and tracks the parquet files behind the offline card store.
pub struct CacheManager {
    pub cache_dir: PathBuf,
    /// Never touch the network; only previously cached files are used.
    pub offline: bool,
    timeout: Duration,
    client: Option<Client>,
    remote_ver: Option<String>,
}

impl CacheManager {
    /// Create the cache, creating `cache_dir` (or the platform default) if
    /// needed.
    pub fn new(cache_dir: Option<PathBuf>, offline: bool, timeout: Duration) -> Result<Self> {
        let dir = cache_dir.unwrap_or_else(config::default_cache_dir);
        fs::create_dir_all(&dir)?;
        Ok(Self {
            cache_dir: dir,
            offline,
            timeout,
            client: None,
            remote_ver: None,
        })
    }

    fn client(&mut self) -> Result<Client> {
        if let Some(client) = &self.client {
            return Ok(client.clone());
        }
        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(config::USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        self.client = Some(client.clone());
        Ok(client)
    }

    pub fn local_version(&self) -> Option<String> {
        fs::read_to_string(self.cache_dir.join(VERSION_FILE))
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn save_version(&self, version: &str) {
        if let Err(e) = fs::write(self.cache_dir.join(VERSION_FILE), version) {
            warn!("Could not record MTGJSON version {}: {}", version, e);
        }
    }

    /// Current data version published on the CDN, or `None` when offline or
    /// unreachable. Fetched once per cache instance.
    pub fn remote_version(&mut self) -> Result<Option<String>> {
        if self.remote_ver.is_some() || self.offline {
            return Ok(self.remote_ver.clone());
        }
        let client = self.client()?;
        let data: serde_json::Value = match client.get(config::META_URL).send() {
            Ok(resp) => resp.error_for_status()?.json()?,
            Err(e) => {
                warn!("Could not reach MTGJSON for a version check: {}", e);
                return Ok(None);
            }
        };
        let version = ["data", "meta"]
            .iter()
            .find_map(|k| data.get(k)?.get("version")?.as_str())
            .map(str::to_string);
        self.remote_ver = version.clone();
        Ok(version)
    }

    /// True when nothing is cached yet or the CDN has newer data. An
    /// unreachable CDN counts as fresh.
    pub fn is_stale(&mut self) -> Result<bool> {
        let Some(local) = self.local_version() else {
            return Ok(true);
        };
        Ok(match self.remote_version()? {
            Some(remote) => remote != local,
            None => false,
        })
    }

    /// Download into a temporary file beside `dest` and move it into place,
    /// so a failed transfer never leaves a truncated parquet file.
    fn download(&mut self, filename: &str, dest: &Path) -> Result<()> {
        let url = format!("{}/{}", config::CDN_BASE, filename);
        info!("Downloading {}", url);

        let parent = dest.parent().unwrap_or(&self.cache_dir).to_path_buf();
        fs::create_dir_all(&parent)?;

        let client = self.client()?;
        let bytes = client.get(&url).send()?.error_for_status()?.bytes()?;

        let mut tmp = tempfile::Builder::new()
            .prefix(".download-")
            .tempfile_in(&parent)?;
        tmp.write_all(&bytes)?;
        tmp.flush()?;
        tmp.persist(dest).map_err(|e| ForgeError::Io(e.error))?;
        debug!(bytes = bytes.len(), path = %dest.display(), "Cached file");
        Ok(())
    }

    /// Local path of the parquet file backing `view_name`, downloading it
    /// first if missing or stale.
    pub fn ensure_parquet(&mut self, view_name: &str) -> Result<PathBuf> {
        let files = config::parquet_files();
        let filename = files
            .get(view_name)
            .ok_or_else(|| ForgeError::NotFound(format!("Unknown parquet view: {}", view_name)))?;
        let local_path = self.cache_dir.join(filename);

        if local_path.exists() && (self.offline || !self.is_stale()?) {
            return Ok(local_path);
        }
        if self.offline {
            return Err(ForgeError::NotFound(format!(
                "{} is not cached and offline mode is enabled",
                filename
            )));
        }

        self.download(filename, &local_path)?;
        if let Ok(Some(version)) = self.remote_version() {
            self.save_version(&version);
        }
        Ok(local_path)
    }

    /// Remove every cached file, keeping the directory.
    pub fn clear(&self) -> Result<()> {
        if self.cache_dir.exists() {
            fs::remove_dir_all(&self.cache_dir)?;
        }
        fs::create_dir_all(&self.cache_dir)?;
        Ok(())
    }
}
