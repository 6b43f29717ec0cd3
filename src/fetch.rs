//! Byte-stream providers for the remote schema CSV.

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{Context, Result, anyhow};
use log::debug;

pub const ECS_CSV_URL: &str =
    "https://raw.githubusercontent.com/elastic/ecs/refs/heads/main/generated/csv/fields.csv";

pub trait SchemaSource {
    /// Human readable origin for diagnostics.
    fn label(&self) -> String;

    fn fetch(&self) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl SchemaSource for HttpSource {
    fn label(&self) -> String {
        self.url.clone()
    }

    fn fetch(&self) -> Result<Vec<u8>> {
        debug!("GET {}", self.url);
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .context("Building HTTP client")?;
        let response = client
            .get(&self.url)
            .send()
            .with_context(|| format!("Requesting {}", self.url))?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("{} responded with status {status}", self.url));
        }
        let body = response
            .bytes()
            .with_context(|| format!("Reading response body from {}", self.url))?;
        debug!("Downloaded {} byte(s) from {}", body.len(), self.url);
        Ok(body.to_vec())
    }
}

#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SchemaSource for FileSource {
    fn label(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<Vec<u8>> {
        fs::read(&self.path).with_context(|| format!("Reading {:?}", self.path))
    }
}

/// Chooses a source for `location`: `http(s)://` goes over the network,
/// `file://` and bare paths are read from disk.
pub fn source_for(location: &str) -> Box<dyn SchemaSource> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Box::new(HttpSource::new(location))
    } else if let Some(path) = location.strip_prefix("file://") {
        Box::new(FileSource::new(path))
    } else {
        Box::new(FileSource::new(location))
    }
}
