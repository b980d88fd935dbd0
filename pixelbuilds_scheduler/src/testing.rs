//! In-memory catalog and release sources for unit tests.

use async_trait::async_trait;
use pixelbuilds_core::{
    Asset, Device, DeviceCatalog, ExporterError, Release, ReleaseSource, Result, Source,
    SourceFetch,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn release(name: &str, assets: &[(&str, u64)]) -> Release {
    Release::new(
        name,
        assets
            .iter()
            .map(|(name, count)| Asset::new(*name, *count))
            .collect(),
    )
}

#[derive(Clone, Default)]
pub struct StaticCatalog {
    devices: Vec<Device>,
    calls: Arc<AtomicUsize>,
}

impl StaticCatalog {
    pub fn new(codenames: &[&str]) -> Self {
        Self {
            devices: codenames.iter().map(|c| Device::new(*c)).collect(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeviceCatalog for StaticCatalog {
    async fn devices(&self) -> Result<Vec<Device>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.devices.clone())
    }
}

pub struct FailingCatalog;

#[async_trait]
impl DeviceCatalog for FailingCatalog {
    async fn devices(&self) -> Result<Vec<Device>> {
        Err(ExporterError::CatalogStatus {
            url: "memory://devices.json".to_string(),
            status: 503,
        })
    }
}

/// Answers with fixed releases per codename; unknown codenames get 404.
pub struct StaticSource {
    source: Source,
    responses: HashMap<String, SourceFetch>,
}

impl StaticSource {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            responses: HashMap::new(),
        }
    }

    pub fn with_releases(mut self, codename: &str, releases: Vec<Release>) -> Self {
        self.responses
            .insert(codename.to_string(), SourceFetch::Releases(releases));
        self
    }

    pub fn with_status(mut self, codename: &str, status: u16) -> Self {
        self.responses
            .insert(codename.to_string(), SourceFetch::Unavailable { status });
        self
    }
}

#[async_trait]
impl ReleaseSource for StaticSource {
    fn source(&self) -> Source {
        self.source
    }

    async fn fetch_releases(&self, codename: &str) -> Result<SourceFetch> {
        Ok(self
            .responses
            .get(codename)
            .cloned()
            .unwrap_or(SourceFetch::Unavailable { status: 404 }))
    }
}
