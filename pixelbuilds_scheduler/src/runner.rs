use crate::config::{humantime_serde, ExporterConfig};
use chrono::{DateTime, Utc};
use futures::{stream, StreamExt};
use pixelbuilds_core::{
    build_http_client, Device, DeviceCatalog, DynReleaseSource, HttpCatalog, HttpReleaseSource,
    ReleaseNaming, Result, Source, SourceFetch,
};
use pixelbuilds_metrics::{AggregateSummary, Aggregator, DeviceReleases, DownloadGauges};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Runs one collection cycle: catalog, per-device release fetches, aggregation.
pub struct CycleRunner {
    catalog: Arc<dyn DeviceCatalog>,
    sources: Vec<DynReleaseSource>,
    gauges: DownloadGauges,
    naming: ReleaseNaming,
    device_concurrency: usize,
}

impl CycleRunner {
    pub fn new(
        catalog: Arc<dyn DeviceCatalog>,
        sources: Vec<DynReleaseSource>,
        gauges: DownloadGauges,
        naming: ReleaseNaming,
    ) -> Self {
        Self {
            catalog,
            sources,
            gauges,
            naming,
            device_concurrency: 1,
        }
    }

    /// Builds the HTTP catalog and the GitHub and Gitea clients described by `config`.
    pub fn from_config(config: &ExporterConfig, gauges: DownloadGauges) -> Result<Self> {
        let client = build_http_client(&config.user_agent, config.request_timeout)?;

        let catalog = Arc::new(HttpCatalog::new(client.clone(), &config.catalog_url));
        let sources: Vec<DynReleaseSource> = vec![
            Arc::new(HttpReleaseSource::github(client.clone(), &config.github_api_base)),
            Arc::new(HttpReleaseSource::gitea(client, &config.gitea_api_base)),
        ];

        Ok(Self::new(catalog, sources, gauges, config.naming.clone())
            .with_device_concurrency(config.device_concurrency))
    }

    pub fn with_device_concurrency(mut self, concurrency: usize) -> Self {
        self.device_concurrency = concurrency.max(1);
        self
    }

    pub fn gauges(&self) -> &DownloadGauges {
        &self.gauges
    }

    pub async fn fetch_devices(&self) -> Result<Vec<Device>> {
        let _timer = self.gauges.start_timer("get_devices");
        self.catalog.devices().await
    }

    /// Queries every source for one device, one after another.
    pub async fn fetch_releases(&self, codename: &str) -> Result<DeviceReleases> {
        let _timer = self.gauges.start_timer("get_releases");
        let mut device = DeviceReleases::new(codename);

        for source in &self.sources {
            let fetch = source.fetch_releases(codename).await?;
            device = device.with_fetch(source.source(), fetch);
        }

        Ok(device)
    }

    pub async fn run_cycle(&self) -> Result<CycleReport> {
        info!("Getting metrics");

        let start = Instant::now();
        let mut report = CycleReport::new(Utc::now());

        self.gauges.reset_cycle();

        let devices = self.fetch_devices().await?;
        let aggregator = Aggregator::new(&self.gauges, &self.naming);

        // Fetches may overlap, but results arrive in catalog order and
        // registry writes happen here, one device at a time.
        let codenames: Vec<String> = devices.iter().map(|d| d.codename.clone()).collect();
        let mut fetched = stream::iter(codenames)
            .map(|codename| async move { self.fetch_releases(&codename).await })
            .buffered(self.device_concurrency);

        while let Some(device) = fetched.next().await {
            let device = device?;

            for (source, fetch) in &device.fetches {
                if let SourceFetch::Unavailable { status } = fetch {
                    self.gauges.record_unavailable(*source);
                    report.unavailable.push(UnavailableSource {
                        codename: device.codename.clone(),
                        source: *source,
                        status: *status,
                    });
                }
                *report.releases.entry(*source).or_insert(0) += fetch.releases().len();
            }

            let summary = aggregator.aggregate_device(&device);
            debug!(
                "{}: {} assets counted, {} downloads",
                device.codename, summary.assets_counted, summary.downloads
            );
            report.summary.merge(&summary);
        }

        report.devices = devices.len();
        report.duration = start.elapsed();
        self.gauges.record_cycle(report.devices, Utc::now());

        if !report.unavailable.is_empty() {
            warn!(
                "{} source requests returned no data this cycle",
                report.unavailable.len()
            );
        }

        info!(
            "Collected {} downloads across {} devices in {:?}",
            report.summary.downloads, report.devices, report.duration
        );

        Ok(report)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnavailableSource {
    pub codename: String,
    pub source: Source,
    pub status: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
    pub devices: usize,
    pub releases: HashMap<Source, usize>,
    pub unavailable: Vec<UnavailableSource>,
    pub summary: AggregateSummary,
}

impl CycleReport {
    fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            duration: Duration::ZERO,
            devices: 0,
            releases: HashMap::new(),
            unavailable: Vec::new(),
            summary: AggregateSummary::default(),
        }
    }

    pub fn release_count(&self, source: Source) -> usize {
        self.releases.get(&source).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{release, FailingCatalog, StaticCatalog, StaticSource};
    use pixelbuilds_core::ExporterError;
    use pixelbuilds_metrics::{LabelTuple, Rollup};

    fn runner(catalog: StaticCatalog, github: StaticSource, gitea: StaticSource) -> CycleRunner {
        CycleRunner::new(
            Arc::new(catalog),
            vec![Arc::new(github), Arc::new(gitea)],
            DownloadGauges::with_defaults().unwrap(),
            ReleaseNaming::default(),
        )
    }

    #[tokio::test]
    async fn test_single_device_cycle() {
        let runner = runner(
            StaticCatalog::new(&["angler"]),
            StaticSource::new(Source::Github).with_releases(
                "angler",
                vec![release("PixelBuilds_angler-2024.01-release", &[("PixelBuilds_angler-2024.01.zip", 42)])],
            ),
            StaticSource::new(Source::Gitea).with_status("angler", 500),
        );

        let report = runner.run_cycle().await.unwrap();
        let gauges = runner.gauges();

        assert_eq!(
            gauges.value(&LabelTuple::new("2024.01", "angler", Source::Github)),
            Some(42)
        );
        assert_eq!(gauges.rollup_value(Rollup::Total), 42);
        assert_eq!(gauges.rollup_value(Rollup::Source(Source::Gitea)), 0);

        assert_eq!(report.devices, 1);
        assert_eq!(report.release_count(Source::Github), 1);
        assert_eq!(report.release_count(Source::Gitea), 0);
        assert_eq!(report.unavailable.len(), 1);
        assert_eq!(report.unavailable[0].status, 500);
        assert_eq!(gauges.unavailable_count(Source::Gitea), 1);
        assert_eq!(gauges.func_call_count("get_devices"), 1);
        assert_eq!(gauges.func_call_count("get_releases"), 1);
        assert!(gauges.last_cycle().is_some());
    }

    #[tokio::test]
    async fn test_catalog_failure_aborts_cycle() {
        let runner = CycleRunner::new(
            Arc::new(FailingCatalog),
            vec![Arc::new(StaticSource::new(Source::Github))],
            DownloadGauges::with_defaults().unwrap(),
            ReleaseNaming::default(),
        );

        let err = runner.run_cycle().await.unwrap_err();
        assert!(matches!(err, ExporterError::CatalogStatus { .. }));
        assert!(runner.gauges().last_cycle().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_fetch_matches_sequential() {
        let make = || {
            runner(
                StaticCatalog::new(&["angler", "oriole", "raven"]),
                StaticSource::new(Source::Github)
                    .with_releases(
                        "angler",
                        vec![release("PixelBuilds_angler-2024.01-release", &[("PixelBuilds_angler-2024.01.zip", 42)])],
                    )
                    .with_releases(
                        "raven",
                        vec![release("PixelBuilds_raven-2024.01-release", &[("PixelBuilds_raven-2024.01.zip", 3)])],
                    ),
                StaticSource::new(Source::Gitea).with_releases(
                    "oriole",
                    vec![release("PixelBuilds_oriole-2024.01-release", &[("PixelBuilds_oriole-2024.01.zip", 11)])],
                ),
            )
        };

        let sequential = make();
        let concurrent = make().with_device_concurrency(3);

        let a = sequential.run_cycle().await.unwrap();
        let b = concurrent.run_cycle().await.unwrap();

        assert_eq!(a.summary, b.summary);
        for rollup in Rollup::ALL {
            assert_eq!(
                sequential.gauges().rollup_value(rollup),
                concurrent.gauges().rollup_value(rollup)
            );
        }
        assert_eq!(concurrent.gauges().rollup_value(Rollup::Total), 56);
    }

    #[test]
    fn test_report_serializes() {
        let mut report = CycleReport::new(Utc::now());
        report.duration = Duration::from_millis(1500);
        report.releases.insert(Source::Github, 2);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["duration"], "1s 500ms");
        assert_eq!(json["releases"]["github"], 2);
    }
}
