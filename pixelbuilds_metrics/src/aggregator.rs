use crate::registry::{DownloadGauges, LabelTuple, Rollup};
use pixelbuilds_core::{Release, ReleaseNaming, Source, SourceFetch};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Releases fetched for one device, one entry per backend.
#[derive(Debug, Clone)]
pub struct DeviceReleases {
    pub codename: String,
    pub fetches: Vec<(Source, SourceFetch)>,
}

impl DeviceReleases {
    pub fn new(codename: impl Into<String>) -> Self {
        Self {
            codename: codename.into(),
            fetches: Vec::new(),
        }
    }

    pub fn with_fetch(mut self, source: Source, fetch: SourceFetch) -> Self {
        self.fetches.push((source, fetch));
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateSummary {
    pub assets_counted: usize,
    pub assets_skipped: usize,
    pub downloads: u64,
}

impl AggregateSummary {
    pub fn merge(&mut self, other: &AggregateSummary) {
        self.assets_counted += other.assets_counted;
        self.assets_skipped += other.assets_skipped;
        self.downloads += other.downloads;
    }
}

/// Folds release lists into the gauge registry.
///
/// Rollups are running sums across the cycle; per-release series are
/// overwritten with the latest matching asset's count.
pub struct Aggregator<'a> {
    gauges: &'a DownloadGauges,
    naming: &'a ReleaseNaming,
}

impl<'a> Aggregator<'a> {
    pub fn new(gauges: &'a DownloadGauges, naming: &'a ReleaseNaming) -> Self {
        Self { gauges, naming }
    }

    pub fn aggregate_device(&self, device: &DeviceReleases) -> AggregateSummary {
        let mut summary = AggregateSummary::default();

        for (source, fetch) in &device.fetches {
            let source_summary = self.aggregate_source(&device.codename, *source, fetch.releases());
            summary.merge(&source_summary);
        }

        summary
    }

    pub fn aggregate_source(
        &self,
        codename: &str,
        source: Source,
        releases: &[Release],
    ) -> AggregateSummary {
        let mut summary = AggregateSummary::default();

        for release in releases {
            for asset in &release.assets {
                if !self.naming.is_eligible(&asset.name) {
                    trace!("Skipping asset {} of {}", asset.name, release.name);
                    summary.assets_skipped += 1;
                    continue;
                }

                self.gauges.increment(Rollup::Total, asset.download_count);
                self.gauges
                    .increment(Rollup::Source(source), asset.download_count);

                let release_label = self.naming.release_label(&release.name, codename);
                self.gauges.set(
                    &LabelTuple::new(release_label, codename, source),
                    asset.download_count,
                );

                summary.assets_counted += 1;
                summary.downloads += asset.download_count;
            }
        }

        summary
    }
}
