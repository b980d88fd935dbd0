//! Process-wide gauge state.
//!
//! [`DownloadGauges`] is cheap to clone; every clone points at the same
//! underlying collectors, so the cycle driver writes through one handle
//! while the scrape endpoint reads through another. Each individual
//! gauge update is a single atomic store or add.

use chrono::{DateTime, Utc};
use pixelbuilds_core::{Result, Source};
use prometheus::{
    HistogramOpts, HistogramTimer, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

pub const DEFAULT_NAMESPACE: &str = "pixelbuilds";

const DOWNLOAD_LABELS: [&str; 3] = ["release", "codename", "source"];

/// Key of one published download observation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LabelTuple {
    pub release: String,
    pub codename: String,
    pub source: String,
}

impl LabelTuple {
    pub fn new(release: impl Into<String>, codename: impl Into<String>, source: Source) -> Self {
        Self {
            release: release.into(),
            codename: codename.into(),
            source: source.label().to_string(),
        }
    }

    fn values(&self) -> [&str; 3] {
        [&self.release, &self.codename, &self.source]
    }
}

/// Aggregate download values published alongside the per-release series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rollup {
    /// Sum over every counted asset
    Total,

    /// Sum over every counted asset from one backend
    Source(Source),
}

impl Rollup {
    pub const ALL: [Rollup; 3] = [
        Rollup::Total,
        Rollup::Source(Source::Github),
        Rollup::Source(Source::Gitea),
    ];

    /// Rollups use empty release and codename labels.
    pub fn label_tuple(&self) -> LabelTuple {
        let source = match self {
            Rollup::Total => String::new(),
            Rollup::Source(source) => source.label().to_string(),
        };

        LabelTuple {
            release: String::new(),
            codename: String::new(),
            source,
        }
    }
}

#[derive(Clone)]
pub struct DownloadGauges {
    downloads: IntGaugeVec,
    func_processing: HistogramVec,
    source_unavailable: IntCounterVec,
    last_cycle_timestamp: IntGauge,
    cycle_devices: IntGauge,
    published: Arc<Mutex<HashSet<LabelTuple>>>,
    registry: Arc<Registry>,
}

impl DownloadGauges {
    pub fn new(namespace: &str) -> Result<Self> {
        let registry = Registry::new();

        let downloads = IntGaugeVec::new(
            Opts::new("downloads", "Total downloads for release").namespace(namespace),
            &DOWNLOAD_LABELS,
        )?;
        registry.register(Box::new(downloads.clone()))?;

        let func_processing = HistogramVec::new(
            HistogramOpts::new("func_processing_seconds", "Time spent processing functions"),
            &["func"],
        )?;
        registry.register(Box::new(func_processing.clone()))?;

        let source_unavailable = IntCounterVec::new(
            Opts::new(
                "source_unavailable_total",
                "Release requests answered with a non-success status",
            )
            .namespace(namespace),
            &["source"],
        )?;
        registry.register(Box::new(source_unavailable.clone()))?;

        let last_cycle_timestamp = IntGauge::with_opts(
            Opts::new(
                "last_cycle_timestamp_seconds",
                "Unix time the last collection cycle completed",
            )
            .namespace(namespace),
        )?;
        registry.register(Box::new(last_cycle_timestamp.clone()))?;

        let cycle_devices = IntGauge::with_opts(
            Opts::new("cycle_devices", "Devices processed in the last collection cycle")
                .namespace(namespace),
        )?;
        registry.register(Box::new(cycle_devices.clone()))?;

        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        let gauges = Self {
            downloads,
            func_processing,
            source_unavailable,
            last_cycle_timestamp,
            cycle_devices,
            published: Arc::new(Mutex::new(HashSet::new())),
            registry: Arc::new(registry),
        };

        // Rollups are exposed from startup, before the first cycle completes
        for rollup in Rollup::ALL {
            gauges.reset(rollup);
        }
        for source in Source::ALL {
            gauges.source_unavailable.with_label_values(&[source.label()]);
        }

        Ok(gauges)
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(DEFAULT_NAMESPACE)
    }

    pub fn reset(&self, rollup: Rollup) {
        self.rollup_gauge(rollup).set(0);
    }

    pub fn increment(&self, rollup: Rollup, amount: u64) {
        self.rollup_gauge(rollup).add(clamp(amount));
    }

    /// Overwrites the value of one per-release series.
    pub fn set(&self, labels: &LabelTuple, value: u64) {
        self.downloads
            .with_label_values(&labels.values())
            .set(clamp(value));

        self.published_labels().insert(labels.clone());
    }

    /// Zeroes every rollup and every series published so far.
    ///
    /// Series are kept rather than removed, so a concurrent scrape never
    /// sees one disappear mid-cycle.
    pub fn reset_cycle(&self) {
        for rollup in Rollup::ALL {
            self.reset(rollup);
        }

        for labels in self.published_labels().iter() {
            self.downloads.with_label_values(&labels.values()).set(0);
        }
    }

    pub fn rollup_value(&self, rollup: Rollup) -> i64 {
        self.rollup_gauge(rollup).get()
    }

    /// Current value of a per-release series, if it was ever published.
    pub fn value(&self, labels: &LabelTuple) -> Option<i64> {
        if !self.published_labels().contains(labels) {
            return None;
        }

        Some(self.downloads.with_label_values(&labels.values()).get())
    }

    pub fn published_count(&self) -> usize {
        self.published_labels().len()
    }

    /// Starts timing a function; the duration is observed when the timer drops.
    pub fn start_timer(&self, func: &str) -> HistogramTimer {
        self.func_processing.with_label_values(&[func]).start_timer()
    }

    pub fn func_call_count(&self, func: &str) -> u64 {
        self.func_processing
            .with_label_values(&[func])
            .get_sample_count()
    }

    pub fn record_unavailable(&self, source: Source) {
        self.source_unavailable
            .with_label_values(&[source.label()])
            .inc();
    }

    pub fn unavailable_count(&self, source: Source) -> u64 {
        self.source_unavailable
            .with_label_values(&[source.label()])
            .get()
    }

    pub fn record_cycle(&self, devices: usize, finished_at: DateTime<Utc>) {
        self.cycle_devices
            .set(i64::try_from(devices).unwrap_or(i64::MAX));
        self.last_cycle_timestamp.set(finished_at.timestamp());
    }

    /// Completion time of the last cycle, if one has finished.
    pub fn last_cycle(&self) -> Option<DateTime<Utc>> {
        match self.last_cycle_timestamp.get() {
            0 => None,
            secs => DateTime::from_timestamp(secs, 0),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    fn rollup_gauge(&self, rollup: Rollup) -> IntGauge {
        self.downloads
            .with_label_values(&rollup.label_tuple().values())
    }

    fn published_labels(&self) -> std::sync::MutexGuard<'_, HashSet<LabelTuple>> {
        self.published
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn clamp(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
