use crate::runner::{CycleReport, CycleRunner};
use pixelbuilds_core::Result;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Drives collection cycles forever, sleeping a fixed interval between them.
pub struct Scheduler {
    runner: CycleRunner,
    interval: Duration,
}

impl Scheduler {
    pub fn new(runner: CycleRunner, interval: Duration) -> Self {
        Self { runner, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn runner(&self) -> &CycleRunner {
        &self.runner
    }

    pub async fn run_once(&self) -> Result<CycleReport> {
        self.runner.run_cycle().await
    }

    /// Runs cycles until `shutdown` is cancelled and returns the number of
    /// completed cycles. Cancellation is observed between cycles; a failed
    /// cycle ends the loop with its error.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<usize> {
        let mut cycles = 0;

        while !shutdown.is_cancelled() {
            self.runner.run_cycle().await?;
            cycles += 1;

            info!(
                "Done, going to sleep for {}",
                humantime::format_duration(self.interval)
            );

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!("Scheduler stopped after {} cycles", cycles);
        Ok(cycles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{release, FailingCatalog, StaticCatalog, StaticSource};
    use pixelbuilds_core::{ReleaseNaming, Source};
    use pixelbuilds_metrics::{DownloadGauges, Rollup};
    use std::sync::Arc;

    fn scheduler(catalog: StaticCatalog, interval: Duration) -> Scheduler {
        let github = StaticSource::new(Source::Github).with_releases(
            "angler",
            vec![release("PixelBuilds_angler-2024.01-release", &[("PixelBuilds_angler-2024.01.zip", 42)])],
        );
        let runner = CycleRunner::new(
            Arc::new(catalog),
            vec![Arc::new(github), Arc::new(StaticSource::new(Source::Gitea))],
            DownloadGauges::with_defaults().unwrap(),
            ReleaseNaming::default(),
        );
        Scheduler::new(runner, interval)
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let scheduler = scheduler(StaticCatalog::new(&["angler"]), Duration::from_secs(3600));
        let token = CancellationToken::new();
        token.cancel();

        assert_eq!(scheduler.run(token).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_cancel_during_sleep() {
        let catalog = StaticCatalog::new(&["angler"]);
        let scheduler = Arc::new(scheduler(catalog.clone(), Duration::from_secs(3600)));
        let token = CancellationToken::new();

        let handle = tokio::spawn({
            let scheduler = scheduler.clone();
            let token = token.clone();
            async move { scheduler.run(token).await }
        });

        while catalog.calls() == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        token.cancel();

        let cycles = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(cycles, 1);
        assert_eq!(scheduler.runner().gauges().rollup_value(Rollup::Total), 42);
    }

    #[tokio::test]
    async fn test_repeats_after_interval() {
        let catalog = StaticCatalog::new(&["angler"]);
        let scheduler = Arc::new(scheduler(catalog.clone(), Duration::from_millis(10)));
        let token = CancellationToken::new();

        let handle = tokio::spawn({
            let scheduler = scheduler.clone();
            let token = token.clone();
            async move { scheduler.run(token).await }
        });

        while catalog.calls() < 3 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        token.cancel();

        let cycles = handle.await.unwrap().unwrap();
        assert!(cycles >= 3);
        // Totals are rebuilt each cycle rather than accumulated across cycles
        assert_eq!(scheduler.runner().gauges().rollup_value(Rollup::Total), 42);
    }

    #[tokio::test]
    async fn test_failed_cycle_stops_scheduler() {
        let runner = CycleRunner::new(
            Arc::new(FailingCatalog),
            vec![],
            DownloadGauges::with_defaults().unwrap(),
            ReleaseNaming::default(),
        );
        let scheduler = Scheduler::new(runner, Duration::from_millis(10));

        assert!(scheduler.run(CancellationToken::new()).await.is_err());
    }
}
