use pixelbuilds_core::{Asset, Device, Release, Source};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Upstream data served by the mock.
///
/// A codename listed in `statuses` for a source answers with that status
/// instead of its releases; codenames with neither answer 404.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamFixture {
    pub devices: Vec<Device>,
    pub github: HashMap<String, Vec<Release>>,
    pub gitea: HashMap<String, Vec<Release>>,
    pub github_statuses: HashMap<String, u16>,
    pub gitea_statuses: HashMap<String, u16>,
    pub catalog_status: Option<u16>,
}

impl UpstreamFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn device(mut self, codename: &str) -> Self {
        self.devices.push(Device::new(codename));
        self
    }

    pub fn release(
        mut self,
        source: Source,
        codename: &str,
        release_name: &str,
        assets: &[(&str, u64)],
    ) -> Self {
        let release = Release::new(
            release_name,
            assets
                .iter()
                .map(|(name, count)| Asset::new(*name, *count))
                .collect(),
        );
        self.releases_mut(source)
            .entry(codename.to_string())
            .or_default()
            .push(release);
        self
    }

    pub fn status(mut self, source: Source, codename: &str, status: u16) -> Self {
        self.statuses_mut(source).insert(codename.to_string(), status);
        self
    }

    pub fn catalog_status(mut self, status: u16) -> Self {
        self.catalog_status = Some(status);
        self
    }

    pub fn remove_device(&mut self, codename: &str) {
        self.devices.retain(|d| d.codename != codename);
    }

    /// Status and releases a backend answers with for `codename`.
    pub fn releases_for(&self, source: Source, codename: &str) -> (u16, Option<&Vec<Release>>) {
        let (releases, statuses) = match source {
            Source::Github => (&self.github, &self.github_statuses),
            Source::Gitea => (&self.gitea, &self.gitea_statuses),
        };

        if let Some(status) = statuses.get(codename) {
            return (*status, None);
        }

        match releases.get(codename) {
            Some(releases) => (200, Some(releases)),
            None => (404, None),
        }
    }

    /// Small fixture used by the `mock_upstream` binary when no file is given.
    pub fn sample() -> Self {
        Self::new()
            .device("angler")
            .device("oriole")
            .release(
                Source::Github,
                "angler",
                "PixelBuilds_angler-2024.01-release",
                &[("PixelBuilds_angler-2024.01.zip", 42), ("boot.img", 7)],
            )
            .release(
                Source::Gitea,
                "oriole",
                "PixelBuilds_oriole-2024.02-release",
                &[("PixelBuilds_oriole-2024.02.zip", 13)],
            )
            .status(Source::Gitea, "angler", 500)
    }

    fn releases_mut(&mut self, source: Source) -> &mut HashMap<String, Vec<Release>> {
        match source {
            Source::Github => &mut self.github,
            Source::Gitea => &mut self.gitea,
        }
    }

    fn statuses_mut(&mut self, source: Source) -> &mut HashMap<String, u16> {
        match source {
            Source::Github => &mut self.github_statuses,
            Source::Gitea => &mut self.gitea_statuses,
        }
    }
}
