use crate::{
    error::{ExporterError, Result},
    model::{Release, Source},
    sources::{ReleaseSource, SourceFetch},
};
use async_trait::async_trait;
use tracing::{debug, warn};

pub const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com/repos/PixelBuilds-Releases";
pub const DEFAULT_GITEA_API_BASE: &str = "https://git.pixelbuilds.org/api/v1/repos/releases";

/// Release client for backends exposing `{base}/{codename}/releases`.
///
/// GitHub and Gitea share the same path layout and payload shape, so both
/// are served by this one client.
pub struct HttpReleaseSource {
    source: Source,
    client: reqwest::Client,
    api_base: String,
}

impl HttpReleaseSource {
    pub fn new(source: Source, client: reqwest::Client, api_base: impl Into<String>) -> Self {
        Self {
            source,
            client,
            api_base: api_base.into(),
        }
    }

    pub fn github(client: reqwest::Client, api_base: impl Into<String>) -> Self {
        Self::new(Source::Github, client, api_base)
    }

    pub fn gitea(client: reqwest::Client, api_base: impl Into<String>) -> Self {
        Self::new(Source::Gitea, client, api_base)
    }

    pub fn releases_url(&self, codename: &str) -> String {
        format!("{}/{}/releases", self.api_base.trim_end_matches('/'), codename)
    }
}

#[async_trait]
impl ReleaseSource for HttpReleaseSource {
    fn source(&self) -> Source {
        self.source
    }

    async fn fetch_releases(&self, codename: &str) -> Result<SourceFetch> {
        let url = self.releases_url(codename);
        debug!("Fetching {} releases for {} from {}", self.source, codename, url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            warn!(
                "{} returned status {} for {}, treating as no releases",
                self.source, status, codename
            );
            return Ok(SourceFetch::Unavailable {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let releases: Vec<Release> =
            serde_json::from_slice(&body).map_err(|source| ExporterError::Decode {
                url: url.clone(),
                source,
            })?;

        Ok(SourceFetch::Releases(releases))
    }
}
