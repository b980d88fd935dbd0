use crate::{
    error::{ExporterError, Result},
    model::Device,
};
use async_trait::async_trait;
use tracing::debug;

pub const DEFAULT_CATALOG_URL: &str =
    "https://raw.githubusercontent.com/PixelBuildsROM/pixelbuilds_devices/main/devices.json";

/// Source of the device list queried every cycle.
#[async_trait]
pub trait DeviceCatalog: Send + Sync {
    /// Fetch the current devices in manifest order. Any failure aborts the cycle.
    async fn devices(&self) -> Result<Vec<Device>>;
}

pub struct HttpCatalog {
    client: reqwest::Client,
    url: String,
}

impl HttpCatalog {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl DeviceCatalog for HttpCatalog {
    async fn devices(&self) -> Result<Vec<Device>> {
        debug!("Fetching device catalog from {}", self.url);

        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExporterError::CatalogStatus {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let devices: Vec<Device> =
            serde_json::from_slice(&body).map_err(|source| ExporterError::Decode {
                url: self.url.clone(),
                source,
            })?;

        debug!("Catalog lists {} devices", devices.len());
        Ok(devices)
    }
}
