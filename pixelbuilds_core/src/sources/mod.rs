pub mod http;

use crate::{error::Result, model::{Release, Source}};
use async_trait::async_trait;
use std::sync::Arc;

pub use http::*;

/// Outcome of querying one backend for one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceFetch {
    /// The backend answered with a success status and a release list
    Releases(Vec<Release>),

    /// The backend answered with any other status; counts as no releases
    Unavailable { status: u16 },
}

impl SourceFetch {
    pub fn releases(&self) -> &[Release] {
        match self {
            SourceFetch::Releases(releases) => releases,
            SourceFetch::Unavailable { .. } => &[],
        }
    }

    pub fn into_releases(self) -> Vec<Release> {
        match self {
            SourceFetch::Releases(releases) => releases,
            SourceFetch::Unavailable { .. } => Vec::new(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, SourceFetch::Releases(_))
    }
}

/// Core trait for release backends
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Backend this client queries
    fn source(&self) -> Source;

    /// Fetch releases for a device. A non-success status is absorbed into
    /// [`SourceFetch::Unavailable`]; transport and decode failures are errors.
    async fn fetch_releases(&self, codename: &str) -> Result<SourceFetch>;
}

pub type DynReleaseSource = Arc<dyn ReleaseSource>;
