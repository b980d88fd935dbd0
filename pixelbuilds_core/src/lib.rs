pub mod catalog;
pub mod client;
pub mod error;
pub mod model;
pub mod naming;
pub mod sources;

pub use catalog::{DeviceCatalog, HttpCatalog};
pub use client::build_http_client;
pub use error::{ExporterError, Result};
pub use model::{Asset, Device, Release, Source};
pub use naming::{derive_label, ReleaseNaming};
pub use sources::{DynReleaseSource, HttpReleaseSource, ReleaseSource, SourceFetch};

// Re-export commonly used types
pub use async_trait::async_trait;
