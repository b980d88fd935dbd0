//! Release naming convention.
//!
//! Asset eligibility and release label derivation depend only on literal
//! prefixes and suffixes, so both live here as pure functions over strings.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PRODUCT_PREFIX: &str = "PixelBuilds_";
pub const DEFAULT_ARCHIVE_SUFFIX: &str = ".zip";
pub const DEFAULT_RELEASE_SUFFIX: &str = "-release";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReleaseNaming {
    /// Prefix of downloadable build assets, also used in release names as `<prefix><codename>-`
    pub product_prefix: String,

    /// Suffix of downloadable build archives
    pub archive_suffix: String,

    /// Suffix stripped from release names
    pub release_suffix: String,
}

impl Default for ReleaseNaming {
    fn default() -> Self {
        Self {
            product_prefix: DEFAULT_PRODUCT_PREFIX.to_string(),
            archive_suffix: DEFAULT_ARCHIVE_SUFFIX.to_string(),
            release_suffix: DEFAULT_RELEASE_SUFFIX.to_string(),
        }
    }
}

impl ReleaseNaming {
    /// An asset is skipped only when it neither starts with the product
    /// prefix nor ends with the archive suffix.
    pub fn is_eligible(&self, asset_name: &str) -> bool {
        asset_name.starts_with(&self.product_prefix) || asset_name.ends_with(&self.archive_suffix)
    }

    /// Strips `<prefix><codename>-` and the release suffix from a release name.
    pub fn release_label(&self, release_name: &str, codename: &str) -> String {
        let device_prefix = format!("{}{}-", self.product_prefix, codename);

        let label = release_name.replace(&device_prefix, "");
        if self.release_suffix.is_empty() {
            label
        } else {
            label.replace(&self.release_suffix, "")
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.product_prefix.is_empty() {
            return Err("Product prefix cannot be empty".to_string());
        }

        if self.archive_suffix.is_empty() {
            return Err("Archive suffix cannot be empty".to_string());
        }

        Ok(())
    }
}

/// Derives a release label using the default naming convention.
pub fn derive_label(release_name: &str, codename: &str) -> String {
    ReleaseNaming::default().release_label(release_name, codename)
}
