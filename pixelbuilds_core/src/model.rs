use serde::{Deserialize, Serialize};
use std::fmt;

/// Release backend a set of releases was fetched from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// GitHub releases API
    Github,

    /// Self-hosted Gitea releases API
    Gitea,
}

impl Source {
    pub const ALL: [Source; 2] = [Source::Github, Source::Gitea];

    /// Value used for the `source` label.
    pub fn label(&self) -> &'static str {
        match self {
            Source::Github => "github",
            Source::Gitea => "gitea",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One entry of the device manifest. Only the codename is kept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Device {
    pub codename: String,
}

impl Device {
    pub fn new(codename: impl Into<String>) -> Self {
        Self {
            codename: codename.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Release {
    pub name: String,
    pub assets: Vec<Asset>,
}

impl Release {
    pub fn new(name: impl Into<String>, assets: Vec<Asset>) -> Self {
        Self {
            name: name.into(),
            assets,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Asset {
    pub name: String,
    pub download_count: u64,
}

impl Asset {
    pub fn new(name: impl Into<String>, download_count: u64) -> Self {
        Self {
            name: name.into(),
            download_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_labels() {
        assert_eq!(Source::Github.label(), "github");
        assert_eq!(Source::Gitea.to_string(), "gitea");
        assert_eq!(
            serde_json::to_string(&Source::Gitea).unwrap(),
            "\"gitea\""
        );
    }

    #[test]
    fn test_release_ignores_unknown_fields() {
        let json = r#"{
            "id": 7,
            "name": "PixelBuilds_angler-2024.01-release",
            "tag_name": "2024.01",
            "assets": [
                {"id": 1, "name": "PixelBuilds_angler-2024.01.zip", "download_count": 42, "size": 1024}
            ]
        }"#;

        let release: Release = serde_json::from_str(json).unwrap();
        assert_eq!(release.name, "PixelBuilds_angler-2024.01-release");
        assert_eq!(release.assets, vec![Asset::new("PixelBuilds_angler-2024.01.zip", 42)]);
    }

    #[test]
    fn test_release_missing_field_is_rejected() {
        let json = r#"{"name": "PixelBuilds_angler-2024.01-release", "assets": [{"name": "x.zip"}]}"#;
        assert!(serde_json::from_str::<Release>(json).is_err());

        let json = r#"{"assets": []}"#;
        assert!(serde_json::from_str::<Release>(json).is_err());
    }

    #[test]
    fn test_device_record() {
        let json = r#"[{"codename": "angler", "name": "Nexus 6P"}, {"codename": "bluejay"}]"#;
        let devices: Vec<Device> = serde_json::from_str(json).unwrap();
        assert_eq!(devices, vec![Device::new("angler"), Device::new("bluejay")]);
    }
}
