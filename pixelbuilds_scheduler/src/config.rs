use pixelbuilds_core::{
    catalog::DEFAULT_CATALOG_URL,
    client::DEFAULT_USER_AGENT,
    sources::{DEFAULT_GITEA_API_BASE, DEFAULT_GITHUB_API_BASE},
    ReleaseNaming,
};
use pixelbuilds_metrics::DEFAULT_NAMESPACE;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:9000";
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60 * 15);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExporterConfig {
    /// Address the scrape endpoint binds to
    pub listen_addr: SocketAddr,

    /// Pause between the end of one cycle and the start of the next
    #[serde(with = "humantime_serde")]
    pub interval: Duration,

    pub catalog_url: String,
    pub github_api_base: String,
    pub gitea_api_base: String,
    pub naming: ReleaseNaming,
    pub namespace: String,

    /// Devices whose releases are fetched concurrently; 1 keeps the cycle sequential
    pub device_concurrency: usize,

    #[serde(with = "humantime_serde_option")]
    pub request_timeout: Option<Duration>,

    pub user_agent: String,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 9000)),
            interval: DEFAULT_INTERVAL,
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            github_api_base: DEFAULT_GITHUB_API_BASE.to_string(),
            gitea_api_base: DEFAULT_GITEA_API_BASE.to_string(),
            naming: ReleaseNaming::default(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            device_concurrency: 1,
            request_timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// TOML files nest the settings under an `[exporter]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub exporter: ExporterConfig,
}

impl ExporterConfig {
    pub fn builder() -> ExporterConfigBuilder {
        ExporterConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.interval.is_zero() {
            return Err("Interval must be > 0".to_string());
        }

        for (name, url) in [
            ("catalog_url", &self.catalog_url),
            ("github_api_base", &self.github_api_base),
            ("gitea_api_base", &self.gitea_api_base),
        ] {
            if url.is_empty() {
                return Err(format!("{} cannot be empty", name));
            }
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(format!("{} must be an http(s) URL, got '{}'", name, url));
            }
        }

        if self.namespace.is_empty() {
            return Err("Namespace cannot be empty".to_string());
        }

        if self.device_concurrency == 0 {
            return Err("device_concurrency must be >= 1".to_string());
        }

        if self.user_agent.is_empty() {
            return Err("User agent cannot be empty".to_string());
        }

        if let Some(timeout) = self.request_timeout {
            if timeout.is_zero() {
                return Err("request_timeout must be > 0 when set".to_string());
            }
        }

        self.naming.validate()
    }
}

#[derive(Default)]
pub struct ExporterConfigBuilder {
    config: ExporterConfig,
}

impl ExporterConfigBuilder {
    pub fn listen_addr(mut self, addr: SocketAddr) -> Self {
        self.config.listen_addr = addr;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.config.interval = interval;
        self
    }

    pub fn catalog_url(mut self, url: impl Into<String>) -> Self {
        self.config.catalog_url = url.into();
        self
    }

    pub fn github_api_base(mut self, url: impl Into<String>) -> Self {
        self.config.github_api_base = url.into();
        self
    }

    pub fn gitea_api_base(mut self, url: impl Into<String>) -> Self {
        self.config.gitea_api_base = url.into();
        self
    }

    pub fn naming(mut self, naming: ReleaseNaming) -> Self {
        self.config.naming = naming;
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.namespace = namespace.into();
        self
    }

    pub fn device_concurrency(mut self, concurrency: usize) -> Self {
        self.config.device_concurrency = concurrency;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> ExporterConfig {
        self.config
    }
}

pub(crate) mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}

mod humantime_serde_option {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&humantime::format_duration(*d).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt = Option::<String>::deserialize(deserializer)?;
        opt.map(|s| humantime::parse_duration(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
