use crate::error::{Result, TrackerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Connection settings for one tracker instance.
///
/// Credentials are carried as HTTP basic auth by the transport, not embedded
/// in URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Host name of the tracker, e.g. `www1.v1host.com`.
    pub domain: String,
    /// Instance key, the first path segment of every tracker URL.
    pub key: String,
    pub username: String,
    pub password: String,
    /// Directory holding the persisted mapping domains.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".v1bot")
}

impl TrackerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TrackerError::ConfigMissing(path.to_path_buf()));
        }
        let data = std::fs::read_to_string(path)?;
        let cfg: TrackerConfig = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(path.as_ref(), data.as_bytes())
    }

    /// Root of the REST endpoint: `https://<domain>/<key>/VersionOne/rest-1.v1`.
    pub fn base_url(&self) -> String {
        format!("https://{}/{}/VersionOne/rest-1.v1", self.domain, self.key)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config() -> TrackerConfig {
        TrackerConfig {
            domain: "www1.v1host.com".to_string(),
            key: "AcmeCo".to_string(),
            username: "bot".to_string(),
            password: "hunter2".to_string(),
            data_dir: PathBuf::from("/var/lib/v1bot"),
        }
    }

    #[test]
    fn config_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("v1bot.yaml");
        config().save(&path).unwrap();

        let loaded = TrackerConfig::load(&path).unwrap();
        assert_eq!(loaded.domain, "www1.v1host.com");
        assert_eq!(loaded.key, "AcmeCo");
        assert_eq!(loaded.data_dir, PathBuf::from("/var/lib/v1bot"));
    }

    #[test]
    fn missing_config_is_typed() {
        let dir = TempDir::new().unwrap();
        let err = TrackerConfig::load(&dir.path().join("v1bot.yaml")).unwrap_err();
        assert!(matches!(err, TrackerError::ConfigMissing(_)));
    }

    #[test]
    fn data_dir_defaults() {
        let yaml = "domain: host\nkey: K\nusername: u\npassword: p\n";
        let cfg: TrackerConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from(".v1bot"));
    }

    #[test]
    fn base_url_shape() {
        assert_eq!(
            config().base_url(),
            "https://www1.v1host.com/AcmeCo/VersionOne/rest-1.v1"
        );
    }
}
