use std::{path::PathBuf, time::Duration};

use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use url::Url;

use crate::synergy::session::DEFAULT_BASE_URL;

pub const DEFAULT_CONFIG_PATH: &str = "synergy-roster.toml";

#[serde_as]
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub portal: PortalConfig,
    /// Longest time a single report job may take.
    #[serde_as(as = "DurationSeconds<u64>")]
    pub timeout: Duration,
    pub database_path: PathBuf,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            portal: PortalConfig::default(),
            timeout: Duration::from_secs(120),
            database_path: "data/rosters.db".into(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// The production portal if absent.
    pub base_url: Option<Url>,
    /// Appended to permanent ids to form student addresses.
    pub email_domain: String,
}
impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            email_domain: "aps.edu".to_owned(),
        }
    }
}
impl PortalConfig {
    pub fn base_url(&self) -> Result<Url, url::ParseError> {
        match &self.base_url {
            Some(url) => Ok(url.clone()),
            None => Url::parse(DEFAULT_BASE_URL),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::Config;

    #[test]
    fn empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.portal.email_domain, "aps.edu");
        assert_eq!(
            config.portal.base_url().unwrap().as_str(),
            "https://synergy.aps.edu/"
        );
        assert_eq!(config.database_path.to_str(), Some("data/rosters.db"));
    }

    #[test]
    fn fields_can_be_overridden() {
        let config: Config = toml::from_str(
            r#"
timeout = 30
database_path = "/var/lib/rosters.db"

[portal]
base_url = "http://127.0.0.1:8080/"
"#,
        )
        .unwrap();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(
            config.portal.base_url().unwrap().as_str(),
            "http://127.0.0.1:8080/"
        );
        assert_eq!(config.portal.email_domain, "aps.edu");
    }
}
