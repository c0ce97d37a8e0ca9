use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub location: LocationConfig,
    pub api: ApiConfig,
    pub reference: ReferenceConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LocationConfig {
    pub auto_locate: bool,     // Use IP geolocation if true
    pub manual_lat: f64,       // Latitude used if auto_locate is false
    pub manual_lon: f64,       // Longitude used if auto_locate is false
    pub detection_radius: f64, // Radius in km for the OpenSky query
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub poll_interval_seconds: u64,
    pub opensky_root: String,
    #[serde(default)]
    pub opensky_client_id: Option<String>,
    #[serde(default)]
    pub opensky_client_secret: Option<String>,
    #[serde(default)]
    pub serpapi_key: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReferenceConfig {
    pub airlines_path: PathBuf,
    pub aircraft_csv: PathBuf,
    /// Prefix for airline icon/logo URLs.
    pub asset_base_url: String,
    /// Prefix for hotel brand logo URLs.
    pub logo_base_url: String,
    pub reload_check_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            location: LocationConfig {
                auto_locate: true,
                manual_lat: 37.7749,
                manual_lon: -122.4194,
                detection_radius: 150.0,
            },
            api: ApiConfig {
                poll_interval_seconds: 30,
                opensky_root: crate::api::OPENSKY_API_ROOT.to_string(),
                opensky_client_id: None,
                opensky_client_secret: None,
                serpapi_key: None,
            },
            reference: ReferenceConfig {
                airlines_path: PathBuf::from("data/airlines.json"),
                aircraft_csv: PathBuf::from("data/aircraft-database.csv"),
                asset_base_url: "/api/airline".to_string(),
                logo_base_url: "/assets/logos".to_string(),
                reload_check_seconds: 5,
            },
        }
    }
}

impl Config {
    /// Loads the TOML file at `config_path`.
    /// If it doesn't exist, creates a default one.
    pub fn load_from(config_path: &Path) -> Self {
        let mut config = match fs::read_to_string(config_path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Failed to parse {}: {}. Using defaults.", config_path.display(), e);
                    Config::default()
                }
            },
            Err(_) => {
                let default_config = Config::default();
                // Save default config to disk for the user to edit later
                match toml::to_string_pretty(&default_config) {
                    Ok(toml_string) if fs::write(config_path, &toml_string).is_ok() => {
                        info!("Wrote default configuration to {}", config_path.display());
                    }
                    _ => warn!("Could not write default {} to disk.", config_path.display()),
                }
                default_config
            }
        };

        config.apply_env();
        config
    }

    /// Secrets may live in the environment instead of the file.
    fn apply_env(&mut self) {
        let env = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

        if let Some(id) = env("OPENSKY_CLIENT_ID") {
            self.api.opensky_client_id = Some(id);
        }
        if let Some(secret) = env("OPENSKY_CLIENT_SECRET") {
            self.api.opensky_client_secret = Some(secret);
        }
        if let Some(key) = env("SERPAPI_KEY") {
            self.api.serpapi_key = Some(key);
        }
    }

    pub fn opensky_credentials(&self) -> Option<crate::api::OpenSkyCredentials> {
        match (&self.api.opensky_client_id, &self.api.opensky_client_secret) {
            (Some(id), Some(secret)) if !id.trim().is_empty() && !secret.trim().is_empty() => {
                Some(crate::api::OpenSkyCredentials {
                    client_id: id.trim().to_string(),
                    client_secret: secret.trim().to_string(),
                })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::load_from(&path);
        assert_eq!(config.location, Config::default().location);
        assert_eq!(config.reference, Config::default().reference);
        assert!(path.exists());

        let written: Config = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.api.poll_interval_seconds, 30);
    }

    #[test]
    fn parses_custom_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[location]
auto_locate = false
manual_lat = 40.64
manual_lon = -73.78
detection_radius = 80.0

[api]
poll_interval_seconds = 15
opensky_root = "http://localhost:9000/api"

[reference]
airlines_path = "fixtures/airlines.json"
aircraft_csv = "fixtures/aircraft.csv"
asset_base_url = "/a"
logo_base_url = "/l"
reload_check_seconds = 2
"#,
        )
        .unwrap();

        let config = Config::load_from(&path);
        assert!(!config.location.auto_locate);
        assert_eq!(config.api.poll_interval_seconds, 15);
        assert_eq!(config.reference.airlines_path, PathBuf::from("fixtures/airlines.json"));
    }

    #[test]
    fn broken_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "this is = = not toml").unwrap();
        assert_eq!(Config::load_from(&path).location, Config::default().location);
    }
}
