use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database")]
    pub database: String,

    /// Base URL of the Zoom REST API
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Base URL of the Zoom OAuth endpoint
    #[serde(default = "default_oauth_url")]
    pub oauth_url: String,
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    /// Zoom user that hosts newly created meetings
    #[serde(default = "default_host_user")]
    pub host_user: String,

    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default = "default_max_grade")]
    pub max_grade: f64,
}

fn default_database() -> String {
    Config::database_file().to_string_lossy().to_string()
}
fn default_api_url() -> String {
    "https://api.zoom.us/v2".to_string()
}
fn default_oauth_url() -> String {
    "https://zoom.us".to_string()
}
fn default_host_user() -> String {
    "me".to_string()
}
fn default_page_size() -> u32 {
    300
}
fn default_max_retries() -> u32 {
    3
}
fn default_retry_backoff_ms() -> u64 {
    500
}
fn default_max_grade() -> f64 {
    100.0
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            api_url: default_api_url(),
            oauth_url: default_oauth_url(),
            account_id: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            host_user: default_host_user(),
            page_size: default_page_size(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            max_grade: default_max_grade(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("rzoomsync")
        } else {
            let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".rzoomsync")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("rzoomsync.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("rzoomsync.sqlite")
    }

    /// Load configuration from file (defaults if missing), then apply
    /// environment overrides.
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();

        let mut cfg = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_yaml::from_str(&content).map_err(|e| {
                AppError::Config(format!("cannot parse {}: {}", path.display(), e))
            })?
        } else {
            Config::default()
        };

        cfg.apply_env_overrides();
        Ok(cfg)
    }

    /// Credentials and endpoints may come from the environment instead of
    /// the config file.
    pub fn apply_env_overrides(&mut self) {
        let overrides: [(&str, &mut String); 5] = [
            ("ZOOM_API_URL", &mut self.api_url),
            ("ZOOM_OAUTH_URL", &mut self.oauth_url),
            ("ZOOM_ACCOUNT_ID", &mut self.account_id),
            ("ZOOM_CLIENT_ID", &mut self.client_id),
            ("ZOOM_CLIENT_SECRET", &mut self.client_secret),
        ];

        for (key, field) in overrides {
            if let Ok(value) = env::var(key)
                && !value.trim().is_empty()
            {
                *field = value.trim().to_string();
            }
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.account_id.is_empty() && !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    /// Copy of the configuration safe to print.
    pub fn masked(&self) -> Self {
        let mut cfg = self.clone();
        if !cfg.client_secret.is_empty() {
            cfg.client_secret = "********".to_string();
        }
        cfg
    }

    /// Initialize configuration and database files
    pub fn init_all(custom_db: Option<String>, is_test: bool) -> AppResult<Self> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        // DB name: user provided or default
        let db_path = match custom_db {
            Some(name) => {
                let p = Path::new(&name);
                if p.is_absolute() {
                    p.to_path_buf()
                } else {
                    dir.join(p)
                }
            }
            None => Self::database_file(),
        };

        let config = Config {
            database: db_path.to_string_lossy().to_string(),
            ..Config::default()
        };

        // Write config file
        if !is_test {
            let yaml = serde_yaml::to_string(&config)?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
            println!("✅ Config file: {:?}", Self::config_file());
        }

        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        println!("✅ Database:    {:?}", db_path);

        Ok(config)
    }
}
