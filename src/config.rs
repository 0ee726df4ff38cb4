//! Configuration manager for enroll.

use std::fs::File;
use std::net::{AddrParseError, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::FromRef;
use serde::{Deserialize, Serialize};

use crate::AppState;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const DEFAULT_ADDRESS: &str = "0.0.0.0:8000";
const DEFAULT_STORE_PATH: &str = "users_db.json";
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Instance name.
    pub name: String,
    /// Listening socket, `host:port`.
    pub address: String,
    #[serde(skip_deserializing)]
    version: String,
    #[serde(skip)]
    path: PathBuf,
    /// Related to the JSON user store.
    pub store: Store,
    /// Business rules applied on registration.
    pub policy: Policy,
    /// Related to Argon2 configuration.
    #[serde(skip_serializing)]
    pub argon2: Option<Argon2>,
    /// Related to metrics exposition.
    pub telemetry: Telemetry,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_owned(),
            address: DEFAULT_ADDRESS.to_owned(),
            version: VERSION.to_owned(),
            path: PathBuf::default(),
            store: Store::default(),
            policy: Policy::default(),
            argon2: None,
            telemetry: Telemetry::default(),
        }
    }
}

/// JSON file store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Store {
    /// Location of the users collection.
    pub path: PathBuf,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STORE_PATH),
        }
    }
}

/// Registration rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    pub name: NamePolicy,
    /// Email domains accepted on registration, compared case-insensitively.
    pub allowed_domains: Vec<String>,
    pub phone: PhonePolicy,
    pub password: PasswordPolicy,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            name: NamePolicy::default(),
            allowed_domains: vec!["gmail.com".into(), "hotmail.com".into()],
            phone: PhonePolicy::default(),
            password: PasswordPolicy::default(),
        }
    }
}

/// Bounds on the user's full name, in characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamePolicy {
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for NamePolicy {
    fn default() -> Self {
        Self {
            min_length: 1,
            max_length: 100,
        }
    }
}

/// International phone number format: optional `+`, then digits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhonePolicy {
    pub min_digits: usize,
    pub max_digits: usize,
    /// Accept `0` as first digit. E.164 numbers never start with one.
    pub allow_leading_zero: bool,
}

impl Default for PhonePolicy {
    fn default() -> Self {
        Self {
            min_digits: 10,
            max_digits: 15,
            allow_leading_zero: false,
        }
    }
}

/// Minimum password strength.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
    pub require_symbol: bool,
    /// Characters counted as symbols.
    pub symbols: String,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_symbol: true,
            symbols: r#"!@#$%^&*(),.?":{}|<>"#.to_owned(),
        }
    }
}

/// Argon2 configuration.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Argon2 {
    /// Memory used while hashing.
    pub memory_cost: u32,
    /// Iterations of hash.
    pub iterations: u32,
    /// Parallelism degree.
    pub parallelism: u32,
    /// Output hash length.
    pub hash_length: usize,
}

impl Default for Argon2 {
    fn default() -> Self {
        Self {
            memory_cost: 1024 * 64, // 64 MiB.
            iterations: 4,
            parallelism: 2,
            hash_length: 32,
        }
    }
}

/// Metrics configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Telemetry {
    /// Expose Prometheus metrics on `/metrics`.
    pub prometheus: bool,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self { prometheus: true }
    }
}

impl FromRef<AppState> for Arc<Configuration> {
    fn from_ref(state: &AppState) -> Arc<Configuration> {
        Arc::clone(&state.config)
    }
}

impl Configuration {
    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Application version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Socket to bind, with the port overridden by `PORT` when set.
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        let mut addr: SocketAddr = self.address.parse()?;
        if let Some(port) =
            std::env::var("PORT").ok().and_then(|p| p.parse::<u16>().ok())
        {
            addr.set_port(port);
        }
        Ok(addr)
    }

    /// Reads the `config.yaml` file from the specified path or the default
    /// location.
    pub fn read(self) -> Arc<Self> {
        let default_path = Path::new(DEFAULT_CONFIG_PATH).to_path_buf();
        let file_path = if self.path.is_file() {
            &self.path
        } else {
            &default_path
        };

        match File::open(file_path) {
            Ok(file) => match serde_yaml::from_reader::<_, Self>(file) {
                Ok(mut config) => {
                    // set app version.
                    config.version = VERSION.to_owned();
                    config.path = file_path.clone();
                    Arc::new(config)
                },
                Err(err) => Arc::new(self.error(err)),
            },
            Err(err) => Arc::new(self.error(err)),
        }
    }

    /// Return a default configuration as fallback.
    fn error(&self, err: impl std::error::Error) -> Self {
        tracing::error!(error = %err, "`config.yaml` cannot be used, falling back on defaults");
        Self {
            path: self.path.clone(),
            ..Default::default()
        }
    }
}
