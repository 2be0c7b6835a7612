mod file_config;

pub use file_config::{BulkConfig, FileConfig};

use crate::workflow::DEFAULT_CONCURRENCY;
use anyhow::{bail, Result};
use std::num::NonZeroUsize;
use std::path::PathBuf;

pub const DEFAULT_REQUEST_TIMEOUT_SEC: u64 = 30;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub api_url: Option<String>,
    pub api_token: Option<String>,
    pub timeout_sec: Option<u64>,
    pub max_concurrency: Option<usize>,
    pub fixture: Option<PathBuf>,
}

/// Where subject projections come from and where transitions go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendSettings {
    Http {
        base_url: String,
        auth_token: Option<String>,
        timeout_sec: u64,
    },
    /// Subjects loaded from a JSON file and mutated in memory only.
    Fixture(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkSettings {
    pub max_concurrency: NonZeroUsize,
}

impl Default for BulkSettings {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: BackendSettings,
    pub bulk: BulkSettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let fixture = file
            .fixture_path
            .map(PathBuf::from)
            .or_else(|| cli.fixture.clone());

        let backend = match fixture {
            Some(path) => {
                if !path.is_file() {
                    bail!("Fixture file does not exist: {:?}", path);
                }
                BackendSettings::Fixture(path)
            }
            None => {
                let base_url = file
                    .api_base_url
                    .or_else(|| cli.api_url.clone())
                    .ok_or_else(|| {
                        anyhow::anyhow!(
                            "api_base_url must be specified via --api-url or in config file"
                        )
                    })?;
                if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
                    bail!("api_base_url must be an http(s) URL: {}", base_url);
                }

                let timeout_sec = file
                    .request_timeout_sec
                    .or(cli.timeout_sec)
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SEC);
                if timeout_sec == 0 {
                    bail!("request_timeout_sec must be greater than zero");
                }

                BackendSettings::Http {
                    base_url,
                    auth_token: file.api_token.or_else(|| cli.api_token.clone()),
                    timeout_sec,
                }
            }
        };

        let bulk_file = file.bulk.unwrap_or_default();
        let bulk = match bulk_file.max_concurrency.or(cli.max_concurrency) {
            Some(n) => match NonZeroUsize::new(n) {
                Some(max_concurrency) => BulkSettings { max_concurrency },
                None => bail!("max_concurrency must be greater than zero"),
            },
            None => BulkSettings::default(),
        };

        Ok(Self { backend, bulk })
    }
}
