//! Configuration management for the pdf2web server

use std::env;
use std::path::PathBuf;

use crate::error::ConfigError;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Storage backend selection
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// Directory tree on the local filesystem
    Local { root: PathBuf },
    /// S3-compatible object storage
    S3(S3Config),
}

#[derive(Debug, Clone)]
pub struct S3Config {
    pub provider: StorageProvider,
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: Option<String>,
}

/// Flavour of S3-compatible service behind the endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageProvider {
    Minio,
    R2,
    S3,
    B2,
}

impl StorageProvider {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value {
            "minio" => Ok(StorageProvider::Minio),
            "r2" => Ok(StorageProvider::R2),
            "s3" => Ok(StorageProvider::S3),
            "b2" => Ok(StorageProvider::B2),
            other => Err(ConfigError::Invalid {
                name: "S3_PROVIDER",
                value: other.to_string(),
            }),
        }
    }

    /// Region used when `S3_REGION` is unset; R2 only accepts `auto`
    pub fn default_region(self) -> &'static str {
        match self {
            StorageProvider::R2 => "auto",
            StorageProvider::Minio | StorageProvider::S3 | StorageProvider::B2 => "us-east-1",
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));

        let storage = match lookup("STORAGE_BACKEND")
            .unwrap_or_else(|| "local".to_string())
            .as_str()
        {
            "local" => StorageConfig::Local {
                root: lookup("STORAGE_ROOT")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("./storage")),
            },
            "s3" => StorageConfig::S3(S3Config {
                provider: StorageProvider::parse(
                    &lookup("S3_PROVIDER").unwrap_or_else(|| "minio".to_string()),
                )?,
                endpoint: required("S3_ENDPOINT")?,
                bucket: required("S3_BUCKET")?,
                access_key: required("S3_ACCESS_KEY")?,
                secret_key: required("S3_SECRET_KEY")?,
                region: lookup("S3_REGION"),
            }),
            other => {
                return Err(ConfigError::Invalid {
                    name: "STORAGE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let port = match lookup("SERVER_PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "SERVER_PORT",
                value,
            })?,
            None => 3000,
        };

        Ok(Config {
            server: ServerConfig {
                host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port,
            },
            storage,
        })
    }
}
