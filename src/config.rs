//! Configuration for filevault
//!
//! Centralized configuration with sensible defaults, plus loaders for the
//! `server.info` and `backup.info` files the client reads at startup.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, VaultError};
use crate::protocol::PROTOCOL_VERSION;
use crate::transfer::DEFAULT_CHUNK_SIZE;

/// Main configuration for a backup client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Server address (host:port)
    pub server_addr: String,

    /// Connection read timeout (milliseconds, 0 = block forever)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = block forever)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Version byte sent on every request
    pub protocol_version: u8,

    /// Max bytes per read when receiving a payload
    pub chunk_size: usize,

    /// Fail operations whose payload arrived shorter than declared
    pub reject_truncated: bool,

    // -------------------------------------------------------------------------
    // Staging Configuration
    // -------------------------------------------------------------------------
    /// Directory where received payloads are written
    ///   {staging_dir}/
    ///     ├── tmp              (last retrieved file)
    ///     └── <listing name>   (file listings, named by the server)
    pub staging_dir: PathBuf,

    /// Local name for retrieved files, independent of the remote name
    pub retrieve_staging_name: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:1234".to_string(),
            read_timeout_ms: 0,
            write_timeout_ms: 0,
            protocol_version: PROTOCOL_VERSION,
            chunk_size: DEFAULT_CHUNK_SIZE,
            reject_truncated: false,
            staging_dir: PathBuf::from("."),
            retrieve_staging_name: "tmp".to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Path a retrieved file is staged under
    pub fn retrieve_staging_path(&self) -> PathBuf {
        self.staging_dir.join(&self.retrieve_staging_name)
    }
}

/// Builder for ClientConfig
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the server address (host:port)
    pub fn server_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.server_addr = addr.into();
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the protocol version byte
    pub fn protocol_version(mut self, version: u8) -> Self {
        self.config.protocol_version = version;
        self
    }

    /// Set the payload chunk size (in bytes)
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Treat truncated payloads as failures
    pub fn reject_truncated(mut self, reject: bool) -> Self {
        self.config.reject_truncated = reject;
        self
    }

    /// Set the staging directory
    pub fn staging_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.staging_dir = path.into();
        self
    }

    /// Set the local name for retrieved files
    pub fn retrieve_staging_name(mut self, name: impl Into<String>) -> Self {
        self.config.retrieve_staging_name = name.into();
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

// =============================================================================
// Collaborator Files
// =============================================================================

/// Server location read from `server.info`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub host: String,
    pub port: u16,
}

impl ServerInfo {
    /// Parse a `host:port` line
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (host, port) = line
            .rsplit_once(':')
            .ok_or_else(|| VaultError::Config(format!("expected host:port, got '{}'", line)))?;

        if host.is_empty() {
            return Err(VaultError::Config(format!("missing host in '{}'", line)));
        }

        let port = port
            .parse::<u16>()
            .map_err(|e| VaultError::Config(format!("invalid port '{}': {}", port, e)))?;

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }

    /// Load from the first line of a file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let first = contents
            .lines()
            .next()
            .ok_or_else(|| VaultError::Config(format!("{} is empty", path.display())))?;
        Self::parse(first)
    }

    /// `host:port` form suitable for `ClientConfig::server_addr`
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Load the list of local files to back up, one per line
pub fn load_backup_list(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path)?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
