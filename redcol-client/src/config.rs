//! # Pool Configuration
//!
//! Purpose: Describe how the pool dials, bounds and recycles connections.
//!
//! Durations are written in humantime form ("240s", "1m", "500ms") when
//! the configuration is loaded from JSON.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ClientResult;

/// Configuration for the connection pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Server address, e.g. "127.0.0.1:6379" or "cache.internal:6379".
    pub addr: String,
    /// Password sent with AUTH right after dialing.
    pub password: Option<String>,
    /// Database index selected after dialing when non-zero.
    pub database: u32,
    /// Maximum idle connections kept in the pool.
    pub max_idle: usize,
    /// Maximum total connections (idle + in-use). Zero means unbounded.
    pub max_active: usize,
    /// Idle connections older than this are closed instead of reused.
    #[serde(with = "humantime_serde")]
    pub idle_timeout: Option<Duration>,
    /// Idle connections older than this are PINGed before reuse.
    #[serde(with = "humantime_serde")]
    pub probe_after: Option<Duration>,
    /// Optional TCP read timeout for non-blocking commands.
    #[serde(with = "humantime_serde")]
    pub read_timeout: Option<Duration>,
    /// Optional TCP write timeout.
    #[serde(with = "humantime_serde")]
    pub write_timeout: Option<Duration>,
    /// Optional TCP connect timeout.
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            addr: "127.0.0.1:6379".to_string(),
            password: None,
            database: 0,
            max_idle: 3,
            max_active: 5,
            idle_timeout: Some(Duration::from_secs(240)),
            probe_after: Some(Duration::from_secs(60)),
            read_timeout: None,
            write_timeout: None,
            connect_timeout: None,
        }
    }
}

impl PoolConfig {
    /// Default configuration pointed at `addr`.
    pub fn with_addr(addr: impl Into<String>) -> Self {
        PoolConfig {
            addr: addr.into(),
            ..PoolConfig::default()
        }
    }

    /// Parses a configuration from JSON; missing fields take defaults.
    pub fn from_json(text: &str) -> ClientResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
