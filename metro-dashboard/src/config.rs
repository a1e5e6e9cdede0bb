//! Dashboard configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::network::MissingLinePolicy;

/// Environment variable naming the network description file.
pub const STATIONS_PATH_VAR: &str = "METRO_STATIONS_PATH";
/// Environment variable naming the travel-time CSV.
pub const TRIPS_PATH_VAR: &str = "METRO_TRIPS_PATH";
pub const BIND_ADDR_VAR: &str = "METRO_BIND_ADDR";
pub const STATIC_DIR_VAR: &str = "METRO_STATIC_DIR";
pub const MISSING_LINE_POLICY_VAR: &str = "METRO_MISSING_LINE_POLICY";

/// Errors in configuration values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}: invalid socket address {value:?}")]
    InvalidAddr { var: &'static str, value: String },

    #[error("{var}: unknown policy {value:?} (expected skip, first-available or abort)")]
    InvalidPolicy { var: &'static str, value: String },
}

/// Where the dashboard reads its data and how it serves it.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Metro network description (JSON).
    pub stations_path: PathBuf,

    /// Travel-time table (CSV).
    pub trips_path: PathBuf,

    pub bind_addr: SocketAddr,

    /// Directory served under `/static`.
    pub static_dir: PathBuf,

    /// Handling of lines with no English name.
    pub missing_line_policy: MissingLinePolicy,
}

impl DashboardConfig {
    /// Read configuration from the process environment.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = lookup(STATIONS_PATH_VAR) {
            config.stations_path = path.into();
        }
        if let Some(path) = lookup(TRIPS_PATH_VAR) {
            config.trips_path = path.into();
        }
        if let Some(dir) = lookup(STATIC_DIR_VAR) {
            config.static_dir = dir.into();
        }
        if let Some(addr) = lookup(BIND_ADDR_VAR) {
            config.bind_addr = addr.parse().map_err(|_| ConfigError::InvalidAddr {
                var: BIND_ADDR_VAR,
                value: addr.clone(),
            })?;
        }
        if let Some(policy) = lookup(MISSING_LINE_POLICY_VAR) {
            config.missing_line_policy =
                MissingLinePolicy::parse(&policy).ok_or(ConfigError::InvalidPolicy {
                    var: MISSING_LINE_POLICY_VAR,
                    value: policy.clone(),
                })?;
        }

        Ok(config)
    }

    pub fn with_stations_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.stations_path = path.into();
        self
    }

    pub fn with_trips_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.trips_path = path.into();
        self
    }

    pub fn with_missing_line_policy(mut self, policy: MissingLinePolicy) -> Self {
        self.missing_line_policy = policy;
        self
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            stations_path: "stations.json".into(),
            trips_path: "riyadh_traffic_analysis.csv".into(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            static_dir: "static".into(),
            missing_line_policy: MissingLinePolicy::Skip,
        }
    }
}
