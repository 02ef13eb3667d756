//! Keeper configuration.
//!
//! Loaded from a JSON file, with secrets overridable from the environment.
//! Every option has a default except the pair and the signing key; missing or
//! invalid values are rejected by [`KeeperConfig::validate`] before anything
//! connects to the chain.

use chrono::TimeDelta;
use clmm_keeper_domain::token::Address;
use clmm_keeper_protocols::{Credentials, SecretString};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable overriding `credentials.private_key`.
pub const ENV_PRIVATE_KEY: &str = "KEEPER_PRIVATE_KEY";
/// Environment variable overriding `credentials.rpc_url`.
pub const ENV_RPC_URL: &str = "KEEPER_RPC_URL";
/// Environment variable overriding `notifications.token`.
pub const ENV_WEBHOOK_TOKEN: &str = "KEEPER_WEBHOOK_TOKEN";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Parameters of the rebalance policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyConfig {
    /// Width in ticks of the initial lower leg.
    pub low_tick_range: i32,
    /// Width in ticks of the initial upper leg.
    pub up_tick_range: i32,
    /// Ticks added to each leg when widening.
    pub inc_step: i32,
    /// Ticks removed from each leg when narrowing.
    pub dec_step: i32,
    /// Age after which an unchanged pair is narrowed.
    pub narrow_interval_secs: u64,
    /// Share of each wallet balance deposited per add, in (0, 1].
    pub position_fraction: Decimal,
    /// Pool tick spacing; also the minimum leg width.
    pub tick_spacing: i32,
}

impl PolicyConfig {
    /// Narrow interval as a signed duration.
    pub fn narrow_interval(&self) -> TimeDelta {
        i64::try_from(self.narrow_interval_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            low_tick_range: default_tick_range(),
            up_tick_range: default_tick_range(),
            inc_step: default_inc_step(),
            dec_step: default_dec_step(),
            narrow_interval_secs: default_narrow_interval_secs(),
            position_fraction: default_position_fraction(),
            tick_spacing: default_tick_spacing(),
        }
    }
}

/// Loop timing and restart behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeConfig {
    /// Start-to-start period of control loop iterations.
    pub poll_interval_secs: u64,
    /// Pause before the supervisor opens a new session.
    pub restart_backoff_secs: u64,
    /// Give up after this many consecutive failed sessions. Unbounded if unset.
    pub max_restarts: Option<u32>,
}

impl RuntimeConfig {
    /// Returns the poll interval.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Returns the restart backoff.
    pub fn restart_backoff(&self) -> Duration {
        Duration::from_secs(self.restart_backoff_secs)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            restart_backoff_secs: default_restart_backoff_secs(),
            max_restarts: None,
        }
    }
}

/// Outbound alert transport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotificationConfig {
    /// Slack-compatible `chat.postMessage` endpoint.
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Bot token sent in the `Authorization` header.
    #[serde(default)]
    pub token: SecretString,
    /// Channel id to post to.
    #[serde(default)]
    pub channel: Option<String>,
}

impl NotificationConfig {
    /// Returns true if a webhook transport should be built.
    pub fn webhook_enabled(&self) -> bool {
        self.webhook_url.is_some() || !self.token.is_empty()
    }
}

/// Root configuration of one keeper instance.
///
/// Policy and runtime options sit at the top level of the file. Unknown keys
/// are rejected so a misspelt option never falls back to its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "KeeperConfigFile")]
pub struct KeeperConfig {
    pub token0: Address,
    pub token1: Address,
    pub credentials: Credentials,
    #[serde(flatten)]
    pub policy: PolicyConfig,
    #[serde(flatten)]
    pub runtime: RuntimeConfig,
    pub notifications: NotificationConfig,
}

/// On-disk layout of [`KeeperConfig`].
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct KeeperConfigFile {
    token0: Address,
    token1: Address,
    #[serde(default)]
    credentials: Credentials,
    #[serde(default = "default_tick_range")]
    low_tick_range: i32,
    #[serde(default = "default_tick_range")]
    up_tick_range: i32,
    #[serde(default = "default_inc_step")]
    inc_step: i32,
    #[serde(default = "default_dec_step")]
    dec_step: i32,
    #[serde(default = "default_narrow_interval_secs", alias = "narrow_interval")]
    narrow_interval_secs: u64,
    #[serde(default = "default_position_fraction")]
    position_fraction: Decimal,
    #[serde(default = "default_tick_spacing")]
    tick_spacing: i32,
    #[serde(default = "default_poll_interval_secs", alias = "poll_interval")]
    poll_interval_secs: u64,
    #[serde(default = "default_restart_backoff_secs")]
    restart_backoff_secs: u64,
    #[serde(default)]
    max_restarts: Option<u32>,
    #[serde(default)]
    notifications: NotificationConfig,
}

impl From<KeeperConfigFile> for KeeperConfig {
    fn from(file: KeeperConfigFile) -> Self {
        Self {
            token0: file.token0,
            token1: file.token1,
            credentials: file.credentials,
            policy: PolicyConfig {
                low_tick_range: file.low_tick_range,
                up_tick_range: file.up_tick_range,
                inc_step: file.inc_step,
                dec_step: file.dec_step,
                narrow_interval_secs: file.narrow_interval_secs,
                position_fraction: file.position_fraction,
                tick_spacing: file.tick_spacing,
            },
            runtime: RuntimeConfig {
                poll_interval_secs: file.poll_interval_secs,
                restart_backoff_secs: file.restart_backoff_secs,
                max_restarts: file.max_restarts,
            },
            notifications: file.notifications,
        }
    }
}

impl KeeperConfig {
    /// Creates a config with defaults for everything but the pair.
    pub fn new(token0: Address, token1: Address) -> Self {
        Self {
            token0,
            token1,
            credentials: Credentials::default(),
            policy: PolicyConfig::default(),
            runtime: RuntimeConfig::default(),
            notifications: NotificationConfig::default(),
        }
    }

    /// Reads, overrides from the process environment and validates.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parses a config file without validating it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Parses a config from JSON without validating it.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Applies secret overrides; empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(key) = get(ENV_PRIVATE_KEY) {
            self.credentials.private_key = SecretString::new(key);
        }
        if let Some(url) = get(ENV_RPC_URL) {
            self.credentials.rpc_url = url;
        }
        if let Some(token) = get(ENV_WEBHOOK_TOKEN) {
            self.notifications.token = SecretString::new(token);
        }
    }

    /// Checks every field; returns the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token0 == self.token1 {
            return Err(ConfigError::invalid("token1", "must differ from token0"));
        }
        if self.credentials.private_key.is_empty() {
            return Err(ConfigError::invalid(
                "credentials.private_key",
                format!("required (set it in the file or {ENV_PRIVATE_KEY})"),
            ));
        }

        let policy = &self.policy;
        if policy.tick_spacing <= 0 {
            return Err(ConfigError::invalid("tick_spacing", "must be positive"));
        }
        if policy.low_tick_range < policy.tick_spacing {
            return Err(ConfigError::invalid(
                "low_tick_range",
                "must be at least one tick spacing",
            ));
        }
        if policy.up_tick_range < policy.tick_spacing {
            return Err(ConfigError::invalid(
                "up_tick_range",
                "must be at least one tick spacing",
            ));
        }
        if policy.inc_step < 0 {
            return Err(ConfigError::invalid("inc_step", "must not be negative"));
        }
        if policy.dec_step < 0 {
            return Err(ConfigError::invalid("dec_step", "must not be negative"));
        }
        if policy.narrow_interval_secs == 0 {
            return Err(ConfigError::invalid("narrow_interval_secs", "must be positive"));
        }
        if policy.position_fraction <= Decimal::ZERO || policy.position_fraction > Decimal::ONE {
            return Err(ConfigError::invalid(
                "position_fraction",
                format!("{} is outside (0, 1]", policy.position_fraction),
            ));
        }

        if self.runtime.poll_interval_secs == 0 {
            return Err(ConfigError::invalid("poll_interval_secs", "must be positive"));
        }
        if let Some(url) = &self.notifications.webhook_url
            && !(url.starts_with("https://") || url.starts_with("http://"))
        {
            return Err(ConfigError::invalid(
                "notifications.webhook_url",
                "must be an http(s) URL",
            ));
        }
        Ok(())
    }
}

fn default_tick_range() -> i32 {
    500
}

fn default_inc_step() -> i32 {
    250
}

fn default_dec_step() -> i32 {
    100
}

fn default_narrow_interval_secs() -> u64 {
    6 * 60 * 60
}

fn default_position_fraction() -> Decimal {
    Decimal::new(3, 1)
}

fn default_tick_spacing() -> i32 {
    1
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_restart_backoff_secs() -> u64 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    const MINIMAL: &str = r#"{
        "token0": "0x82aF49447D8a07e3bd95BD0d56f35241523fBab1",
        "token1": "0xFF970A61A04b1cA14834A43f5dE4533eBDDB5CC8",
        "credentials": { "private_key": "0x01" }
    }"#;

    #[test]
    fn test_defaults_fill_missing_options() {
        let config = KeeperConfig::from_json(MINIMAL).unwrap();
        config.validate().unwrap();
        assert_eq!(config.policy.low_tick_range, 500);
        assert_eq!(config.policy.up_tick_range, 500);
        assert_eq!(config.policy.narrow_interval_secs, 21_600);
        assert_eq!(config.policy.position_fraction, dec!(0.3));
        assert_eq!(config.runtime.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.runtime.restart_backoff(), Duration::from_secs(3));
        assert_eq!(config.runtime.max_restarts, None);
        assert!(!config.notifications.webhook_enabled());
    }

    #[test]
    fn test_flat_options_are_read() {
        let raw = r#"{
            "token0": "0x82aF49447D8a07e3bd95BD0d56f35241523fBab1",
            "token1": "0xFF970A61A04b1cA14834A43f5dE4533eBDDB5CC8",
            "credentials": { "private_key": "0x01", "rpc_url": "https://arb1.example.org" },
            "low_tick_range": 800,
            "up_tick_range": 600,
            "inc_step": 50,
            "dec_step": 20,
            "narrow_interval_secs": 3600,
            "position_fraction": 0.25,
            "poll_interval_secs": 10,
            "max_restarts": 4,
            "notifications": { "webhook_url": "https://slack.com/api/chat.postMessage", "channel": "C1" }
        }"#;
        let config = KeeperConfig::from_json(raw).unwrap();
        config.validate().unwrap();
        assert_eq!(config.policy.low_tick_range, 800);
        assert_eq!(config.policy.up_tick_range, 600);
        assert_eq!(config.policy.inc_step, 50);
        assert_eq!(config.policy.dec_step, 20);
        assert_eq!(config.policy.position_fraction, dec!(0.25));
        assert_eq!(config.policy.narrow_interval(), TimeDelta::hours(1));
        assert_eq!(config.runtime.poll_interval_secs, 10);
        assert_eq!(config.runtime.max_restarts, Some(4));
        assert!(config.notifications.webhook_enabled());
    }

    #[test]
    fn test_short_interval_names_are_accepted() {
        let raw = r#"{
            "token0": "0x82aF49447D8a07e3bd95BD0d56f35241523fBab1",
            "token1": "0xFF970A61A04b1cA14834A43f5dE4533eBDDB5CC8",
            "credentials": { "private_key": "0x01" },
            "narrow_interval": 3600,
            "poll_interval": 30
        }"#;
        let config = KeeperConfig::from_json(raw).unwrap();
        config.validate().unwrap();
        assert_eq!(config.policy.narrow_interval_secs, 3600);
        assert_eq!(config.runtime.poll_interval(), Duration::from_secs(30));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let typo = r#"{
            "token0": "0x82aF49447D8a07e3bd95BD0d56f35241523fBab1",
            "token1": "0xFF970A61A04b1cA14834A43f5dE4533eBDDB5CC8",
            "credentials": { "private_key": "0x01" },
            "narow_interval_secs": 3600
        }"#;
        match KeeperConfig::from_json(typo) {
            Err(ConfigError::Parse(e)) => assert!(e.to_string().contains("narow_interval_secs")),
            other => panic!("unexpected result {other:?}"),
        }

        let nested = r#"{
            "token0": "0x82aF49447D8a07e3bd95BD0d56f35241523fBab1",
            "token1": "0xFF970A61A04b1cA14834A43f5dE4533eBDDB5CC8",
            "credentials": { "private_key": "0x01" },
            "notifications": { "chanel": "C1" }
        }"#;
        assert!(matches!(
            KeeperConfig::from_json(nested),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_pair_is_rejected() {
        let err = KeeperConfig::from_json(r#"{ "token0": "0x82aF49447D8a07e3bd95BD0d56f35241523fBab1" }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_private_key_is_rejected() {
        let raw = r#"{
            "token0": "0x82aF49447D8a07e3bd95BD0d56f35241523fBab1",
            "token1": "0xFF970A61A04b1cA14834A43f5dE4533eBDDB5CC8"
        }"#;
        let config = KeeperConfig::from_json(raw).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "credentials.private_key",
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let base = KeeperConfig::from_json(MINIMAL).unwrap();

        let mut config = base.clone();
        config.policy.position_fraction = dec!(1.5);
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.policy.position_fraction = Decimal::ZERO;
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.policy.dec_step = -1;
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.policy.tick_spacing = 60;
        config.policy.low_tick_range = 30;
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.runtime.poll_interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = base.clone();
        config.token1 = config.token0.clone();
        assert!(config.validate().is_err());

        let mut config = base;
        config.notifications.webhook_url = Some("slack.com".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides_secrets() {
        let mut config = KeeperConfig::from_json(MINIMAL).unwrap();
        config.apply_env(|key| match key {
            ENV_PRIVATE_KEY => Some("0xfeed".to_string()),
            ENV_RPC_URL => Some("http://localhost:8545".to_string()),
            ENV_WEBHOOK_TOKEN => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config.credentials.private_key.expose(), "0xfeed");
        assert_eq!(config.credentials.rpc_url, "http://localhost:8545");
        assert!(config.notifications.token.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();
        let config = KeeperConfig::from_file(file.path()).unwrap();
        assert_eq!(
            config.token0.as_str(),
            "0x82af49447d8a07e3bd95bd0d56f35241523fbab1"
        );

        let missing = KeeperConfig::from_file("/nonexistent/keeper.json").unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}
