//! Configuration for the ledger aggregate

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ubi_types::{
    Amount, BlockDelta, Identity, DEFAULT_MINIMUM_RESERVE, DEFAULT_PAYOUT_AMOUNT,
    DEFAULT_PAYOUT_INTERVAL, MAX_PROPOSED_VALUE, PROPOSAL_VOTING_PERIOD,
};

/// Errors from loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration source error: {0}")]
    Source(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Main ledger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Identity allowed to verify participants, pause, and finalize proposals
    #[serde(default = "default_administrator")]
    pub administrator: Identity,

    /// Custody account holding the pooled funds
    #[serde(default = "default_pool_account")]
    pub pool_account: Identity,

    /// Genesis payout policy
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Governance parameters
    #[serde(default)]
    pub governance: GovernanceConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            administrator: default_administrator(),
            pool_account: default_pool_account(),
            policy: PolicyConfig::default(),
            governance: GovernanceConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Payout policy in force at genesis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default = "default_payout_amount")]
    pub payout_amount: Amount,

    #[serde(default = "default_payout_interval")]
    pub payout_interval: BlockDelta,

    #[serde(default = "default_minimum_reserve")]
    pub minimum_reserve: Amount,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            payout_amount: DEFAULT_PAYOUT_AMOUNT,
            payout_interval: DEFAULT_PAYOUT_INTERVAL,
            minimum_reserve: DEFAULT_MINIMUM_RESERVE,
        }
    }
}

/// Governance configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// Height units a proposal accepts votes
    #[serde(default = "default_voting_period")]
    pub voting_period: BlockDelta,

    /// Inclusive upper bound of a proposed value
    #[serde(default = "default_max_proposed_value")]
    pub max_proposed_value: Amount,

    /// Whether the pause flag also rejects votes
    #[serde(default = "default_true")]
    pub pause_blocks_voting: bool,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            voting_period: PROPOSAL_VOTING_PERIOD,
            max_proposed_value: MAX_PROPOSED_VALUE,
            pause_blocks_voting: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level, overridden by `RUST_LOG` when set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_true() -> bool {
    true
}

fn default_administrator() -> Identity {
    Identity::new("ubi-admin")
}

fn default_pool_account() -> Identity {
    Identity::new("ubi-pool")
}

fn default_payout_amount() -> Amount {
    DEFAULT_PAYOUT_AMOUNT
}

fn default_payout_interval() -> BlockDelta {
    DEFAULT_PAYOUT_INTERVAL
}

fn default_minimum_reserve() -> Amount {
    DEFAULT_MINIMUM_RESERVE
}

fn default_voting_period() -> BlockDelta {
    PROPOSAL_VOTING_PERIOD
}

fn default_max_proposed_value() -> Amount {
    MAX_PROPOSED_VALUE
}

fn default_log_level() -> String {
    "info".to_string()
}

impl LedgerConfig {
    /// Load configuration from defaults, an optional file, and `UBI_`
    /// environment variables (nested keys use `__`, e.g.
    /// `UBI_POLICY__PAYOUT_AMOUNT`).
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&LedgerConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("UBI")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let loaded: LedgerConfig = builder.build()?.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Configuration with the given administrator and defaults elsewhere.
    pub fn with_administrator(administrator: impl Into<Identity>) -> Self {
        Self {
            administrator: administrator.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.policy.payout_amount == 0 {
            return Err(ConfigError::Invalid("payout_amount must be positive".into()));
        }
        if self.policy.payout_interval == 0 {
            return Err(ConfigError::Invalid(
                "payout_interval must be positive".into(),
            ));
        }
        if self.governance.voting_period == 0 {
            return Err(ConfigError::Invalid("voting_period must be positive".into()));
        }
        if self.governance.max_proposed_value == 0 {
            return Err(ConfigError::Invalid(
                "max_proposed_value must be positive".into(),
            ));
        }
        if self.governance.max_proposed_value > MAX_PROPOSED_VALUE {
            return Err(ConfigError::Invalid(format!(
                "max_proposed_value must not exceed {MAX_PROPOSED_VALUE}"
            )));
        }
        if self.administrator == self.pool_account {
            return Err(ConfigError::Invalid(format!(
                "administrator and pool account must differ (both {})",
                self.administrator
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LedgerConfig::default();
        assert_eq!(config.policy.payout_amount, 1_000_000);
        assert_eq!(config.policy.payout_interval, 144);
        assert_eq!(config.governance.voting_period, 1_440);
        assert!(config.governance.pause_blocks_voting);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_interval() {
        let mut config = LedgerConfig::default();
        config.policy.payout_interval = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_max_value_above_ceiling() {
        let mut config = LedgerConfig::default();
        config.governance.max_proposed_value = MAX_PROPOSED_VALUE;
        assert!(config.validate().is_ok());

        config.governance.max_proposed_value = MAX_PROPOSED_VALUE + 1;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_admin_as_pool() {
        let config = LedgerConfig::with_administrator("ubi-pool");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("ubi-ledger-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            "administrator = \"council\"\n\n[policy]\npayout_amount = 250\n\n[governance]\npause_blocks_voting = false\n",
        )
        .unwrap();

        let config = LedgerConfig::load(path.to_str()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.administrator, Identity::new("council"));
        assert_eq!(config.policy.payout_amount, 250);
        assert_eq!(config.policy.payout_interval, 144);
        assert!(!config.governance.pause_blocks_voting);
    }

    #[test]
    fn test_partial_sections_deserialize() {
        let config: LedgerConfig =
            serde_json::from_str(r#"{"administrator":"council","policy":{"payout_amount":5}}"#)
                .unwrap();
        assert_eq!(config.policy.payout_amount, 5);
        assert_eq!(config.policy.minimum_reserve, DEFAULT_MINIMUM_RESERVE);
        assert_eq!(config.pool_account, Identity::new("ubi-pool"));
    }
}
