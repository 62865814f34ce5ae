use std::path::PathBuf;

use checkout::{MerchantProfile, PollPolicy};
use common_utils::consts;
use domain_types::types::{ApiSettings, BakongSettings, Proxy};

use crate::{error::ConfigurationError, logger::config::Log};

#[derive(Clone, serde::Deserialize, Debug)]
pub struct Config {
    pub common: Common,
    #[serde(default)]
    pub log: Log,
    pub api: ApiSettings,
    #[serde(default)]
    pub proxy: Proxy,
    #[serde(default)]
    pub bakong: Option<BakongSettings>,
    #[serde(default)]
    pub verification: VerificationSource,
    pub merchant: MerchantProfile,
    #[serde(default)]
    pub poll: PollPolicy,
}

#[derive(Clone, serde::Deserialize, Debug)]
pub struct Common {
    pub environment: consts::Env,
}

/// Who answers the payment verification calls
#[derive(Clone, Copy, serde::Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VerificationSource {
    /// The cafe backend `sales/verify-khqr` endpoint
    #[default]
    Backend,
    /// The Bakong open API, queried directly with the configured token
    Bakong,
}

impl Config {
    /// Function to build the configuration by picking it from default locations
    pub fn new() -> Result<Self, ConfigurationError> {
        Self::new_with_config_path(None)
    }

    /// Function to build the configuration from an explicit file, falling back to default locations
    pub fn new_with_config_path(
        explicit_config_path: Option<PathBuf>,
    ) -> Result<Self, ConfigurationError> {
        let env = consts::Env::current_env();
        let config_path = Self::config_path(env, explicit_config_path);

        let config = Self::builder(env)?
            .add_source(config::File::from(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(consts::ENV_PREFIX)
                    .try_parsing(true)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("proxy.bypass_proxy_urls"),
            )
            .build()?;

        #[allow(clippy::print_stderr)]
        let config: Self = serde_path_to_error::deserialize(config).map_err(|error| {
            eprintln!("Unable to deserialize application configuration: {error}");
            error.into_inner()
        })?;

        config.validate()?;

        Ok(config)
    }

    pub fn builder(
        environment: consts::Env,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        config::Config::builder()
            // "env" can't be altered by config field.
            .set_override("env", environment.to_string())
    }

    /// Config path.
    pub fn config_path(environment: consts::Env, explicit_config_path: Option<PathBuf>) -> PathBuf {
        let mut config_path = PathBuf::new();
        if let Some(explicit_config_path_val) = explicit_config_path {
            config_path.push(explicit_config_path_val);
        } else {
            config_path.push(workspace_path());
            config_path.push("config");
            config_path.push(environment.config_path());
        }
        config_path
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.api.base_url.path().ends_with('/') {
            return Err(ConfigurationError::Invalid(
                "api.base_url must end with a slash".to_string(),
            ));
        }
        if self.verification == VerificationSource::Bakong && self.bakong.is_none() {
            return Err(ConfigurationError::Invalid(
                "verification = \"bakong\" requires a [bakong] section".to_string(),
            ));
        }
        if self.poll.interval.is_zero() {
            return Err(ConfigurationError::Invalid(
                "poll.interval must be at least one second".to_string(),
            ));
        }
        self.merchant
            .bank()
            .map_err(|error| ConfigurationError::Invalid(format!("merchant.bank_code: {error}")))?;
        Ok(())
    }
}

pub fn workspace_path() -> PathBuf {
    if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
        let mut path = PathBuf::from(manifest_dir);
        path.pop();
        path.pop();
        path
    } else {
        PathBuf::from(".")
    }
}
