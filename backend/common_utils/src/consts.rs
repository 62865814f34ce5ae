//! Commonly used constants

/// Prefix of the environment variables that override configuration values
pub const ENV_PREFIX: &str = "CAFE";

/// Environment variable holding the run environment
pub const RUN_ENV: &str = "CAFE_ENV";

/// Default interval between two payment verification calls
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 3;

/// Prefix of the generated bill numbers
pub const BILL_NUMBER_PREFIX: &str = "CAFE";

/// Application environment.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Env {
    #[default]
    Development,
    Sandbox,
    Production,
}

impl Env {
    /// Environment selected through [`RUN_ENV`], falling back to the build profile
    pub fn current_env() -> Self {
        std::env::var(RUN_ENV)
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(if cfg!(debug_assertions) {
                Self::Development
            } else {
                Self::Production
            })
    }

    pub const fn config_path(self) -> &'static str {
        match self {
            Self::Development => "development.toml",
            Self::Sandbox => "sandbox.toml",
            Self::Production => "production.toml",
        }
    }
}
