//! Layered configuration.
//!
//! Sources are merged in order, later ones winning:
//!
//! 1. built-in defaults
//! 2. a TOML file (`waterspout.toml` unless another path is given)
//! 3. `WATERSPOUT_`-prefixed environment variables, with `__` between
//!    section and key (`WATERSPOUT_DISPATCH__TIER=sse2`)
//!
//! ```toml
//! [dispatch]
//! tier = "auto"
//! allow_fallback = true
//!
//! [logging]
//! level = "info"
//! ```

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tier::TierSelector;

/// Default configuration file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "waterspout.toml";

/// Prefix of the environment variables that override file settings.
pub const ENV_PREFIX: &str = "WATERSPOUT_";

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterspoutConfig {
    /// Tier selection.
    pub dispatch: DispatchConfig,
    /// Log output.
    pub logging: LoggingConfig,
}

/// The `[dispatch]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// `"auto"` or a tier name such as `"sse2"`.
    pub tier: TierSelector,
    /// Permit a less capable tier when the forced one is unavailable.
    pub allow_fallback: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            tier: TierSelector::Auto,
            allow_fallback: true,
        }
    }
}

/// The `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl WaterspoutConfig {
    /// Loads from `waterspout.toml` and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Loads from `path` and the environment. A missing file is not an error.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::figment(path).extract()?;
        Ok(config)
    }

    /// The provider stack, for callers that want to merge more sources.
    #[must_use]
    pub fn figment(path: impl AsRef<Path>) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}
