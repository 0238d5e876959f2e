//! Error types for waterspout-core.
//!
//! Buffer operations never fail once an [`Engine`](crate::Engine) exists;
//! everything here surfaces while building one.

use thiserror::Error;

use crate::tier::Tier;

/// Dispatcher construction and configuration errors.
#[derive(Error, Debug)]
pub enum Error {
    /// A tier was forced with fallback disabled, but this binary carries no
    /// code path for it.
    #[error("Tier {tier} is not compiled into this binary and fallback is disabled")]
    TierUnavailable {
        /// The tier that was requested.
        tier: Tier,
    },

    /// A tier name could not be parsed.
    #[error("Unknown tier: {0}")]
    InvalidTier(String),

    /// Configuration sources could not be merged or deserialized.
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

/// Result type alias for dispatcher construction.
pub type Result<T> = std::result::Result<T, Error>;
