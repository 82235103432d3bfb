//! Error types for the simulation core.
//!
//! Invalid configuration is rejected up front with [`ConfigError`]. Running
//! out of energy or money is not an error: dead agents are dropped from the
//! roster.

use forage_events::ShopId;

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading the config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing TOML
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Error writing TOML
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value is outside its allowed range
    #[error("invalid {field}: {reason}")]
    Invalid { field: String, reason: String },

    /// A setting references a shop that is not configured
    #[error("{field} references unknown shop '{shop}'")]
    UnknownShop { field: String, shop: ShopId },

    /// No agents would be spawned
    #[error("population is empty: configure at least one agent")]
    EmptyPopulation,
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while running the simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// An action named a shop the world does not have
    #[error("invalid action: unknown shop '{0}'")]
    InvalidAction(ShopId),

    /// The driver was used before its resources were set up
    #[error("missing simulation resource: {0}")]
    MissingResource(&'static str),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
