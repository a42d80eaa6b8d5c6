//! Error types for waypoint-core
//!
//! Every variant is a start-up (configuration) error. Resolution misses,
//! such as an unmatched path or an unknown slug, are not errors.

use thiserror::Error;
use waypoint_router::TemplateError;

/// Result type alias for waypoint operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the routing engine
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed path template
    #[error("Invalid template: {0}")]
    Template(#[from] TemplateError),

    /// `map` called with an empty key
    #[error("Route key must not be empty")]
    EmptyRouteKey,

    /// `map_slug` called with an empty key
    #[error("Slug key must not be empty")]
    EmptySlugKey,

    /// Named route not registered
    #[error("Unknown route: {0}")]
    UnknownRoute(String),

    /// Configuration parse or validation failure
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Reading a configuration file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}
