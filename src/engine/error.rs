//! Engine errors.

use crate::tracking::ZoneId;

use super::config::ConfigError;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("no tracked zone with id {0}")]
    ZoneNotFound(ZoneId),

    #[error("invalid engine configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}
