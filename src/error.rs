use thiserror::Error;

use crate::structs::AgentId;

#[derive(Error, Debug)]
pub enum CrowdError {
    #[error("invalid agent parameter `{name}`: {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("invalid wall dimension `{name}`: {value}")]
    InvalidWall { name: &'static str, value: f64 },

    #[error("invalid timestep: {0}")]
    InvalidTimestep(f64),

    #[error("agent {0} already exists")]
    DuplicateAgent(AgentId),

    #[error("unknown agent {0}")]
    UnknownAgent(AgentId),

    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CrowdError>;

/// Checks that `value` is finite and strictly positive.
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CrowdError::InvalidParameter {
            name,
            value,
            reason: "must be finite and > 0",
        })
    }
}

/// Checks that `value` is finite and not negative.
pub(crate) fn require_non_negative(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(CrowdError::InvalidParameter {
            name,
            value,
            reason: "must be finite and >= 0",
        })
    }
}
