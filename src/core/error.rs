use thiserror::Error;

use crate::core::types::{AgentId, HerdId};

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Agent not found: {0}")]
    AgentNotFound(AgentId),

    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("{agent} is not the leader of {herd}")]
    NotHerdLeader { herd: HerdId, agent: AgentId },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
