use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("missing required setting {0}")]
    MissingSetting(&'static str),

    #[error("invalid value for {name}: {reason}")]
    InvalidSetting { name: &'static str, reason: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
