use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemboxError {
    /// Carries the exact message returned to API callers.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ItemboxError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        ItemboxError::InvalidInput(msg.into())
    }

    pub fn message(&self) -> &str {
        match self {
            ItemboxError::InvalidInput(msg) => msg,
        }
    }
}
