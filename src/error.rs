pub type RibwireResult<T> = Result<T, RibwireError>;

#[derive(thiserror::Error, Debug)]
pub enum RibwireError {
    /// Buffer growth failed. Aborts the current object's export; already
    /// recorded sibling objects stay valid.
    #[error("allocation error: {0}")]
    Allocation(String),

    #[error("validation error: {0}")]
    Validation(String),

    /// A registered object generator failed. Recoverable: the exporter
    /// warns and skips that one object.
    #[error("generator error: {0}")]
    Plugin(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RibwireError {
    pub fn allocation(msg: impl Into<String>) -> Self {
        Self::Allocation(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn plugin(msg: impl Into<String>) -> Self {
        Self::Plugin(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
