use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure taxonomy shared by the record store, the backend client and the
/// credential/config files. Nothing is retried: the caller reports and gives up.
#[derive(Debug, Error)]
pub enum Error {
    /// A required field is missing or out of range. Nothing was persisted or sent.
    #[error("invalid record: {0}")]
    Validation(String),

    #[error("local store error: {0}")]
    Persistence(String),

    #[error("local store error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered, but not with a success status.
    #[error("backend returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("unexpected response from backend: {0}")]
    BadResponse(String),

    #[error("not logged in (run `fitlog auth login` first)")]
    NotLoggedIn,

    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_) | Self::Database(_))
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Api { .. } | Self::BadResponse(_))
    }
}
