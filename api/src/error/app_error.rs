use thiserror::Error;

/// Errors raised while handling a request.
///
/// Only [`AppError::User`] is meant for the client: it carries the message
/// to show and the HTTP status to answer with. Everything else is internal
/// and gets the default error response.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{message}")]
    User { message: String, status_code: u16 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn user<S: Into<String>>(message: S, status_code: u16) -> Self {
        AppError::User {
            message: message.into(),
            status_code,
        }
    }

    pub fn is_user_facing(&self) -> bool {
        matches!(self, AppError::User { .. })
    }
}
