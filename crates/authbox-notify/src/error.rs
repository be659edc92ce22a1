use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification base URL cannot carry path segments")]
    BadBase,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("delivery rejected: status {0}")]
    Status(u16),
}
