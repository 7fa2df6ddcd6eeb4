use thiserror::Error;

/// Conditions that stop the whole run.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FatalError {
    #[error("could not fetch API token, is the cookie still valid?")]
    TokenNotFound,
    #[error("could not list existing emoji: {0}")]
    InventoryFailed(String),
    #[error("uploading `{name}` failed: {error}")]
    UploadFailed { name: String, error: String },
    #[error("gave up on `{name}` after being rate limited {attempts} times")]
    RateLimitRetriesExhausted { name: String, attempts: u32 },
}
