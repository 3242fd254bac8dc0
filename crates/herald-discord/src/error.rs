use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscordError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Discord error {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("forum post name cannot be empty")]
    EmptyThreadName,

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
