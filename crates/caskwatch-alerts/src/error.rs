use thiserror::Error;

/// Errors returned while delivering an alert.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Live sending was requested without transport credentials.
    #[error("missing notifier configuration: {0}")]
    MissingConfig(&'static str),

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The mail API answered with a non-success status.
    #[error("mail API rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}
