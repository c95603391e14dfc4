//! Error types for the digest pipeline.

/// Top-level error type for the digest run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Mail store error: {0}")]
    Store(#[from] StoreError),

    #[error("Summarizer error: {0}")]
    Summarizer(#[from] SummarizerError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),
}

/// Configuration-related errors, reported before the pipeline runs.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Mail-store errors.
///
/// Connection-level variants are fatal to a scan; per-message fetch
/// failures are reported as `CommandFailed` and skipped by the scanner.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Connection to {host} failed: {reason}")]
    ConnectFailed { host: String, reason: String },

    #[error("TLS setup failed: {0}")]
    Tls(String),

    #[error("Login rejected: {0}")]
    LoginFailed(String),

    #[error("{command} failed: {reason}")]
    CommandFailed { command: String, reason: String },

    #[error("Connection closed by server")]
    ConnectionClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// AI summarization collaborator errors. Any of these degrades the run
/// to the fallback classifier report rather than aborting it.
#[derive(Debug, thiserror::Error)]
pub enum SummarizerError {
    #[error("Request to {provider} failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("{provider} returned no usable content")]
    EmptyResponse { provider: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Outbound report delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build message: {0}")]
    BuildFailed(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),

    #[error("SMTP send failed: {0}")]
    SendFailed(String),
}
