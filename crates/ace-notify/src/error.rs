/// Errors that can occur within the notification subsystem.
///
/// # Examples
///
/// ```rust
/// use ace_notify::error::NotifyError;
///
/// let err = NotifyError::InvalidConfig("missing smtp_host".to_string());
/// assert!(err.to_string().contains("smtp_host"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Channel configuration is missing a required field or contains an
    /// invalid value.
    #[error("Notify: invalid channel configuration: {0}")]
    InvalidConfig(String),

    /// The channel type is not registered in the plugin registry.
    #[error("Notify: unknown channel type '{0}'")]
    UnknownChannelType(String),

    /// A recipient or sender address failed to parse.
    #[error("Notify: invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// SMTP transport error when sending email.
    #[error("Notify: SMTP error: {0}")]
    Smtp(String),

    /// JSON serialization or deserialization failed (channel config parsing).
    #[error("Notify: JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Rendering a mail template failed.
    #[error("Notify: template rendering error: {0}")]
    Template(String),

    /// Generic notification error for cases not covered by other variants.
    #[error("Notify: {0}")]
    Other(String),
}

/// Convenience `Result` alias for notification operations.
pub type Result<T> = std::result::Result<T, NotifyError>;
