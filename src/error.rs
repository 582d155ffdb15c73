// MIT License - Copyright (c) 2026 lifesos-lan-bridge contributors

/// All errors that can occur in the lifesos-lan-bridge library.
#[derive(Debug, thiserror::Error)]
pub enum LifeSosError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection timeout")]
    ConnectionTimeout,

    #[error("Not connected to base unit")]
    NotConnected,

    #[error("Command timeout: {command}")]
    CommandTimeout { command: String },

    #[error("Command superseded by a newer '{command}' command")]
    CommandSuperseded { command: String },

    #[error("Invalid format: {details}")]
    InvalidFormat { details: String },

    #[error("Response not recognised: {text}")]
    ResponseNotRecognised { text: String },

    #[error("ContactID message length is invalid ({length})")]
    ContactIdLength { length: usize },

    #[error("ContactID message checksum failure")]
    ContactIdChecksum,

    #[error("ContactID message type ({message_type}) is invalid")]
    InvalidMessageType { message_type: u32 },

    #[error("Device event message length is invalid ({length})")]
    DeviceEventLength { length: usize },

    #[error("Unknown device: {device_id:06x}")]
    UnknownDevice { device_id: u32 },

    #[error("Device not found on base unit: {device_id:06x}")]
    DeviceNotFound { device_id: u32 },

    #[error("Unexpected response to {command}: {details}")]
    UnexpectedResponse { command: String, details: String },

    #[error("Channel closed")]
    ChannelClosed,
}

impl LifeSosError {
    /// Shorthand for a `InvalidFormat` error.
    pub fn format(details: impl Into<String>) -> Self {
        LifeSosError::InvalidFormat {
            details: details.into(),
        }
    }

    /// Whether this error is transient and the operation may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LifeSosError::Io(_)
                | LifeSosError::ConnectionTimeout
                | LifeSosError::CommandTimeout { .. }
                | LifeSosError::CommandSuperseded { .. }
                | LifeSosError::ChannelClosed
        )
    }
}

pub type Result<T> = std::result::Result<T, LifeSosError>;
