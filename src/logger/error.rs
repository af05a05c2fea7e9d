use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("Cannot open log file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid logger configuration: {message}")]
    Config { message: String },

    #[error("Invalid log format: {message}")]
    Format { message: String },

    /// A global subscriber was installed before us.
    #[error(transparent)]
    AlreadyInitialized(#[from] tracing_subscriber::util::TryInitError),
}

impl LoggerError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }
}
