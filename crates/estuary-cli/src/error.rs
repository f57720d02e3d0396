use estuary_core::{EtlError, EtlErrorKind};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid parameter: {0}")]
    Parameter(String),

    #[error("unknown reference: {0}")]
    Reference(String),

    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    #[error("unexpected upstream shape: {0}")]
    Shape(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Parameter(_) => 2,
            Self::Reference(_) => 3,
            Self::Unavailable(_) => 4,
            Self::Shape(_) => 5,
            Self::Serialization(_) => 6,
            Self::Io(_) => 10,
        }
    }
}

impl From<EtlError> for CliError {
    fn from(error: EtlError) -> Self {
        let message = error.message().to_owned();
        match error.kind() {
            EtlErrorKind::InvalidParameter => Self::Parameter(message),
            EtlErrorKind::InvalidReference => Self::Reference(message),
            EtlErrorKind::UpstreamUnavailable => Self::Unavailable(message),
            EtlErrorKind::UpstreamShape => Self::Shape(message),
        }
    }
}
