use thiserror::Error;

#[derive(Debug, Error)]
pub enum SplineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Not initialized: {0}")]
    NotInitialized(String),

    #[error("Precondition violation: {0}")]
    PreconditionViolation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SplineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SplineError::NotInitialized("NURBS patch is not initialized".into());
        assert_eq!(
            err.to_string(),
            "Not initialized: NURBS patch is not initialized"
        );

        let err = SplineError::UnsupportedOperation("inverse evaluation".into());
        assert!(err.to_string().starts_with("Unsupported operation"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "sink closed");
        let err: SplineError = io.into();
        assert!(matches!(err, SplineError::Io(_)));
    }
}
