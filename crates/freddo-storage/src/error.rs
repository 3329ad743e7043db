use freddo_core::error::FreddoError;

/// Errors from the image collection.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("image not found: {0}")]
    NotFound(String),
    #[error("invalid image name: {0}")]
    InvalidName(String),
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for FreddoError {
    fn from(err: StorageError) -> Self {
        FreddoError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_conversion() {
        let err = StorageError::NotFound("pizza.png".to_string());
        assert_eq!(err.to_string(), "image not found: pizza.png");

        let top: FreddoError = StorageError::InvalidName("../etc".to_string()).into();
        assert_eq!(top.to_string(), "Storage error: invalid image name: ../etc");
    }

    #[test]
    fn test_io_from() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StorageError = io.into();
        assert!(matches!(err, StorageError::Io(_)));
    }
}
