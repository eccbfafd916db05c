use std::path::PathBuf;
use thiserror::Error;

/// Arborist error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    ConfigValidation(String),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Failed to parse index document: {0}")]
    IndexParse(String),

    #[error("Inconsistent entity tree: {0}")]
    Structure(String),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Arborist operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a config validation error
    pub fn config_validation(msg: impl Into<String>) -> Self {
        Error::ConfigValidation(msg.into())
    }

    /// Create an index parse error
    pub fn index_parse(msg: impl Into<String>) -> Self {
        Error::IndexParse(msg.into())
    }

    /// Create a structural inconsistency error
    pub fn structure(msg: impl Into<String>) -> Self {
        Error::Structure(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_path_not_found_display() {
        let err = Error::PathNotFound(PathBuf::from("/some/path"));
        assert_eq!(err.to_string(), "Path not found: /some/path");
    }

    #[test]
    fn test_config_validation_display() {
        let err = Error::config_validation("max_depth must be positive");
        assert_eq!(
            err.to_string(),
            "Config validation error: max_depth must be positive"
        );
    }

    #[test]
    fn test_index_parse_display() {
        let err = Error::index_parse("unexpected end of document");
        assert!(err.to_string().contains("Failed to parse index document"));
        assert!(err.to_string().contains("unexpected end of document"));
    }

    #[test]
    fn test_structure_error() {
        let err = Error::structure("`ns::Widget` has two owners");
        assert_eq!(
            err.to_string(),
            "Inconsistent entity tree: `ns::Widget` has two owners"
        );
    }

    #[test]
    fn test_other_error() {
        let err = Error::other("something went wrong");
        assert_eq!(err.to_string(), "something went wrong");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
