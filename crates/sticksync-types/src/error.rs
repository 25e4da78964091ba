//! Error types and handling for StickSync
//!
//! This module provides the error handling system shared by every StickSync crate.
//! Filesystem failures are classified so that callers can tell an already-absent
//! entry (usually tolerated) apart from a real I/O failure (always propagated).

use std::path::{Path, PathBuf};

/// Error severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Low severity - operation can continue
    Low,
    /// Medium severity - the current directory is abandoned, siblings may continue
    Medium,
    /// High severity - the whole run should be aborted
    High,
    /// Critical severity - entire process should be terminated
    Critical,
}

/// Main error type for StickSync operations
#[derive(thiserror::Error, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        /// Error message from the I/O operation
        message: String,
    },

    /// A path expected to exist does not
    #[error("Path not found: {path}")]
    NotFound {
        /// Path that was not found
        path: PathBuf,
    },

    /// Permission denied
    #[error("Permission denied: {path}")]
    PermissionDenied {
        /// Path with permission issues
        path: PathBuf,
    },

    /// Source does not fit onto the destination volume
    #[error("Insufficient space: {required} bytes required, {available} bytes available")]
    InsufficientSpace {
        /// Bytes occupied by the source tree
        required: u64,
        /// Bytes free on the destination volume
        available: u64,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration issue
        message: String,
    },

    /// Volume or device query failed
    #[error("Device error: {message}")]
    Device {
        /// Error message describing the device issue
        message: String,
    },

    /// Synchronization error
    #[error("Synchronization error: {message}")]
    Sync {
        /// Error message describing the synchronization issue
        message: String,
    },
}

/// Error kind for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// I/O related errors
    Io,
    /// Missing path
    NotFound,
    /// Capacity preflight failure
    InsufficientSpace,
    /// Configuration errors
    Config,
    /// Device query errors
    Device,
    /// Synchronization errors
    Sync,
}

impl Error {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } | Self::PermissionDenied { .. } => ErrorKind::Io,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InsufficientSpace { .. } => ErrorKind::InsufficientSpace,
            Self::Config { .. } => ErrorKind::Config,
            Self::Device { .. } => ErrorKind::Device,
            Self::Sync { .. } => ErrorKind::Sync,
        }
    }

    /// Get the error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Io { .. } => ErrorSeverity::Medium,
            Self::NotFound { .. } => ErrorSeverity::Medium,
            Self::PermissionDenied { .. } => ErrorSeverity::Medium,
            Self::InsufficientSpace { .. } => ErrorSeverity::High,
            Self::Config { .. } => ErrorSeverity::High,
            Self::Device { .. } => ErrorSeverity::High,
            Self::Sync { .. } => ErrorSeverity::Medium,
        }
    }

    /// Check if a later re-run can be expected to get past this error
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io { message } => {
                message.contains("Interrupted")
                    || message.contains("WouldBlock")
                    || message.contains("TimedOut")
            }
            Self::NotFound { .. } | Self::Sync { .. } => true,
            Self::PermissionDenied { .. }
            | Self::InsufficientSpace { .. }
            | Self::Config { .. }
            | Self::Device { .. } => false,
        }
    }

    /// Check whether this error reports a missing path
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Classify an I/O error raised while operating on `path`
    ///
    /// `NotFound` and `PermissionDenied` keep the offending path; every other
    /// kind becomes [`Error::Io`] with the path in the message.
    pub fn from_io(error: std::io::Error, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => Self::Io {
                message: format!("{}: {}", path.display(), error),
            },
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new device error
    pub fn device<S: Into<String>>(message: S) -> Self {
        Self::Device {
            message: message.into(),
        }
    }

    /// Create a new sync error
    pub fn sync<S: Into<String>>(message: S) -> Self {
        Self::Sync {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    proptest! {
        #[test]
        fn test_error_kind_consistency(message in ".*") {
            let errors = vec![
                Error::Io { message: message.clone() },
                Error::Config { message: message.clone() },
                Error::Device { message: message.clone() },
                Error::Sync { message: message.clone() },
            ];

            for error in errors {
                let kind = error.kind();
                match error {
                    Error::Io { .. } => prop_assert_eq!(kind, ErrorKind::Io),
                    Error::Config { .. } => prop_assert_eq!(kind, ErrorKind::Config),
                    Error::Device { .. } => prop_assert_eq!(kind, ErrorKind::Device),
                    Error::Sync { .. } => prop_assert_eq!(kind, ErrorKind::Sync),
                    _ => {}
                }
            }
        }

        #[test]
        fn test_insufficient_space_reports_both_figures(
            required in 1u64..u64::MAX,
            available in 0u64..u64::MAX,
        ) {
            let error = Error::InsufficientSpace { required, available };
            let text = error.to_string();

            prop_assert!(text.contains(&required.to_string()));
            prop_assert!(text.contains(&available.to_string()));
            prop_assert_eq!(error.severity(), ErrorSeverity::High);
            prop_assert!(!error.is_recoverable());
        }
    }

    #[test]
    fn test_error_severity_ordering() {
        assert!(ErrorSeverity::Low < ErrorSeverity::Medium);
        assert!(ErrorSeverity::Medium < ErrorSeverity::High);
        assert!(ErrorSeverity::High < ErrorSeverity::Critical);
    }

    #[rstest]
    #[case(std::io::ErrorKind::NotFound, ErrorKind::NotFound)]
    #[case(std::io::ErrorKind::PermissionDenied, ErrorKind::Io)]
    #[case(std::io::ErrorKind::Other, ErrorKind::Io)]
    fn test_from_io_classification(
        #[case] io_kind: std::io::ErrorKind,
        #[case] expected: ErrorKind,
    ) {
        let error = Error::from_io(std::io::Error::new(io_kind, "boom"), "/stick/a.mp3");
        assert_eq!(error.kind(), expected);
        assert!(error.to_string().contains("/stick/a.mp3"));
    }

    #[test]
    fn test_not_found_is_tolerable() {
        let error = Error::from_io(
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            "/stick/.tmp/a.mp3",
        );
        assert!(error.is_not_found());
        assert!(error.is_recoverable());
    }

    #[test]
    fn test_permission_denied_is_not_recoverable() {
        let error = Error::PermissionDenied {
            path: PathBuf::from("/protected/file.mp3"),
        };

        assert!(!error.is_not_found());
        assert!(!error.is_recoverable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::Other, "device removed");
        let error = Error::from(io_error);

        assert_eq!(error.kind(), ErrorKind::Io);
        assert_eq!(error.severity(), ErrorSeverity::Medium);
        assert!(error.to_string().contains("device removed"));
    }
}
