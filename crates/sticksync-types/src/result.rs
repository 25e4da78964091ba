//! Result type alias for StickSync operations

use crate::Error;

/// Result type alias for StickSync operations
pub type Result<T> = std::result::Result<T, Error>;
