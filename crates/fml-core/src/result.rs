//! Result type alias for FML operations

use crate::error::FmlError;

/// Standard Result type for FML operations
pub type Result<T> = std::result::Result<T, FmlError>;
