//! Archive errors

use super::JarpatchError;

/// Creates an extraction failure for the given archive
pub fn extraction_failed(path: impl Into<String>, reason: impl Into<String>) -> JarpatchError {
    JarpatchError::ExtractionFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a packaging failure
pub fn packaging_failed(reason: impl Into<String>) -> JarpatchError {
    JarpatchError::PackagingFailed {
        reason: reason.into(),
    }
}
