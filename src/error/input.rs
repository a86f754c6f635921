//! Input validation errors

use super::JarpatchError;

/// Creates an input validation error with a free-form message
pub fn invalid(message: impl Into<String>) -> JarpatchError {
    JarpatchError::InputValidation {
        message: message.into(),
    }
}

/// Creates an error for a path that should be a regular file
pub fn not_a_file(path: impl AsRef<str>) -> JarpatchError {
    invalid(format!("'{}' is not a file", path.as_ref()))
}

/// Creates an error for a path that should be a directory
pub fn not_a_directory(path: impl AsRef<str>) -> JarpatchError {
    invalid(format!("'{}' is not a directory", path.as_ref()))
}

/// Creates an error for an archive with an extension we do not handle
pub fn unsupported_extension(path: impl AsRef<str>) -> JarpatchError {
    invalid(format!(
        "'{}' is not a class archive (expected .jar, .zip, .war or .ear)",
        path.as_ref()
    ))
}

/// Creates an error for an archive or directory without any compiled class
pub fn no_classes(path: impl AsRef<str>) -> JarpatchError {
    invalid(format!("'{}' contains no compiled classes", path.as_ref()))
}
