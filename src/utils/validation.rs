use crate::utils::error::{PortalError, Result};
use std::path::Path;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(PortalError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(PortalError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_directory(field_name: &str, path: &Path) -> Result<()> {
    validate_path(field_name, &path.to_string_lossy())?;

    if !path.is_dir() {
        return Err(PortalError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.display().to_string(),
            reason: "Not an existing directory".to_string(),
        });
    }

    Ok(())
}

/// A delimiter is exactly one character and never the quote character,
/// which the record reader reserves for quoted segments.
pub fn validate_delimiter(field_name: &str, delimiter: &str) -> Result<char> {
    let mut chars = delimiter.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return Err(PortalError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: delimiter.to_string(),
            reason: "Delimiter must be exactly one character".to_string(),
        });
    };

    if c == '"' || c == '\r' || c == '\n' {
        return Err(PortalError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: delimiter.to_string(),
            reason: "Delimiter cannot be a quote or line break".to_string(),
        });
    }

    Ok(c)
}
