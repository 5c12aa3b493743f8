// Copyright 2026 Splice-Orc Contributors
// SPDX-License-Identifier: Apache-2.0

//! Validation for names that end up in cluster objects or manager URLs.
//!
//! Module identifiers are interpolated into manager request paths, so they
//! are restricted to dotted identifiers before any request is sent.

/// Maximum allowed length for string fields.
pub const MAX_FIELD_LENGTH: usize = 256;

/// RFC 1123 label limit.
const MAX_RESOURCE_NAME_LENGTH: usize = 63;

/// Validation error types.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Resource name is not a valid RFC 1123 label.
    InvalidResourceName { field: String, reason: String },
    /// Image reference is invalid.
    InvalidImage(String),
    /// Module identifier is not a dotted identifier.
    InvalidModuleId(String),
    /// Field exceeds maximum length.
    MaxLengthExceeded { field: String, max: usize },
    /// Field is empty but required.
    EmptyField(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidResourceName { field, reason } => {
                write!(f, "Invalid resource name for '{}': {}", field, reason)
            }
            Self::InvalidImage(img) => write!(f, "Invalid image reference: {}", img),
            Self::InvalidModuleId(id) => write!(f, "Invalid module identifier: {}", id),
            Self::MaxLengthExceeded { field, max } => {
                write!(f, "Field '{}' exceeds maximum length of {}", field, max)
            }
            Self::EmptyField(field) => write!(f, "Field '{}' cannot be empty", field),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate a namespaced object name (RFC 1123 label).
pub fn validate_resource_name(name: &str, field_name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyField(field_name.to_string()));
    }

    if name.len() > MAX_RESOURCE_NAME_LENGTH {
        return Err(ValidationError::MaxLengthExceeded {
            field: field_name.to_string(),
            max: MAX_RESOURCE_NAME_LENGTH,
        });
    }

    let invalid = |reason: &str| ValidationError::InvalidResourceName {
        field: field_name.to_string(),
        reason: reason.to_string(),
    };

    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(invalid("only lowercase alphanumerics and '-' are allowed"));
    }

    if name.starts_with('-') || name.ends_with('-') {
        return Err(invalid("must start and end with an alphanumeric character"));
    }

    Ok(())
}

/// Validate a container image reference.
///
/// Rejects shell metacharacters and invalid name formats.
pub fn validate_image(image: &str) -> Result<(), ValidationError> {
    if image.is_empty() {
        return Err(ValidationError::EmptyField("image".to_string()));
    }

    if image.len() > MAX_FIELD_LENGTH {
        return Err(ValidationError::MaxLengthExceeded {
            field: "image".to_string(),
            max: MAX_FIELD_LENGTH,
        });
    }

    if let Some(ch) = image
        .chars()
        .find(|c| c.is_whitespace() || matches!(c, ';' | '&' | '|' | '`' | '$' | '<' | '>'))
    {
        return Err(ValidationError::InvalidImage(format!(
            "contains forbidden character: {:?}",
            ch
        )));
    }

    if image.starts_with('-') || image.starts_with('.') {
        return Err(ValidationError::InvalidImage(
            "name cannot start with dash or dot".to_string(),
        ));
    }

    Ok(())
}

/// Validate a module identifier such as `numpy` or `pkg.sub_mod`.
///
/// Each dot-separated segment must be an identifier: a letter or underscore
/// followed by letters, digits or underscores.
pub fn validate_module_id(module_id: &str) -> Result<(), ValidationError> {
    if module_id.is_empty() {
        return Err(ValidationError::EmptyField("module_id".to_string()));
    }

    if module_id.len() > MAX_FIELD_LENGTH {
        return Err(ValidationError::MaxLengthExceeded {
            field: "module_id".to_string(),
            max: MAX_FIELD_LENGTH,
        });
    }

    let valid_segment = |segment: &str| {
        let mut chars = segment.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() || first == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        }
    };

    if !module_id.split('.').all(valid_segment) {
        return Err(ValidationError::InvalidModuleId(format!(
            "'{}' must be dot-separated identifiers",
            module_id
        )));
    }

    Ok(())
}
