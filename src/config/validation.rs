//! Configuration validation.

use super::defaults::MAX_RESOLVE_LIMIT;
use super::types::SbomConfig;
use crate::error::{Result, SbomError};
use crate::model::Organization;
use crate::serialize::OutputFormat;

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

impl Validatable for SbomConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.out_formats.is_empty() {
            errors.push(ConfigError::new("out_formats", "At least one format is required"));
        }
        for format in &self.out_formats {
            if format.parse::<OutputFormat>().is_err() {
                errors.push(ConfigError::new(
                    "out_formats",
                    format!("Unsupported format '{format}'. Valid options: json, xml"),
                ));
            }
        }

        if self.out_filename.trim().is_empty() {
            errors.push(ConfigError::new("out_filename", "File name must not be empty"));
        } else if self.out_filename.contains(['/', '\\']) {
            errors.push(ConfigError::new(
                "out_filename",
                format!(
                    "File name '{}' must not contain path separators; use out_dir instead",
                    self.out_filename
                ),
            ));
        }

        if self.out_dir.is_absolute() {
            errors.push(ConfigError::new(
                "out_dir",
                format!(
                    "Must be relative to the output directory, got {}",
                    self.out_dir.display()
                ),
            ));
        }

        if self.resolve_limit > MAX_RESOLVE_LIMIT {
            errors.push(ConfigError::new(
                "resolve_limit",
                format!(
                    "Must be at most {MAX_RESOLVE_LIMIT}, got {}",
                    self.resolve_limit
                ),
            ));
        }

        if let Some(supplier) = &self.supplier {
            errors.extend(supplier.validate());
        }

        for (i, property) in self.properties.iter().enumerate() {
            if property.name.trim().is_empty() {
                errors.push(ConfigError::new(
                    format!("properties[{i}].name"),
                    "Property name must not be empty",
                ));
            }
        }

        errors
    }
}

impl Validatable for Organization {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.name.is_none() && self.urls.is_empty() {
            errors.push(ConfigError::new(
                "supplier",
                "Supplier needs a name or at least one URL",
            ));
        }
        for (i, contact) in self.contacts.iter().enumerate() {
            if contact.name.is_none() && contact.email.is_none() && contact.phone.is_none() {
                errors.push(ConfigError::new(
                    format!("supplier.contacts[{i}]"),
                    "Contact needs a name, email or phone",
                ));
            }
        }
        errors
    }
}

impl SbomConfig {
    /// Validate and turn the first problem into an [`SbomError`].
    ///
    /// Unknown output formats map to [`SbomError::UnsupportedOutputFormat`];
    /// everything else to [`SbomError::Config`].
    pub fn ensure_valid(&self) -> Result<()> {
        if let Some(unsupported) = self
            .out_formats
            .iter()
            .find(|f| f.parse::<OutputFormat>().is_err())
        {
            return Err(SbomError::UnsupportedOutputFormat(unsupported.clone()));
        }

        let errors = self.validate();
        if errors.is_empty() {
            return Ok(());
        }
        let message = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(SbomError::config(message))
    }
}
