//! Configuration validation.
//!
//! Checks the loaded configuration before any stage touches a file, so a bad
//! category list or scoring weight fails at startup rather than mid-session.

use std::collections::HashSet;
use thiserror::Error;

use crate::config::{AnnotationConfig, Config, ObservabilityConfig, SanitizerConfig, ScorerConfig};

/// Operator selectors are single digits.
pub const MAX_CATEGORIES: usize = 9;

/// Configuration validation error.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Configuration conflict: {reason}")]
    Conflict { reason: String },

    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trait for validatable configuration sections.
pub trait Validate {
    /// Validate this configuration section.
    fn validate(&self) -> ValidationResult<()>;
}

impl Config {
    /// Validate the entire configuration.
    pub fn validate(&self) -> ValidationResult<()> {
        let sections: [&dyn Validate; 4] = [
            &self.sanitizer,
            &self.scorer,
            &self.annotation,
            &self.observability,
        ];

        let mut errors: Vec<ValidationError> = sections
            .iter()
            .filter_map(|section| section.validate().err())
            .collect();

        if errors.is_empty() {
            Ok(())
        } else if errors.len() == 1 {
            Err(errors.remove(0))
        } else {
            Err(ValidationError::Multiple(errors))
        }
    }
}

impl Validate for SanitizerConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.removed_markers.iter().any(|m| m.is_empty()) {
            return Err(ValidationError::InvalidValue {
                field: "sanitizer.removed_markers".into(),
                reason: "markers must not be empty strings".into(),
            });
        }
        Ok(())
    }
}

impl Validate for ScorerConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.min_tokens == 0 {
            return Err(ValidationError::InvalidValue {
                field: "scorer.min_tokens".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.length_saturation == 0 {
            return Err(ValidationError::InvalidValue {
                field: "scorer.length_saturation".into(),
                reason: "must be at least 1".into(),
            });
        }

        let weights = [
            ("scorer.topical_weight", self.topical_weight),
            ("scorer.affect_weight", self.affect_weight),
            ("scorer.pronoun_weight", self.pronoun_weight),
        ];
        for (field, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ValidationError::InvalidValue {
                    field: field.into(),
                    reason: format!("must be a finite non-negative number, got {weight}"),
                });
            }
        }

        Ok(())
    }
}

impl Validate for AnnotationConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.categories.is_empty() {
            return Err(ValidationError::MissingField {
                field: "annotation.categories".into(),
            });
        }
        if self.categories.len() > MAX_CATEGORIES {
            return Err(ValidationError::InvalidValue {
                field: "annotation.categories".into(),
                reason: format!(
                    "at most {MAX_CATEGORIES} categories are supported, got {}",
                    self.categories.len()
                ),
            });
        }

        let mut names = HashSet::new();
        let mut files = HashSet::new();
        for (i, category) in self.categories.iter().enumerate() {
            if category.name.trim().is_empty() {
                return Err(ValidationError::MissingField {
                    field: format!("annotation.categories[{i}].name"),
                });
            }
            if category.file.as_os_str().is_empty() {
                return Err(ValidationError::MissingField {
                    field: format!("annotation.categories[{i}].file"),
                });
            }
            if !names.insert(category.name.as_str()) {
                return Err(ValidationError::Conflict {
                    reason: format!("category name '{}' is used twice", category.name),
                });
            }
            if !files.insert(category.file.as_path()) {
                return Err(ValidationError::Conflict {
                    reason: format!(
                        "bucket file {} is shared by two categories",
                        category.file.display()
                    ),
                });
            }
        }

        Ok(())
    }
}

impl Validate for ObservabilityConfig {
    fn validate(&self) -> ValidationResult<()> {
        match self.log_format.as_str() {
            "pretty" | "json" => Ok(()),
            other => Err(ValidationError::InvalidValue {
                field: "observability.log_format".into(),
                reason: format!("expected 'pretty' or 'json', got '{other}'"),
            }),
        }
    }
}
