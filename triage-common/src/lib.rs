//! Triage Common - Shared types and utilities for the disclosure triage tools.
//!
//! This crate provides:
//! - Configuration types and loading
//! - Configuration validation
//! - Error types and handling utilities
//! - Logging setup and span helpers
//! - Small text utilities used by the pipeline and the CLI

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod logging;
pub mod util;
pub mod validation;

pub use config::{
    AnnotationConfig, CategoryConfig, Config, ObservabilityConfig, PathsConfig, SanitizerConfig,
    ScorerConfig,
};
pub use error::{Error, Result, ResultExt};
pub use validation::{Validate, ValidationError, ValidationResult};
