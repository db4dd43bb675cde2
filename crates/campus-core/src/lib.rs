//! Campus Core Library
//!
//! This crate provides the domain models, error types, configuration, role
//! capabilities and form validation shared by the Campus API client, the
//! course editor and the command-line front-end.

pub mod capabilities;
pub mod config;
pub mod content_type;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use capabilities::{navigation_for, Capabilities, NavItem, Screen};
pub use config::Config;
pub use content_type::content_type_for_filename;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::Role;
