//! Template engine for keepconf.
//!
//! This module handles:
//! - Template definitions with required and optional placeholders
//! - A thread-safe registry of named definitions
//! - Materializing definitions into document trees
//! - Built-in keepalived definitions and TOML definition files

pub mod builtin;
pub mod loader;
pub mod materialize;
pub mod registry;
pub mod types;

pub use builtin::builtin_templates;
pub use loader::{
	load_template_file, load_user_templates, parse_template_str, register_all, user_templates_path,
};
pub use materialize::{SubstitutionValue, Substitutions, materialize, parse_assignment};
pub use registry::TemplateRegistry;
pub use types::{Segment, TemplateDefinition, TemplateParams, TemplateValue};
