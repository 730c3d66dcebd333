//! Keepconf - parser, formatter and template engine for keepalived-style configuration.
//!
//! This library provides the core functionality for keepconf, including:
//! - Parsing the brace-delimited directive language into a Param / Block tree
//! - Canonical serialization that round-trips through the parser
//! - Named templates with placeholders, materialized into config blocks
//! - Locating nodes by name, argument pattern and path
//!
//! # Example
//!
//! ```no_run
//! use keepconf_cli::config::{Container, Render, parse_config_file};
//! use keepconf_cli::templates::{Substitutions, TemplateRegistry};
//! use std::path::Path;
//!
//! let mut doc = parse_config_file(Path::new("/etc/keepalived/keepalived.conf")).unwrap();
//!
//! let subs = Substitutions::new()
//!     .set("real_server_ip", "192.168.1.101")
//!     .set("real_server_port", 8080);
//! let generated = TemplateRegistry::global()
//!     .materialize("basic_virtual_server", &["192.168.1.100", "80"], &subs)
//!     .unwrap();
//!
//! for node in generated.children().iter().cloned() {
//!     doc.push(node);
//! }
//! println!("{}", doc.to_text(0));
//! ```

pub mod config;
pub mod error;
pub mod query;
pub mod templates;

pub use error::{KeepconfError, Result};
