//! Document model, parsing and serialization for keepconf.
//!
//! This module handles:
//! - The Param / Block / Document tree
//! - Line-oriented parsing of the brace-delimited directive language
//! - Canonical rendering back to text

pub mod parser;
pub mod serializer;
pub mod types;

pub use parser::{parse, parse_config_file};
pub use serializer::{INDENT, Render, write_config_file};
pub use types::{Block, Container, Document, Node, Param};
