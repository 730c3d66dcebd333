//! Node location for keepconf.
//!
//! This module handles:
//! - Matching nodes by name and argument pattern
//! - Shallow, deep and path-based selection over a document tree

pub mod selector;

pub use selector::{
	CompiledSelector, Selector, compile_path, find_first, select, select_deep, select_path,
};
