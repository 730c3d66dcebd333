use crate::config::types::{Container, Node};
use crate::error::{KeepconfError, Result};
use regex::Regex;

/// Criteria for locating nodes, before compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
	/// Exact node name to match.
	pub name: Option<String>,

	/// Regex matched against the space-joined block arguments.
	pub args_pattern: Option<String>,
}

impl Selector {
	pub fn named(name: impl Into<String>) -> Self {
		Selector {
			name: Some(name.into()),
			args_pattern: None,
		}
	}

	pub fn with_args(mut self, pattern: impl Into<String>) -> Self {
		self.args_pattern = Some(pattern.into());
		self
	}
}

/// A selector ready for matching.
#[derive(Debug, Clone)]
pub struct CompiledSelector {
	/// The original selector.
	pub selector: Selector,

	/// Compiled arguments regex.
	pub args_regex: Option<Regex>,
}

impl CompiledSelector {
	pub fn compile(selector: &Selector) -> Result<Self> {
		let args_regex = selector
			.args_pattern
			.as_ref()
			.map(|p| compile_regex(p))
			.transpose()?;

		Ok(CompiledSelector {
			selector: selector.clone(),
			args_regex,
		})
	}

	/// Check if this selector matches the given node.
	pub fn matches(&self, node: &Node) -> bool {
		if let Some(ref name) = self.selector.name
			&& node.name() != name.as_str()
		{
			return false;
		}

		// Params have no arguments, so an argument pattern only ever matches blocks
		if let Some(ref regex) = self.args_regex {
			if !node.is_block() {
				return false;
			}
			let args = node.arguments().join(" ");
			if !regex.is_match(&args) {
				return false;
			}
		}

		true
	}
}

/// Compile a regex pattern string.
fn compile_regex(pattern: &str) -> Result<Regex> {
	Regex::new(pattern).map_err(|source| KeepconfError::InvalidRegex {
		pattern: pattern.to_string(),
		source,
	})
}

/// Compile a slash separated path such as `virtual_server/real_server`.
///
/// `args` applies to the last segment only. A `*` segment matches any name.
pub fn compile_path(path: &str, args: Option<&str>) -> Result<Vec<CompiledSelector>> {
	let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
	let last = segments.len().saturating_sub(1);

	segments
		.iter()
		.enumerate()
		.map(|(i, segment)| {
			let selector = Selector {
				name: (*segment != "*").then(|| segment.to_string()),
				args_pattern: if i == last { args.map(str::to_string) } else { None },
			};
			CompiledSelector::compile(&selector)
		})
		.collect()
}

/// Find the first direct child matching the selector.
pub fn find_first<'a, C: Container + ?Sized>(
	container: &'a C,
	selector: &CompiledSelector,
) -> Option<&'a Node> {
	container.children().iter().find(|node| selector.matches(node))
}

/// All direct children matching the selector, in document order.
pub fn select<'a, C: Container + ?Sized>(
	container: &'a C,
	selector: &CompiledSelector,
) -> Vec<&'a Node> {
	container
		.children()
		.iter()
		.filter(|node| selector.matches(node))
		.collect()
}

/// All descendants matching the selector, depth first in document order.
pub fn select_deep<'a, C: Container + ?Sized>(
	container: &'a C,
	selector: &CompiledSelector,
) -> Vec<&'a Node> {
	let mut found = Vec::new();
	collect_deep(container.children(), selector, &mut found);
	found
}

fn collect_deep<'a>(nodes: &'a [Node], selector: &CompiledSelector, found: &mut Vec<&'a Node>) {
	for node in nodes {
		if selector.matches(node) {
			found.push(node);
		}
		if let Node::Block(block) = node {
			collect_deep(block.children(), selector, found);
		}
	}
}

/// Walk a compiled path, one level per segment.
///
/// An empty path selects nothing.
pub fn select_path<'a, C: Container + ?Sized>(
	container: &'a C,
	path: &[CompiledSelector],
) -> Vec<&'a Node> {
	let Some((first, rest)) = path.split_first() else {
		return Vec::new();
	};

	let mut current = select(container, first);
	for selector in rest {
		current = current
			.into_iter()
			.filter_map(Node::as_block)
			.flat_map(|block| select(block, selector))
			.collect();
	}
	current
}
