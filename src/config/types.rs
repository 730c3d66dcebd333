use crate::error::{KeepconfError, Result};

/// A single `name value` directive.
///
/// The value is kept as an ordered list of tokens so that multi-token
/// directives (an address and its mask, a script and its arguments) keep
/// their token boundaries through a round trip. A param with no tokens is a
/// bare flag directive such as `nopreempt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
	name: String,
	tokens: Vec<String>,
}

impl Param {
	/// Create a param, splitting `value` on whitespace.
	///
	/// An empty value yields a bare directive. An empty name is rejected.
	pub fn new(name: impl Into<String>, value: impl AsRef<str>) -> Result<Self> {
		Self::from_tokens(name, value.as_ref().split_whitespace().map(str::to_string))
	}

	/// Create a param from already tokenized values; tokens are kept verbatim.
	pub fn from_tokens<I, S>(name: impl Into<String>, tokens: I) -> Result<Self>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Ok(Param {
			name: checked_name(name.into())?,
			tokens: tokens.into_iter().map(Into::into).collect(),
		})
	}

	/// Create a bare flag directive.
	pub fn flag(name: impl Into<String>) -> Result<Self> {
		Self::from_tokens(name, Vec::<String>::new())
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// The value tokens joined by single spaces.
	pub fn value(&self) -> String {
		self.tokens.join(" ")
	}

	pub fn tokens(&self) -> &[String] {
		&self.tokens
	}

	/// True for directives without a value token.
	pub fn is_flag(&self) -> bool {
		self.tokens.is_empty()
	}
}

/// A named, brace-delimited section owning an ordered list of children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
	name: String,
	arguments: Vec<String>,
	children: Vec<Node>,
}

impl Block {
	/// Create an empty block. An empty name is rejected.
	pub fn new<I, S>(name: impl Into<String>, arguments: I) -> Result<Self>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Ok(Block {
			name: checked_name(name.into())?,
			arguments: arguments.into_iter().map(Into::into).collect(),
			children: Vec::new(),
		})
	}

	/// A block without header arguments.
	pub fn named(name: impl Into<String>) -> Result<Self> {
		Self::new(name, Vec::<String>::new())
	}

	/// Builder-style append, handy when assembling trees by hand.
	pub fn with(mut self, node: impl Into<Node>) -> Self {
		self.children.push(node.into());
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn arguments(&self) -> &[String] {
		&self.arguments
	}

	/// Header arguments joined by single spaces.
	pub fn arguments_str(&self) -> String {
		self.arguments.join(" ")
	}
}

fn checked_name(name: String) -> Result<String> {
	if name.is_empty() {
		return Err(KeepconfError::EmptyName);
	}
	Ok(name)
}

/// A child of a [`Block`] or a top-level entry of a [`Document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
	Param(Param),
	Block(Block),
}

impl Node {
	pub fn name(&self) -> &str {
		match self {
			Node::Param(param) => param.name(),
			Node::Block(block) => block.name(),
		}
	}

	/// Header arguments; params have none.
	pub fn arguments(&self) -> &[String] {
		match self {
			Node::Param(_) => &[],
			Node::Block(block) => block.arguments(),
		}
	}

	pub fn as_param(&self) -> Option<&Param> {
		match self {
			Node::Param(param) => Some(param),
			Node::Block(_) => None,
		}
	}

	pub fn as_block(&self) -> Option<&Block> {
		match self {
			Node::Block(block) => Some(block),
			Node::Param(_) => None,
		}
	}

	pub fn as_block_mut(&mut self) -> Option<&mut Block> {
		match self {
			Node::Block(block) => Some(block),
			Node::Param(_) => None,
		}
	}

	pub fn is_block(&self) -> bool {
		matches!(self, Node::Block(_))
	}
}

impl From<Param> for Node {
	fn from(param: Param) -> Self {
		Node::Param(param)
	}
}

impl From<Block> for Node {
	fn from(block: Block) -> Self {
		Node::Block(block)
	}
}

/// Root container: the ordered top-level entries of a configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
	entries: Vec<Node>,
}

impl Document {
	pub fn new() -> Self {
		Self::default()
	}

	/// Top-level blocks, skipping params.
	pub fn blocks(&self) -> impl Iterator<Item = &Block> {
		self.entries.iter().filter_map(Node::as_block)
	}
}

impl From<Vec<Node>> for Document {
	fn from(entries: Vec<Node>) -> Self {
		Document { entries }
	}
}

/// Shared child-list operations for [`Block`] and [`Document`].
///
/// This is the surface external managers use to locate and mutate
/// particular sections, e.g. a `virtual_server` block by its address and
/// port arguments.
pub trait Container {
	fn children(&self) -> &[Node];

	fn children_mut(&mut self) -> &mut Vec<Node>;

	fn push(&mut self, node: impl Into<Node>) {
		self.children_mut().push(node.into());
	}

	fn len(&self) -> usize {
		self.children().len()
	}

	fn is_empty(&self) -> bool {
		self.children().is_empty()
	}

	/// First child with the given name.
	fn find(&self, name: &str) -> Option<&Node> {
		self.children().iter().find(|node| node.name() == name)
	}

	/// All children with the given name, in order.
	fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
		self.children().iter().filter(move |node| node.name() == name)
	}

	fn find_param(&self, name: &str) -> Option<&Param> {
		self.children()
			.iter()
			.filter_map(Node::as_param)
			.find(|param| param.name() == name)
	}

	/// First block named `name` whose arguments equal `arguments` exactly.
	fn find_block(&self, name: &str, arguments: &[&str]) -> Option<&Block> {
		self.children()
			.iter()
			.filter_map(Node::as_block)
			.find(|block| block.name() == name && block.arguments() == arguments)
	}

	fn find_block_mut(&mut self, name: &str, arguments: &[&str]) -> Option<&mut Block> {
		self.children_mut()
			.iter_mut()
			.filter_map(Node::as_block_mut)
			.find(|block| block.name() == name && block.arguments() == arguments)
	}

	/// Position of a child, used for removal by identity.
	fn position(&self, predicate: impl Fn(&Node) -> bool) -> Option<usize> {
		self.children().iter().position(predicate)
	}

	fn remove_at(&mut self, index: usize) -> Option<Node> {
		if index < self.len() {
			Some(self.children_mut().remove(index))
		} else {
			None
		}
	}

	/// Remove every child named `name` whose arguments satisfy `predicate`.
	///
	/// Returns the removed nodes in their original order.
	fn remove_where(&mut self, name: &str, predicate: impl Fn(&[String]) -> bool) -> Vec<Node> {
		let (removed, kept): (Vec<Node>, Vec<Node>) = std::mem::take(self.children_mut())
			.into_iter()
			.partition(|node| node.name() == name && predicate(node.arguments()));
		*self.children_mut() = kept;
		removed
	}

	/// Replace the first param named `name`, keeping its position, or append
	/// a new one.
	fn set_param(&mut self, name: &str, value: &str) -> Result<()> {
		let replacement = Node::Param(Param::new(name, value)?);
		let children = self.children_mut();
		match children
			.iter()
			.position(|node| matches!(node, Node::Param(p) if p.name() == name))
		{
			Some(index) => children[index] = replacement,
			None => children.push(replacement),
		}
		Ok(())
	}
}

impl Container for Block {
	fn children(&self) -> &[Node] {
		&self.children
	}

	fn children_mut(&mut self) -> &mut Vec<Node> {
		&mut self.children
	}
}

impl Container for Document {
	fn children(&self) -> &[Node] {
		&self.entries
	}

	fn children_mut(&mut self) -> &mut Vec<Node> {
		&mut self.entries
	}
}
