use crate::config::types::{Block, Container, Document, Node, Param};
use crate::error::{KeepconfError, Result};
use crate::templates::types::{Segment, TemplateDefinition, TemplateParams, TemplateValue};
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// A caller-supplied value for one placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubstitutionValue {
	Single(String),
	/// Fans out into one sibling entry per element.
	List(Vec<String>),
}

impl SubstitutionValue {
	/// Space-joined form, used inside interpolated strings.
	pub fn joined(&self) -> String {
		match self {
			SubstitutionValue::Single(value) => value.clone(),
			SubstitutionValue::List(values) => values.join(" "),
		}
	}
}

impl From<&str> for SubstitutionValue {
	fn from(value: &str) -> Self {
		SubstitutionValue::Single(value.to_string())
	}
}

impl From<String> for SubstitutionValue {
	fn from(value: String) -> Self {
		SubstitutionValue::Single(value)
	}
}

impl From<Vec<String>> for SubstitutionValue {
	fn from(values: Vec<String>) -> Self {
		SubstitutionValue::List(values)
	}
}

/// Placeholder values for one materialization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitutions {
	values: HashMap<String, SubstitutionValue>,
}

impl Substitutions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn set(mut self, key: impl Into<String>, value: impl ToString) -> Self {
		self.values
			.insert(key.into(), SubstitutionValue::Single(value.to_string()));
		self
	}

	pub fn set_list<I, S>(mut self, key: impl Into<String>, values: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: ToString,
	{
		let values = values.into_iter().map(|v| v.to_string()).collect();
		self.values.insert(key.into(), SubstitutionValue::List(values));
		self
	}

	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<SubstitutionValue>) {
		self.values.insert(key.into(), value.into());
	}

	/// Add a value, turning an existing entry for `key` into a list.
	pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
		let value = value.into();
		match self.values.entry(key.into()) {
			Entry::Vacant(slot) => {
				slot.insert(SubstitutionValue::Single(value));
			}
			Entry::Occupied(mut slot) => {
				let existing = slot.get_mut();
				match existing {
					SubstitutionValue::List(values) => values.push(value),
					SubstitutionValue::Single(first) => {
						let first = std::mem::take(first);
						*existing = SubstitutionValue::List(vec![first, value]);
					}
				}
			}
		}
	}

	/// Build from `KEY=VALUE` strings; a repeated key accumulates a list.
	pub fn from_assignments<I, S>(assignments: I) -> Result<Self>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut substitutions = Substitutions::new();
		for assignment in assignments {
			let (key, value) = parse_assignment(assignment.as_ref())?;
			substitutions.append(key, value);
		}
		Ok(substitutions)
	}

	pub fn get(&self, key: &str) -> Option<&SubstitutionValue> {
		self.values.get(key)
	}

	pub fn contains(&self, key: &str) -> bool {
		self.values.contains_key(key)
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}
}

/// Split `KEY=VALUE`; the value may be empty and may contain `=`.
pub fn parse_assignment(input: &str) -> Result<(String, String)> {
	match input.split_once('=') {
		Some((key, value)) if !key.trim().is_empty() => {
			Ok((key.trim().to_string(), value.to_string()))
		}
		_ => Err(KeepconfError::InvalidAssignment {
			input: input.to_string(),
		}),
	}
}

/// Walks a definition and builds the tree.
struct Materializer<'a> {
	template: &'a str,
	substitutions: &'a Substitutions,
	defaults: &'a HashMap<String, String>,
}

impl Materializer<'_> {
	/// Caller values win over definition defaults.
	fn resolve(&self, name: &str) -> Option<SubstitutionValue> {
		self.substitutions
			.get(name)
			.cloned()
			.or_else(|| self.defaults.get(name).cloned().map(SubstitutionValue::Single))
	}

	fn missing(&self, placeholder: &str) -> KeepconfError {
		KeepconfError::Placeholder {
			template: self.template.to_string(),
			placeholder: placeholder.to_string(),
		}
	}

	/// Text forms of a scalar value; a list substitution yields one per
	/// element and an unset optional placeholder yields none.
	fn expand(&self, value: &TemplateValue) -> Result<Vec<String>> {
		match value {
			TemplateValue::Literal(text) => Ok(vec![text.clone()]),
			TemplateValue::Placeholder { name, optional } => match self.resolve(name) {
				Some(SubstitutionValue::Single(text)) => Ok(vec![text]),
				Some(SubstitutionValue::List(items)) => Ok(items),
				None if *optional => Ok(Vec::new()),
				None => Err(self.missing(name)),
			},
			TemplateValue::Interpolated(segments) => {
				let mut text = String::new();
				for segment in segments {
					match segment {
						Segment::Text(part) => text.push_str(part),
						Segment::Placeholder { name, optional } => match self.resolve(name) {
							Some(resolved) => text.push_str(&resolved.joined()),
							None if *optional => {}
							None => return Err(self.missing(name)),
						},
					}
				}
				Ok(vec![text])
			}
			// Structured values have no text form
			TemplateValue::List(_) | TemplateValue::Map(_) => Ok(Vec::new()),
		}
	}

	/// Resolve an entry key into `(name, extra tokens)` pairs.
	///
	/// Keys may hold placeholders: `real_server {ip} {port}` yields a name
	/// plus header tokens, and an exact `{name}` key fans out over a list.
	fn expand_key(&self, key: &str) -> Result<Vec<(String, Vec<String>)>> {
		self.expand(&TemplateValue::from_text(key))?
			.into_iter()
			.map(|head| {
				let mut words = head.split_whitespace().map(str::to_string);
				let name = words.next().ok_or_else(|| KeepconfError::InvalidTemplate {
					name: self.template.to_string(),
					message: format!("entry '{key}' resolved to an empty name"),
				})?;
				Ok((name, words.collect()))
			})
			.collect()
	}

	fn emit_params(&self, params: &TemplateParams, parent: &mut Block) -> Result<()> {
		for (key, value) in params.iter() {
			self.emit(key, value, parent)?;
		}
		Ok(())
	}

	fn emit(&self, key: &str, value: &TemplateValue, parent: &mut Block) -> Result<()> {
		match value {
			TemplateValue::List(items) => {
				for item in items {
					self.emit(key, item, parent)?;
				}
			}
			TemplateValue::Map(params) => {
				for (name, arguments) in self.expand_key(key)? {
					let mut block = Block::new(name, arguments)?;
					self.emit_params(params, &mut block)?;
					if block.is_empty() && !params.is_empty() {
						tracing::debug!(template = self.template, block = key, "every entry omitted, dropping block");
					} else {
						parent.push(block);
					}
				}
			}
			TemplateValue::Literal(_) | TemplateValue::Placeholder { .. } | TemplateValue::Interpolated(_) => {
				if matches!(value, TemplateValue::Literal(_)) && self.substitutions.contains(key) {
					tracing::debug!(
						template = self.template,
						field = key,
						"literal field is pinned, ignoring substitution of the same name"
					);
				}

				let values = self.expand(value)?;
				if values.is_empty() {
					tracing::debug!(template = self.template, field = key, "optional placeholder unset, omitting");
					return Ok(());
				}

				for (name, leading) in self.expand_key(key)? {
					for text in &values {
						let tokens = leading
							.iter()
							.cloned()
							.chain(text.split_whitespace().map(str::to_string));
						parent.push(Param::from_tokens(name.clone(), tokens)?);
					}
				}
			}
		}
		Ok(())
	}
}

/// Build a document holding one block shaped by `definition`.
///
/// `template` names the definition in error messages; `arguments` become the
/// root block's header arguments, split on whitespace so `"10.0.0.1 80"` and
/// `["10.0.0.1", "80"]` build the same header.
pub fn materialize(
	template: &str,
	definition: &TemplateDefinition,
	arguments: &[&str],
	substitutions: &Substitutions,
) -> Result<Document> {
	if definition.block_type.is_empty() || definition.block_type.contains(char::is_whitespace) {
		return Err(KeepconfError::InvalidTemplate {
			name: template.to_string(),
			message: format!("block type must be a single word, got '{}'", definition.block_type),
		});
	}

	let materializer = Materializer {
		template,
		substitutions,
		defaults: &definition.defaults,
	};

	let mut root = Block::new(
		definition.block_type.as_str(),
		arguments.iter().flat_map(|argument| argument.split_whitespace()),
	)?;
	materializer.emit_params(&definition.params, &mut root)?;

	tracing::debug!(template, block = %definition.block_type, children = root.len(), "materialized template");
	Ok(Document::from(vec![Node::Block(root)]))
}
