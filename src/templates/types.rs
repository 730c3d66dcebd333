use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// `{ident}` or `{ident?}` spanning the whole string.
static EXACT_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^\{([A-Za-z_][A-Za-z0-9_]*)(\?)?\}$").expect("placeholder pattern is valid")
});

/// `{ident}` or `{ident?}` markers embedded in surrounding text.
static EMBEDDED_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)(\?)?\}").expect("placeholder pattern is valid")
});

/// A piece of an interpolated string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
	Text(String),
	/// An unset optional marker contributes no text.
	Placeholder { name: String, optional: bool },
}

impl Segment {
	pub fn placeholder(name: impl Into<String>) -> Self {
		Segment::Placeholder {
			name: name.into(),
			optional: false,
		}
	}

	pub fn optional(name: impl Into<String>) -> Self {
		Segment::Placeholder {
			name: name.into(),
			optional: true,
		}
	}
}

/// One value in a template definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateValue {
	/// Fixed text, copied verbatim. Empty text renders a bare directive.
	Literal(String),

	/// `{name}` (required) or `{name?}` (optional) filling the whole value.
	Placeholder { name: String, optional: bool },

	/// Text with one or more embedded `{name}` or `{name?}` markers, e.g.
	/// `{ip}/{prefix}`.
	Interpolated(Vec<Segment>),

	/// Repeated sibling entries sharing the parent key.
	List(Vec<TemplateValue>),

	/// A nested block named by the parent key.
	Map(TemplateParams),
}

impl TemplateValue {
	/// Classify a string from a definition.
	pub fn from_text(text: &str) -> Self {
		if let Some(caps) = EXACT_PLACEHOLDER.captures(text) {
			return TemplateValue::Placeholder {
				name: caps[1].to_string(),
				optional: caps.get(2).is_some(),
			};
		}

		if !EMBEDDED_PLACEHOLDER.is_match(text) {
			return TemplateValue::Literal(text.to_string());
		}

		let mut segments = Vec::new();
		let mut last = 0;
		for caps in EMBEDDED_PLACEHOLDER.captures_iter(text) {
			let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
				continue;
			};
			if whole.start() > last {
				segments.push(Segment::Text(text[last..whole.start()].to_string()));
			}
			segments.push(Segment::Placeholder {
				name: name.as_str().to_string(),
				optional: caps.get(2).is_some(),
			});
			last = whole.end();
		}
		if last < text.len() {
			segments.push(Segment::Text(text[last..].to_string()));
		}

		TemplateValue::Interpolated(segments)
	}

	pub fn literal(value: impl ToString) -> Self {
		TemplateValue::Literal(value.to_string())
	}

	pub fn placeholder(name: impl Into<String>) -> Self {
		TemplateValue::Placeholder {
			name: name.into(),
			optional: false,
		}
	}

	pub fn optional(name: impl Into<String>) -> Self {
		TemplateValue::Placeholder {
			name: name.into(),
			optional: true,
		}
	}

	/// Every placeholder name referenced by this value, in definition order.
	///
	/// Placeholders in nested map keys are included.
	pub fn placeholders(&self) -> Vec<String> {
		let mut names = Vec::new();
		self.collect_placeholders(&mut names);
		names
	}

	fn collect_placeholders(&self, names: &mut Vec<String>) {
		match self {
			TemplateValue::Literal(_) => {}
			TemplateValue::Placeholder { name, .. } => names.push(name.clone()),
			TemplateValue::Interpolated(segments) => {
				for segment in segments {
					if let Segment::Placeholder { name, .. } = segment {
						names.push(name.clone());
					}
				}
			}
			TemplateValue::List(items) => {
				for item in items {
					item.collect_placeholders(names);
				}
			}
			TemplateValue::Map(params) => params.collect_placeholders(names),
		}
	}
}

impl From<&str> for TemplateValue {
	fn from(text: &str) -> Self {
		TemplateValue::from_text(text)
	}
}

impl From<String> for TemplateValue {
	fn from(text: String) -> Self {
		TemplateValue::from_text(&text)
	}
}

impl From<TemplateParams> for TemplateValue {
	fn from(params: TemplateParams) -> Self {
		TemplateValue::Map(params)
	}
}

impl From<Vec<TemplateValue>> for TemplateValue {
	fn from(items: Vec<TemplateValue>) -> Self {
		TemplateValue::List(items)
	}
}

/// Ordered `key -> value` entries; order decides the rendered order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateParams {
	entries: Vec<(String, TemplateValue)>,
}

impl TemplateParams {
	pub fn new() -> Self {
		Self::default()
	}

	/// Append an entry. String values are classified with
	/// [`TemplateValue::from_text`].
	pub fn with(mut self, key: impl Into<String>, value: impl Into<TemplateValue>) -> Self {
		self.insert(key, value);
		self
	}

	/// Insert or replace the entry for `key`, keeping its position on replace.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<TemplateValue>) {
		let key = key.into();
		let value = value.into();
		match self.entries.iter_mut().find(|(k, _)| *k == key) {
			Some((_, slot)) => *slot = value,
			None => self.entries.push((key, value)),
		}
	}

	pub fn get(&self, key: &str) -> Option<&TemplateValue> {
		self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(|(k, _)| k.as_str())
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &TemplateValue)> {
		self.entries.iter().map(|(k, v)| (k.as_str(), v))
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	fn collect_placeholders(&self, names: &mut Vec<String>) {
		for (key, value) in &self.entries {
			for word in key.split_whitespace() {
				TemplateValue::from_text(word).collect_placeholders(names);
			}
			value.collect_placeholders(names);
		}
	}
}

/// A named, reusable shape for one top-level block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDefinition {
	/// Name of the root block produced by materialization.
	pub block_type: String,

	/// Children of the root block.
	pub params: TemplateParams,

	/// Fallback values for placeholders the caller leaves unset.
	pub defaults: HashMap<String, String>,
}

impl TemplateDefinition {
	pub fn new(block_type: impl Into<String>, params: TemplateParams) -> Self {
		TemplateDefinition {
			block_type: block_type.into(),
			params,
			defaults: HashMap::new(),
		}
	}

	pub fn with_default(mut self, placeholder: impl Into<String>, value: impl Into<String>) -> Self {
		self.defaults.insert(placeholder.into(), value.into());
		self
	}

	/// Distinct placeholder names in definition order.
	pub fn placeholders(&self) -> Vec<String> {
		let mut names = Vec::new();
		self.params.collect_placeholders(&mut names);

		let mut seen: Vec<String> = Vec::new();
		for name in names {
			if !seen.contains(&name) {
				seen.push(name);
			}
		}
		seen
	}
}
