use crate::config::types::Document;
use crate::error::{KeepconfError, Result};
use crate::templates::builtin::builtin_templates;
use crate::templates::materialize::{Substitutions, materialize};
use crate::templates::types::TemplateDefinition;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::OnceLock;

static GLOBAL: OnceLock<TemplateRegistry> = OnceLock::new();

#[derive(Debug, Default)]
struct RegistryState {
	definitions: HashMap<String, TemplateDefinition>,
	/// Names in registration order.
	order: Vec<String>,
}

/// Named template definitions behind a single lock.
///
/// Readers (`exists`, `get`, `list`) share the lock; writers (`register`,
/// `update`, `unregister`) take it exclusively, so a definition is never
/// observed half-written. Materialization clones the definition and
/// releases the lock before building the tree.
#[derive(Debug, Default)]
pub struct TemplateRegistry {
	state: RwLock<RegistryState>,
}

impl TemplateRegistry {
	/// An empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// A registry pre-seeded with the built-in keepalived templates.
	pub fn with_builtins() -> Self {
		let registry = Self::new();
		{
			let mut state = registry.state.write();
			for (name, definition) in builtin_templates() {
				state.order.push(name.to_string());
				state.definitions.insert(name.to_string(), definition);
			}
		}
		registry
	}

	/// The process-wide registry, created with the built-ins on first use.
	pub fn global() -> &'static TemplateRegistry {
		GLOBAL.get_or_init(TemplateRegistry::with_builtins)
	}

	/// Add a new definition. Registering an existing name is an error.
	pub fn register(&self, name: &str, definition: TemplateDefinition) -> Result<()> {
		let mut state = self.state.write();
		if state.definitions.contains_key(name) {
			return Err(KeepconfError::TemplateExists {
				name: name.to_string(),
			});
		}

		state.order.push(name.to_string());
		state.definitions.insert(name.to_string(), definition);
		tracing::info!(template = name, "registered template");
		Ok(())
	}

	/// Add several definitions at once, or none of them.
	///
	/// Every name is checked against the registry and the rest of the batch
	/// before anything is inserted, all under one write lock.
	pub fn register_many(&self, templates: Vec<(String, TemplateDefinition)>) -> Result<usize> {
		let mut state = self.state.write();
		for (i, (name, _)) in templates.iter().enumerate() {
			let repeated = templates[..i].iter().any(|(earlier, _)| earlier == name);
			if repeated || state.definitions.contains_key(name) {
				return Err(KeepconfError::TemplateExists { name: name.clone() });
			}
		}

		let count = templates.len();
		for (name, definition) in templates {
			tracing::info!(template = %name, "registered template");
			state.order.push(name.clone());
			state.definitions.insert(name, definition);
		}
		Ok(count)
	}

	/// Replace an existing definition.
	pub fn update(&self, name: &str, definition: TemplateDefinition) -> Result<()> {
		let mut state = self.state.write();
		let slot = state
			.definitions
			.get_mut(name)
			.ok_or_else(|| KeepconfError::TemplateNotFound {
				name: name.to_string(),
			})?;

		*slot = definition;
		tracing::info!(template = name, "updated template");
		Ok(())
	}

	/// Remove a definition, reporting whether it was present.
	pub fn unregister(&self, name: &str) -> bool {
		let mut state = self.state.write();
		if state.definitions.remove(name).is_none() {
			return false;
		}

		state.order.retain(|n| n != name);
		tracing::info!(template = name, "unregistered template");
		true
	}

	pub fn exists(&self, name: &str) -> bool {
		self.state.read().definitions.contains_key(name)
	}

	/// Registered names in registration order.
	pub fn list(&self) -> Vec<String> {
		self.state.read().order.clone()
	}

	pub fn get(&self, name: &str) -> Result<TemplateDefinition> {
		self.state
			.read()
			.definitions
			.get(name)
			.cloned()
			.ok_or_else(|| KeepconfError::TemplateNotFound {
				name: name.to_string(),
			})
	}

	/// Build a document from the named template.
	pub fn materialize(
		&self,
		name: &str,
		arguments: &[&str],
		substitutions: &Substitutions,
	) -> Result<Document> {
		let definition = self.get(name)?;
		materialize(name, &definition, arguments, substitutions)
	}
}
