use crate::error::{KeepconfError, Result};
use crate::templates::registry::TemplateRegistry;
use crate::templates::types::{TemplateDefinition, TemplateParams, TemplateValue};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One template as written in a definition file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTemplate {
	/// Name of the root block.
	#[serde(rename = "type")]
	block_type: String,

	#[serde(default)]
	params: toml::Table,

	#[serde(default)]
	defaults: toml::Table,
}

/// Load template definitions from a TOML file.
pub fn load_template_file(path: &Path) -> Result<Vec<(String, TemplateDefinition)>> {
	let content = std::fs::read_to_string(path).map_err(|source| KeepconfError::ConfigReadError {
		path: path.to_path_buf(),
		source,
	})?;

	parse_template_str(&content, path)
}

/// Parse template definitions from a string, in file order.
///
/// `path` is only used for error reporting.
pub fn parse_template_str(content: &str, path: &Path) -> Result<Vec<(String, TemplateDefinition)>> {
	let parse_error = |source| KeepconfError::TemplateFileParseError {
		path: path.to_path_buf(),
		source,
	};

	let table: toml::Table = toml::from_str(content).map_err(parse_error)?;
	table
		.into_iter()
		.map(|(name, value)| {
			let raw: RawTemplate = value.try_into().map_err(parse_error)?;
			let definition = convert_template(&name, raw)?;
			Ok((name, definition))
		})
		.collect()
}

fn convert_template(name: &str, raw: RawTemplate) -> Result<TemplateDefinition> {
	if raw.block_type.trim().is_empty() || raw.block_type.contains(char::is_whitespace) {
		return Err(KeepconfError::InvalidTemplate {
			name: name.to_string(),
			message: format!("type must be a single word, got '{}'", raw.block_type),
		});
	}

	let params = convert_table(raw.params);
	let defaults = raw
		.defaults
		.into_iter()
		.map(|(key, value)| {
			let text = scalar_text(&value).ok_or_else(|| KeepconfError::InvalidTemplate {
				name: name.to_string(),
				message: format!("default for '{key}' must be a string, number or boolean"),
			})?;
			Ok((key, text))
		})
		.collect::<Result<HashMap<_, _>>>()?;

	Ok(TemplateDefinition {
		block_type: raw.block_type,
		params,
		defaults,
	})
}

fn convert_table(table: toml::Table) -> TemplateParams {
	let mut params = TemplateParams::new();
	for (key, value) in table {
		params.insert(key, convert_value(value));
	}
	params
}

fn convert_value(value: toml::Value) -> TemplateValue {
	match value {
		toml::Value::String(text) => TemplateValue::from_text(&text),
		toml::Value::Array(items) => TemplateValue::List(items.into_iter().map(convert_value).collect()),
		toml::Value::Table(table) => TemplateValue::Map(convert_table(table)),
		// Numbers, booleans and datetimes are never placeholders
		other => TemplateValue::Literal(scalar_text(&other).unwrap_or_default()),
	}
}

fn scalar_text(value: &toml::Value) -> Option<String> {
	match value {
		toml::Value::String(text) => Some(text.clone()),
		toml::Value::Integer(n) => Some(n.to_string()),
		toml::Value::Float(f) => Some(f.to_string()),
		toml::Value::Boolean(b) => Some(b.to_string()),
		toml::Value::Datetime(dt) => Some(dt.to_string()),
		toml::Value::Array(_) | toml::Value::Table(_) => None,
	}
}

/// Register every template, or none when any name is already taken.
///
/// Returns how many templates were registered.
pub fn register_all(registry: &TemplateRegistry, templates: Vec<(String, TemplateDefinition)>) -> Result<usize> {
	registry.register_many(templates)
}

/// Location of the per-user definition file, `~/.keepconf/templates.toml`.
pub fn user_templates_path() -> Result<PathBuf> {
	let home_dir = dirs::home_dir().ok_or(KeepconfError::HomeDirectoryNotFound)?;
	Ok(home_dir.join(".keepconf").join("templates.toml"))
}

/// Load the per-user definition file, or nothing when it does not exist.
pub fn load_user_templates() -> Result<Vec<(String, TemplateDefinition)>> {
	let path = user_templates_path()?;
	if !path.exists() {
		tracing::debug!(path = %path.display(), "no user template file");
		return Ok(Vec::new());
	}

	tracing::debug!(path = %path.display(), "loading user templates");
	load_template_file(&path)
}
