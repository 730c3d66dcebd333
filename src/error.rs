use std::path::PathBuf;

/// Library-level structured errors for keepconf.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum KeepconfError {
	#[error("Parse error at line {line}: {message}")]
	Parse { line: usize, message: String },

	#[error("Template already registered: {name}")]
	TemplateExists { name: String },

	#[error("Template not found: {name}")]
	TemplateNotFound { name: String },

	#[error("Missing value for placeholder {{{placeholder}}} in template {template}")]
	Placeholder {
		template: String,
		placeholder: String,
	},

	#[error("Node name must not be empty")]
	EmptyName,

	#[error("Invalid template {name}: {message}")]
	InvalidTemplate { name: String, message: String },

	#[error("Invalid regex pattern in selector: {pattern}")]
	InvalidRegex {
		pattern: String,
		#[source]
		source: regex::Error,
	},

	#[error("Invalid substitution, expected KEY=VALUE: {input}")]
	InvalidAssignment { input: String },

	#[error("Failed to read config file: {path}")]
	ConfigReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to write config file: {path}")]
	ConfigWriteError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse template file: {path}")]
	TemplateFileParseError {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Failed to resolve home directory")]
	HomeDirectoryNotFound,
}

impl KeepconfError {
	pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
		KeepconfError::Parse {
			line,
			message: message.into(),
		}
	}

	/// Line number for parse failures, `None` for every other kind.
	pub fn line(&self) -> Option<usize> {
		match self {
			KeepconfError::Parse { line, .. } => Some(*line),
			_ => None,
		}
	}
}

/// Result type alias using KeepconfError.
pub type Result<T> = std::result::Result<T, KeepconfError>;
