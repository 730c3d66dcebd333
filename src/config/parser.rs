use crate::config::types::{Block, Container, Document, Node, Param};
use crate::error::{KeepconfError, Result};
use std::path::Path;

/// Prefixes that mark a whole line as a comment.
pub const COMMENT_MARKERS: [char; 2] = ['#', '!'];

/// Parse a config file from the given path.
pub fn parse_config_file(path: &Path) -> Result<Document> {
	let content = std::fs::read_to_string(path).map_err(|source| KeepconfError::ConfigReadError {
		path: path.to_path_buf(),
		source,
	})?;

	tracing::debug!(path = %path.display(), bytes = content.len(), "parsing config file");
	parse(&content)
}

/// A whitespace-delimited token of a directive line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
	text: String,
	/// Any part of the token was inside double quotes.
	quoted: bool,
}

/// An open block waiting for its closing brace.
struct Frame {
	block: Block,
	line: usize,
}

/// Parse directive text into a [`Document`].
///
/// The scan is line oriented: every non-blank, non-comment line is either a
/// block opener (ending in `{`), a lone `}` or a `name value...` directive.
pub fn parse(text: &str) -> Result<Document> {
	let mut document = Document::new();
	let mut stack: Vec<Frame> = Vec::new();

	for (index, raw_line) in text.lines().enumerate() {
		let line_no = index + 1;
		let line = raw_line.trim();

		if line.is_empty() || line.starts_with(COMMENT_MARKERS) {
			continue;
		}

		if line == "}" {
			let frame = stack
				.pop()
				.ok_or_else(|| KeepconfError::parse(line_no, "unexpected '}' with no open block"))?;
			tracing::debug!(block = frame.block.name(), line = line_no, "closed block");
			let node = Node::Block(frame.block);
			match stack.last_mut() {
				Some(parent) => parent.block.push(node),
				None => document.push(node),
			}
			continue;
		}

		let mut tokens = tokenize(line).map_err(|message| KeepconfError::parse(line_no, message))?;

		if opens_block(&mut tokens) {
			let mut tokens = tokens.into_iter().map(|token| token.text);
			let name = tokens
				.next()
				.filter(|name| !name.is_empty())
				.ok_or_else(|| KeepconfError::parse(line_no, "block opened without a name"))?;
			let block = Block::new(name, tokens).map_err(|e| KeepconfError::parse(line_no, e.to_string()))?;
			tracing::debug!(block = block.name(), line = line_no, "opened block");
			stack.push(Frame {
				block,
				line: line_no,
			});
			continue;
		}

		let mut tokens = tokens.into_iter().map(|token| token.text);
		let name = tokens
			.next()
			.filter(|name| !name.is_empty())
			.ok_or_else(|| KeepconfError::parse(line_no, "directive has an empty name"))?;
		let param = Param::from_tokens(name, tokens).map_err(|e| KeepconfError::parse(line_no, e.to_string()))?;
		let param = Node::Param(param);
		match stack.last_mut() {
			Some(parent) => parent.block.push(param),
			None => document.push(param),
		}
	}

	if let Some(frame) = stack.last() {
		return Err(KeepconfError::parse(
			frame.line,
			format!("block '{}' is never closed", frame.block.name()),
		));
	}

	Ok(document)
}

/// Detect a trailing unquoted `{` and strip it from the token list.
///
/// Accepts both `name args {` and `name args{`.
fn opens_block(tokens: &mut Vec<Token>) -> bool {
	let Some(last) = tokens.last_mut() else {
		return false;
	};
	if last.quoted || !last.text.ends_with('{') {
		return false;
	}

	last.text.pop();
	if last.text.is_empty() {
		tokens.pop();
	}
	true
}

/// Split a trimmed line into tokens, honouring double quotes.
///
/// Quoted segments keep their whitespace. Inside quotes `\"` and `\\` escape
/// themselves and `\n` / `\r` decode to line breaks.
fn tokenize(line: &str) -> std::result::Result<Vec<Token>, String> {
	let mut tokens = Vec::new();
	let mut current = String::new();
	let mut in_token = false;
	let mut quoted = false;
	let mut in_quotes = false;
	let mut chars = line.chars();

	while let Some(c) = chars.next() {
		if in_quotes {
			match c {
				'"' => in_quotes = false,
				'\\' => match chars.next() {
					Some(escaped @ ('"' | '\\')) => current.push(escaped),
					Some('n') => current.push('\n'),
					Some('r') => current.push('\r'),
					Some(other) => {
						current.push('\\');
						current.push(other);
					}
					None => current.push('\\'),
				},
				_ => current.push(c),
			}
		} else if c == '"' {
			in_quotes = true;
			in_token = true;
			quoted = true;
		} else if c.is_whitespace() {
			if in_token {
				tokens.push(Token {
					text: std::mem::take(&mut current),
					quoted,
				});
				in_token = false;
				quoted = false;
			}
		} else {
			current.push(c);
			in_token = true;
		}
	}

	if in_quotes {
		return Err("unterminated quoted string".to_string());
	}
	if in_token {
		tokens.push(Token {
			text: current,
			quoted,
		});
	}

	Ok(tokens)
}
