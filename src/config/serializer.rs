use crate::config::parser::COMMENT_MARKERS;
use crate::config::types::{Block, Container, Document, Node, Param};
use crate::error::{KeepconfError, Result};
use std::path::Path;

/// One level of indentation in serialized output.
pub const INDENT: &str = "  ";

/// Canonical text rendering for any part of the tree.
///
/// Rendering never fails. Output carries no trailing newline; nested
/// children are separated by `\n`.
pub trait Render {
	fn to_text(&self, indent_level: usize) -> String;
}

impl Render for Param {
	fn to_text(&self, indent_level: usize) -> String {
		let mut out = INDENT.repeat(indent_level);
		out.push_str(&render_name(self.name()));
		for token in self.tokens() {
			out.push(' ');
			out.push_str(&render_token(token));
		}
		out
	}
}

impl Render for Block {
	fn to_text(&self, indent_level: usize) -> String {
		let indent = INDENT.repeat(indent_level);
		let mut out = format!("{indent}{}", render_name(self.name()));
		for argument in self.arguments() {
			out.push(' ');
			out.push_str(&render_token(argument));
		}
		out.push_str(" {");

		for child in self.children() {
			out.push('\n');
			out.push_str(&child.to_text(indent_level + 1));
		}

		out.push('\n');
		out.push_str(&indent);
		out.push('}');
		out
	}
}

impl Render for Node {
	fn to_text(&self, indent_level: usize) -> String {
		match self {
			Node::Param(param) => param.to_text(indent_level),
			Node::Block(block) => block.to_text(indent_level),
		}
	}
}

impl Render for Document {
	/// Entries one per line; consecutive blocks get a blank line between them.
	fn to_text(&self, indent_level: usize) -> String {
		let mut out = String::new();
		let mut previous_was_block = false;

		for (i, entry) in self.children().iter().enumerate() {
			if i > 0 {
				out.push('\n');
				if previous_was_block && entry.is_block() {
					out.push('\n');
				}
			}
			out.push_str(&entry.to_text(indent_level));
			previous_was_block = entry.is_block();
		}

		out
	}
}

/// Write a document to disk in canonical form, newline terminated.
pub fn write_config_file(path: &Path, document: &Document) -> Result<()> {
	let mut text = document.to_text(0);
	if !text.is_empty() {
		text.push('\n');
	}

	tracing::debug!(path = %path.display(), entries = document.len(), "writing config file");
	std::fs::write(path, text).map_err(|source| KeepconfError::ConfigWriteError {
		path: path.to_path_buf(),
		source,
	})
}

/// Names additionally need quoting when they would read back as a comment.
fn render_name(name: &str) -> String {
	if name.starts_with(COMMENT_MARKERS) {
		quote(name)
	} else {
		render_token(name)
	}
}

/// Quote a token only when the tokenizer would not read it back unchanged.
fn render_token(token: &str) -> String {
	let needs_quotes = token.is_empty()
		|| token.ends_with('{')
		|| token == "}"
		|| token.chars().any(|c| c.is_whitespace() || c == '"');

	if needs_quotes {
		quote(token)
	} else {
		token.to_string()
	}
}

fn quote(token: &str) -> String {
	let mut out = String::with_capacity(token.len() + 2);
	out.push('"');
	for c in token.chars() {
		match c {
			'"' | '\\' => {
				out.push('\\');
				out.push(c);
			}
			// The parser reads one line at a time
			'\n' => out.push_str("\\n"),
			'\r' => out.push_str("\\r"),
			_ => out.push(c),
		}
	}
	out.push('"');
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::parser::parse;

	/// Build `depth` nested blocks, each carrying a param and an argument.
	fn nested(depth: usize) -> Document {
		let mut inner: Option<Block> = None;
		for level in (0..depth).rev() {
			let mut block = Block::new(format!("level_{level}"), [format!("arg{level}")])
				.unwrap()
				.with(Param::new("depth", level.to_string()).unwrap());
			if let Some(child) = inner.take() {
				block.push(child);
			}
			block.push(Param::flag("marker").unwrap());
			inner = Some(block);
		}

		let mut doc = Document::new();
		doc.push(Param::new("top", "value").unwrap());
		if let Some(block) = inner {
			doc.push(block);
		}
		doc
	}

	fn param(name: &str, tokens: &[&str]) -> Param {
		Param::from_tokens(name, tokens.iter().copied()).unwrap()
	}

	#[test]
	fn test_param_rendering() {
		assert_eq!(param("priority", &["100"]).to_text(0), "priority 100");
		assert_eq!(param("priority", &["100"]).to_text(2), "    priority 100");
		assert_eq!(Param::flag("nopreempt").unwrap().to_text(1), "  nopreempt");
	}

	#[test]
	fn test_block_rendering() {
		let block = Block::new("virtual_server", ["192.168.1.100", "80"])
			.unwrap()
			.with(param("lb_algo", &["rr"]))
			.with(
				Block::new("real_server", ["192.168.1.101", "8080"])
					.unwrap()
					.with(param("weight", &["1"])),
			);

		assert_eq!(
			block.to_text(0),
			"virtual_server 192.168.1.100 80 {\n  lb_algo rr\n  real_server 192.168.1.101 8080 {\n    weight 1\n  }\n}"
		);
	}

	#[test]
	fn test_empty_block_rendering() {
		assert_eq!(Block::named("static_routes").unwrap().to_text(1), "  static_routes {\n  }");
	}

	#[test]
	fn test_document_separates_consecutive_blocks() {
		let mut doc = Document::new();
		doc.push(param("include", &["a.conf"]));
		doc.push(param("include", &["b.conf"]));
		doc.push(Block::named("a").unwrap());
		doc.push(Block::named("b").unwrap());
		doc.push(param("tail", &["1"]));

		assert_eq!(
			doc.to_text(0),
			"include a.conf\ninclude b.conf\na {\n}\n\nb {\n}\ntail 1"
		);
	}

	#[test]
	fn test_quoting_of_special_tokens() {
		let notify = param("notify", &["/bin/notify.sh master", "", "say \"hi\"", "x{"]);
		assert_eq!(
			notify.to_text(0),
			r#"notify "/bin/notify.sh master" "" "say \"hi\"" "x{""#
		);
		assert_eq!(Param::flag("#hash").unwrap().to_text(0), "\"#hash\"");
		assert_eq!(param("url", &["#anchor"]).to_text(0), "url #anchor");
	}

	#[test]
	fn test_line_breaks_are_escaped() {
		let script = param("script", &["line1\nline2\r"]);
		let text = script.to_text(0);
		assert_eq!(text, r#"script "line1\nline2\r""#);
		assert!(!text.contains('\n'));
	}

	#[test]
	fn test_round_trip_nested_depths() {
		for depth in 0..=5 {
			let doc = nested(depth);
			let text = doc.to_text(0);
			let parsed = parse(&text).unwrap();
			assert_eq!(parsed, doc, "depth {depth} did not round trip:\n{text}");
		}
	}

	#[test]
	fn test_round_trip_special_tokens() {
		let mut doc = Document::new();
		doc.push(
			Block::new("vrrp_script", ["chk haproxy", "multi\nline"])
				.unwrap()
				.with(param("script", &["/usr/bin/killall -0 haproxy"]))
				.with(param("notify", &["line1\nline2", "cr\r\n", "\\n literal"]))
				.with(param("#weird", &["a\\b", "}", "{", "\"q\""]))
				.with(param("name\nwith break", &[]))
				.with(Param::flag("}").unwrap()),
		);
		let text = doc.to_text(0);
		let parsed = parse(&text).unwrap();
		assert_eq!(parsed, doc);
		assert_eq!(parsed.to_text(0), text);
	}

	#[test]
	fn test_serialize_is_idempotent() {
		let hand_written = "global_defs   {\n\trouter_id   LVS\n# comment\n}\nvrrp_instance VI_1 {\n        state MASTER\n   virtual_ipaddress {\n 10.0.0.1/24 dev eth0\n }\n}\n";
		let once = parse(hand_written).unwrap().to_text(0);
		let twice = parse(&once).unwrap().to_text(0);
		assert_eq!(once, twice);
		assert_eq!(
			once,
			"global_defs {\n  router_id LVS\n}\n\nvrrp_instance VI_1 {\n  state MASTER\n  virtual_ipaddress {\n    10.0.0.1/24 dev eth0\n  }\n}"
		);
	}

	#[test]
	fn test_write_config_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("keepalived.conf");
		let doc = nested(2);

		write_config_file(&path, &doc).unwrap();

		let content = std::fs::read_to_string(&path).unwrap();
		assert!(content.ends_with("}\n"));
		assert_eq!(parse(&content).unwrap(), doc);
	}
}
