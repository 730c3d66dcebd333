use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use keepconf_cli::config::{Container, Render, parse_config_file, write_config_file};
use keepconf_cli::query::{compile_path, select_path};
use keepconf_cli::templates::{
	Substitutions, TemplateRegistry, load_template_file, load_user_templates, register_all,
};

#[derive(Parser)]
#[command(name = "keepconf")]
#[command(
	author,
	version,
	about = "Parse, format and generate keepalived-style configuration"
)]
#[command(arg_required_else_help = true)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Load extra template definitions from a TOML file
	#[arg(long, global = true, value_name = "FILE")]
	templates: Option<PathBuf>,

	/// Skip ~/.keepconf/templates.toml
	#[arg(long, global = true)]
	no_user_templates: bool,

	/// Increase log verbosity (-v info, -vv debug, -vvv trace)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
	/// Print a config file in canonical form
	Fmt {
		file: PathBuf,

		/// Exit non-zero if the file is not already canonical
		#[arg(long, conflicts_with = "write")]
		check: bool,

		/// Rewrite the file in place
		#[arg(long)]
		write: bool,
	},
	/// Parse config files and report syntax errors
	Validate {
		#[arg(required = true)]
		files: Vec<PathBuf>,
	},
	/// Print a config file, or the nodes matching a selector path
	Show {
		file: PathBuf,

		/// Slash separated path of node names, `*` matches any name
		#[arg(long, value_name = "PATH")]
		select: Option<String>,

		/// Regex over the arguments of the last path segment
		#[arg(long, value_name = "REGEX", requires = "select")]
		args: Option<String>,
	},
	/// Template management commands
	Template {
		#[command(subcommand)]
		action: TemplateAction,
	},
}

#[derive(Subcommand)]
enum TemplateAction {
	/// List registered templates
	List,
	/// Describe a template and its placeholders
	Show { name: String },
	/// Materialize a template and print the generated block
	Render {
		name: String,

		/// Header arguments of the generated block, e.g. "VI_1"
		#[arg(long, value_name = "ARGS", allow_hyphen_values = true)]
		args: Option<String>,

		/// Placeholder value; repeat a key to pass a list
		#[arg(long = "set", value_name = "KEY=VALUE")]
		set: Vec<String>,
	},
}

fn main() -> ExitCode {
	let cli = Cli::parse();
	init_tracing(cli.verbose);

	match run(cli) {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

/// Log to stderr; `KEEPCONF_LOG` overrides the level picked by `-v`.
fn init_tracing(verbose: u8) {
	let fallback = match verbose {
		0 => "warn",
		1 => "info",
		2 => "debug",
		_ => "trace",
	};
	let filter = tracing_subscriber::EnvFilter::try_from_env("KEEPCONF_LOG")
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback));

	tracing_subscriber::registry()
		.with(filter)
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.init();
}

fn run(cli: Cli) -> Result<ExitCode> {
	match cli.command {
		Commands::Fmt { file, check, write } => handle_fmt(&file, check, write),
		Commands::Validate { files } => handle_validate(&files),
		Commands::Show { file, select, args } => handle_show(&file, select.as_deref(), args.as_deref()),
		Commands::Template { action } => {
			let registry = build_registry(cli.templates.as_deref(), cli.no_user_templates)?;
			match action {
				TemplateAction::List => handle_template_list(&registry),
				TemplateAction::Show { name } => handle_template_show(&registry, &name),
				TemplateAction::Render { name, args, set } => {
					handle_template_render(&registry, &name, args.as_deref(), &set)
				}
			}
		}
	}
}

/// Built-ins, then the user file, then `--templates`.
fn build_registry(extra: Option<&Path>, skip_user: bool) -> Result<TemplateRegistry> {
	let registry = TemplateRegistry::with_builtins();

	if !skip_user {
		let templates = load_user_templates().context("Failed to load user templates")?;
		register_all(&registry, templates).context("Failed to register user templates")?;
	}

	if let Some(path) = extra {
		let templates = load_template_file(path)
			.with_context(|| format!("Failed to load templates from {}", path.display()))?;
		register_all(&registry, templates)
			.with_context(|| format!("Failed to register templates from {}", path.display()))?;
	}

	Ok(registry)
}

fn handle_fmt(file: &Path, check: bool, write: bool) -> Result<ExitCode> {
	let doc = parse_config_file(file).with_context(|| format!("Failed to parse {}", file.display()))?;

	if check {
		let current = std::fs::read_to_string(file)
			.with_context(|| format!("Failed to read {}", file.display()))?;
		let mut canonical = doc.to_text(0);
		if !canonical.is_empty() {
			canonical.push('\n');
		}
		if current == canonical {
			return Ok(ExitCode::SUCCESS);
		}
		eprintln!("{} is not formatted", file.display());
		return Ok(ExitCode::FAILURE);
	}

	if write {
		write_config_file(file, &doc).with_context(|| format!("Failed to write {}", file.display()))?;
		return Ok(ExitCode::SUCCESS);
	}

	println!("{}", doc.to_text(0));
	Ok(ExitCode::SUCCESS)
}

fn handle_validate(files: &[PathBuf]) -> Result<ExitCode> {
	let mut failed = false;

	for file in files {
		match parse_config_file(file) {
			Ok(doc) => println!("{}: ok ({} top-level entries)", file.display(), doc.len()),
			Err(e) => {
				eprintln!("{}: {}", file.display(), e);
				failed = true;
			}
		}
	}

	Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

fn handle_show(file: &Path, select: Option<&str>, args: Option<&str>) -> Result<ExitCode> {
	let doc = parse_config_file(file).with_context(|| format!("Failed to parse {}", file.display()))?;

	let Some(path) = select else {
		println!("{}", doc.to_text(0));
		return Ok(ExitCode::SUCCESS);
	};

	let selectors = compile_path(path, args).context("Invalid selector")?;
	let found = select_path(&doc, &selectors);
	if found.is_empty() {
		eprintln!("No nodes match {path}");
		return Ok(ExitCode::FAILURE);
	}

	for node in found {
		println!("{}", node.to_text(0));
	}
	Ok(ExitCode::SUCCESS)
}

fn handle_template_list(registry: &TemplateRegistry) -> Result<ExitCode> {
	for name in registry.list() {
		let definition = registry.get(&name)?;
		println!("{name} ({})", definition.block_type);
	}
	Ok(ExitCode::SUCCESS)
}

fn handle_template_show(registry: &TemplateRegistry, name: &str) -> Result<ExitCode> {
	let definition = registry.get(name)?;

	println!("template: {name}");
	println!("type: {}", definition.block_type);

	let placeholders = definition.placeholders();
	if placeholders.is_empty() {
		println!("placeholders: none");
		return Ok(ExitCode::SUCCESS);
	}

	println!("placeholders:");
	for placeholder in placeholders {
		match definition.defaults.get(&placeholder) {
			Some(default) => println!("  {placeholder} (default: {default})"),
			None => println!("  {placeholder}"),
		}
	}
	Ok(ExitCode::SUCCESS)
}

fn handle_template_render(
	registry: &TemplateRegistry,
	name: &str,
	args: Option<&str>,
	assignments: &[String],
) -> Result<ExitCode> {
	let substitutions = Substitutions::from_assignments(assignments)?;
	let arguments: Vec<&str> = args.map(|a| a.split_whitespace().collect()).unwrap_or_default();

	let doc = registry
		.materialize(name, &arguments, &substitutions)
		.with_context(|| format!("Failed to render template {name}"))?;

	println!("{}", doc.to_text(0));
	Ok(ExitCode::SUCCESS)
}
