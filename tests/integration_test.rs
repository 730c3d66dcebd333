#![allow(deprecated)] // assert_cmd::Command::cargo_bin is deprecated but replacement requires nightly

use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn keepconf_cmd() -> assert_cmd::Command {
	let mut cmd = assert_cmd::Command::cargo_bin("keepconf").unwrap();
	cmd.env_remove("KEEPCONF_LOG");
	cmd
}

const MESSY: &str = "# managed by hand
global_defs {
    router_id   LVS_DEVEL
}
vrrp_instance VI_1 {
\tstate MASTER
\tvirtual_ipaddress {
\t\t192.168.1.100/24 dev eth0
\t}
}
";

const CANONICAL: &str = "global_defs {
  router_id LVS_DEVEL
}

vrrp_instance VI_1 {
  state MASTER
  virtual_ipaddress {
    192.168.1.100/24 dev eth0
  }
}
";

fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
	let path = dir.join(name);
	fs::write(&path, content).unwrap();
	path
}

// ============================================================================
// CLI flag tests
// ============================================================================

#[test]
fn test_help_flag() {
	keepconf_cmd()
		.arg("--help")
		.assert()
		.success()
		.stdout(predicate::str::contains("keepalived-style configuration"));
}

#[test]
fn test_version_flag() {
	keepconf_cmd()
		.arg("--version")
		.assert()
		.success()
		.stdout(predicate::str::contains("keepconf"));
}

#[test]
fn test_no_args_shows_help() {
	keepconf_cmd()
		.assert()
		.failure()
		.stderr(predicate::str::contains("Usage"));
}

// ============================================================================
// fmt tests
// ============================================================================

#[test]
fn test_fmt_prints_canonical_form() {
	let temp_dir = tempfile::tempdir().unwrap();
	let path = write_file(temp_dir.path(), "keepalived.conf", MESSY);

	keepconf_cmd()
		.arg("fmt")
		.arg(&path)
		.assert()
		.success()
		.stdout(CANONICAL);

	// Printing leaves the file alone
	assert_eq!(fs::read_to_string(&path).unwrap(), MESSY);
}

#[test]
fn test_fmt_write_then_check() {
	let temp_dir = tempfile::tempdir().unwrap();
	let path = write_file(temp_dir.path(), "keepalived.conf", MESSY);

	keepconf_cmd()
		.args(["fmt", "--check"])
		.arg(&path)
		.assert()
		.failure()
		.stderr(predicate::str::contains("is not formatted"));

	keepconf_cmd().args(["fmt", "--write"]).arg(&path).assert().success();
	assert_eq!(fs::read_to_string(&path).unwrap(), CANONICAL);

	keepconf_cmd().args(["fmt", "--check"]).arg(&path).assert().success();
}

#[test]
fn test_fmt_check_conflicts_with_write() {
	let temp_dir = tempfile::tempdir().unwrap();
	let path = write_file(temp_dir.path(), "keepalived.conf", CANONICAL);

	keepconf_cmd()
		.args(["fmt", "--check", "--write"])
		.arg(&path)
		.assert()
		.failure()
		.stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_fmt_parse_error_reports_line() {
	let temp_dir = tempfile::tempdir().unwrap();
	let path = write_file(temp_dir.path(), "broken.conf", "a {\n  b 1\n}\n}\n");

	keepconf_cmd()
		.arg("fmt")
		.arg(&path)
		.assert()
		.failure()
		.stderr(predicate::str::contains("line 4"));
}

// ============================================================================
// validate tests
// ============================================================================

#[test]
fn test_validate_reports_each_file() {
	let temp_dir = tempfile::tempdir().unwrap();
	let good = write_file(temp_dir.path(), "good.conf", MESSY);
	let bad = write_file(temp_dir.path(), "bad.conf", "vrrp_instance VI_1 {\n  state MASTER\n");

	keepconf_cmd()
		.arg("validate")
		.arg(&good)
		.assert()
		.success()
		.stdout(predicate::str::contains("ok (2 top-level entries)"));

	keepconf_cmd()
		.arg("validate")
		.arg(&good)
		.arg(&bad)
		.assert()
		.failure()
		.stdout(predicate::str::contains("good.conf: ok"))
		.stderr(predicate::str::contains("bad.conf").and(predicate::str::contains("line 1")));
}

#[test]
fn test_validate_missing_file() {
	keepconf_cmd()
		.args(["validate", "/nonexistent/keepalived.conf"])
		.assert()
		.failure()
		.stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn test_validate_requires_a_file() {
	keepconf_cmd().arg("validate").assert().failure();
}

// ============================================================================
// show tests
// ============================================================================

const SERVERS: &str = "virtual_server 192.168.1.100 80 {
  real_server 192.168.1.101 80 {
    weight 1
  }
  real_server 192.168.1.102 80 {
    weight 2
  }
}
";

#[test]
fn test_show_whole_file() {
	let temp_dir = tempfile::tempdir().unwrap();
	let path = write_file(temp_dir.path(), "keepalived.conf", MESSY);

	keepconf_cmd()
		.arg("show")
		.arg(&path)
		.assert()
		.success()
		.stdout(CANONICAL);
}

#[test]
fn test_show_select_path_with_args() {
	let temp_dir = tempfile::tempdir().unwrap();
	let path = write_file(temp_dir.path(), "keepalived.conf", SERVERS);

	keepconf_cmd()
		.arg("show")
		.arg(&path)
		.args(["--select", "virtual_server/real_server", "--args", r"\.102"])
		.assert()
		.success()
		.stdout("real_server 192.168.1.102 80 {\n  weight 2\n}\n");
}

#[test]
fn test_show_no_match_fails() {
	let temp_dir = tempfile::tempdir().unwrap();
	let path = write_file(temp_dir.path(), "keepalived.conf", SERVERS);

	keepconf_cmd()
		.arg("show")
		.arg(&path)
		.args(["--select", "vrrp_instance"])
		.assert()
		.failure()
		.stderr(predicate::str::contains("No nodes match"));
}

#[test]
fn test_show_invalid_regex() {
	let temp_dir = tempfile::tempdir().unwrap();
	let path = write_file(temp_dir.path(), "keepalived.conf", SERVERS);

	keepconf_cmd()
		.arg("show")
		.arg(&path)
		.args(["--select", "virtual_server", "--args", "[invalid"])
		.assert()
		.failure()
		.stderr(predicate::str::contains("Invalid regex"));
}

#[test]
fn test_show_args_requires_select() {
	let temp_dir = tempfile::tempdir().unwrap();
	let path = write_file(temp_dir.path(), "keepalived.conf", SERVERS);

	keepconf_cmd()
		.arg("show")
		.arg(&path)
		.args(["--args", "80"])
		.assert()
		.failure();
}

// ============================================================================
// template tests
// ============================================================================

#[test]
fn test_template_list_builtins() {
	keepconf_cmd()
		.args(["template", "list", "--no-user-templates"])
		.assert()
		.success()
		.stdout(predicate::str::contains("basic_vrrp (vrrp_instance)"))
		.stdout(predicate::str::contains("complete_vrrp_master (vrrp_instance)"))
		.stdout(predicate::str::contains("basic_global (global_defs)"))
		.stdout(predicate::str::contains("basic_virtual_server (virtual_server)"));
}

#[test]
fn test_template_show_placeholders() {
	keepconf_cmd()
		.args(["template", "show", "basic_vrrp", "--no-user-templates"])
		.assert()
		.success()
		.stdout(predicate::str::contains("type: vrrp_instance"))
		.stdout(predicate::str::contains("  interface\n"))
		.stdout(predicate::str::contains("  advert_int (default: 1)"));
}

#[test]
fn test_template_show_unknown() {
	keepconf_cmd()
		.args(["template", "show", "nope", "--no-user-templates"])
		.assert()
		.failure()
		.stderr(predicate::str::contains("Template not found: nope"));
}

#[test]
fn test_template_render_complete_master() {
	keepconf_cmd()
		.args(["template", "render", "complete_vrrp_master", "--no-user-templates"])
		.args(["--args", "VI_1"])
		.args(["--set", "interface=eth0"])
		.args(["--set", "virtual_router_id=51"])
		.args(["--set", "priority=100"])
		.args(["--set", "auth_pass=secret"])
		.args(["--set", "virtual_ipaddress=192.168.1.100/24"])
		.args(["--set", "virtual_ipaddress=192.168.1.101/24"])
		.assert()
		.success()
		.stdout(
			"vrrp_instance VI_1 {
  state MASTER
  interface eth0
  virtual_router_id 51
  priority 100
  advert_int 1
  authentication {
    auth_type PASS
    auth_pass secret
  }
  virtual_ipaddress {
    192.168.1.100/24
    192.168.1.101/24
  }
}
",
		);
}

#[test]
fn test_template_render_missing_placeholder() {
	keepconf_cmd()
		.args(["template", "render", "basic_global", "--no-user-templates"])
		.args(["--set", "notification_email=admin@example.com"])
		.assert()
		.failure()
		.stderr(predicate::str::contains(
			"Missing value for placeholder {notification_email_from} in template basic_global",
		));
}

#[test]
fn test_template_render_bad_assignment() {
	keepconf_cmd()
		.args(["template", "render", "basic_vrrp", "--no-user-templates"])
		.args(["--set", "no_equals_sign"])
		.assert()
		.failure()
		.stderr(predicate::str::contains("expected KEY=VALUE"));
}

#[test]
fn test_template_render_output_is_valid_config() {
	let temp_dir = tempfile::tempdir().unwrap();

	let output = keepconf_cmd()
		.args(["template", "render", "basic_virtual_server", "--no-user-templates"])
		.args(["--args", "192.168.1.100 80"])
		.args(["--set", "real_server_ip=192.168.1.101"])
		.args(["--set", "real_server_port=8080"])
		.assert()
		.success()
		.get_output()
		.stdout
		.clone();

	let path = temp_dir.path().join("generated.conf");
	fs::write(&path, output).unwrap();

	keepconf_cmd().args(["fmt", "--check"]).arg(&path).assert().success();
	keepconf_cmd()
		.arg("show")
		.arg(&path)
		.args(["--select", "virtual_server/real_server/TCP_CHECK"])
		.assert()
		.success()
		.stdout(predicate::str::contains("connect_timeout 3"));
}

#[test]
fn test_templates_file_flag() {
	let temp_dir = tempfile::tempdir().unwrap();
	let templates = write_file(
		temp_dir.path(),
		"templates.toml",
		r#"
[check_script]
type = "vrrp_script"

[check_script.params]
script = "{script}"
interval = 2
weight = "{weight?}"
"#,
	);

	keepconf_cmd()
		.args(["template", "list", "--no-user-templates", "--templates"])
		.arg(&templates)
		.assert()
		.success()
		.stdout(predicate::str::contains("check_script (vrrp_script)"));

	keepconf_cmd()
		.args(["template", "render", "check_script", "--no-user-templates", "--templates"])
		.arg(&templates)
		.args(["--args", "chk_haproxy", "--set", "script=killall -0 haproxy"])
		.assert()
		.success()
		.stdout("vrrp_script chk_haproxy {\n  script killall -0 haproxy\n  interval 2\n}\n");
}

#[test]
fn test_templates_file_duplicate_name() {
	let temp_dir = tempfile::tempdir().unwrap();
	let templates = write_file(
		temp_dir.path(),
		"templates.toml",
		"[basic_vrrp]\ntype = \"vrrp_instance\"\n",
	);

	keepconf_cmd()
		.args(["template", "list", "--no-user-templates", "--templates"])
		.arg(&templates)
		.assert()
		.failure()
		.stderr(predicate::str::contains("Template already registered: basic_vrrp"));
}

#[test]
fn test_user_templates_loaded_from_home() {
	let home = tempfile::tempdir().unwrap();
	fs::create_dir(home.path().join(".keepconf")).unwrap();
	write_file(
		&home.path().join(".keepconf"),
		"templates.toml",
		"[mine]\ntype = \"static_routes\"\nparams = { \"{route}\" = \"\" }\n",
	);

	keepconf_cmd()
		.env("HOME", home.path())
		.args(["template", "list"])
		.assert()
		.success()
		.stdout(predicate::str::contains("mine (static_routes)"));

	keepconf_cmd()
		.env("HOME", home.path())
		.args(["template", "list", "--no-user-templates"])
		.assert()
		.success()
		.stdout(predicate::str::contains("mine").not());
}

#[test]
fn test_verbose_logs_to_stderr() {
	keepconf_cmd()
		.args(["-vv", "template", "render", "basic_global", "--no-user-templates"])
		.args(["--set", "notification_email=admin@example.com"])
		.args(["--set", "notification_email_from=keepalived@example.com"])
		.args(["--set", "smtp_server=smtp.example.com"])
		.assert()
		.success()
		.stdout(predicate::str::starts_with("global_defs {"))
		.stderr(predicate::str::contains("materialized template"));
}
