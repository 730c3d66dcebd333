use crate::templates::types::{TemplateDefinition, TemplateParams};

/// Definitions every registry created with `with_builtins` starts with,
/// in registration order.
pub fn builtin_templates() -> Vec<(&'static str, TemplateDefinition)> {
	vec![
		("basic_vrrp", basic_vrrp()),
		("complete_vrrp_master", complete_vrrp("MASTER")),
		("complete_vrrp_backup", complete_vrrp("BACKUP")),
		("basic_global", basic_global()),
		("basic_virtual_server", basic_virtual_server()),
	]
}

fn authentication() -> TemplateParams {
	TemplateParams::new()
		.with("auth_type", "{auth_type}")
		.with("auth_pass", "{auth_pass}")
}

fn vrrp_common(state: &str) -> TemplateParams {
	TemplateParams::new()
		.with("state", state)
		.with("interface", "{interface}")
		.with("virtual_router_id", "{virtual_router_id}")
		.with("priority", "{priority}")
		.with("advert_int", "{advert_int}")
		.with("authentication", authentication())
}

/// A VRRP instance; `virtual_ipaddress` is optional and may be a list.
fn basic_vrrp() -> TemplateDefinition {
	let params = vrrp_common("{state}").with(
		"virtual_ipaddress",
		TemplateParams::new().with("{virtual_ipaddress?}", ""),
	);

	TemplateDefinition::new("vrrp_instance", params)
		.with_default("advert_int", "1")
		.with_default("auth_type", "PASS")
}

/// A VRRP instance with `state` pinned.
fn complete_vrrp(state: &str) -> TemplateDefinition {
	let params = vrrp_common(state)
		.with("preempt_delay", "{preempt_delay?}")
		.with("garp_master_delay", "{garp_master_delay?}")
		.with(
			"virtual_ipaddress",
			TemplateParams::new().with("{virtual_ipaddress}", ""),
		);

	TemplateDefinition::new("vrrp_instance", params)
		.with_default("advert_int", "1")
		.with_default("auth_type", "PASS")
}

fn basic_global() -> TemplateDefinition {
	let params = TemplateParams::new()
		.with(
			"notification_email",
			TemplateParams::new().with("{notification_email}", ""),
		)
		.with("notification_email_from", "{notification_email_from}")
		.with("smtp_server", "{smtp_server}")
		.with("smtp_connect_timeout", "{smtp_connect_timeout}")
		.with("router_id", "{router_id?}");

	TemplateDefinition::new("global_defs", params).with_default("smtp_connect_timeout", "30")
}

/// A virtual server with one real server and a selectable health check.
fn basic_virtual_server() -> TemplateDefinition {
	let check = TemplateParams::new()
		.with("connect_timeout", "{tcp_connect_timeout}")
		.with("delay_before_retry", "{tcp_delay_before_retry}");

	let real_server = TemplateParams::new()
		.with("weight", "{real_server_weight}")
		.with("{health_check_type}", check);

	let params = TemplateParams::new()
		.with("delay_loop", "{delay_loop}")
		.with("lb_algo", "{lb_algo}")
		.with("lb_kind", "{lb_kind}")
		.with("persistence_timeout", "{persistence_timeout?}")
		.with("protocol", "{protocol}")
		.with("real_server {real_server_ip} {real_server_port}", real_server);

	TemplateDefinition::new("virtual_server", params)
		.with_default("delay_loop", "6")
		.with_default("lb_algo", "rr")
		.with_default("lb_kind", "DR")
		.with_default("protocol", "TCP")
		.with_default("real_server_weight", "1")
		.with_default("health_check_type", "TCP_CHECK")
		.with_default("tcp_connect_timeout", "3")
		.with_default("tcp_delay_before_retry", "3")
}
