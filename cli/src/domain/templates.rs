//! Renderers for the image definition and the composition definition.
//!
//! Pure functions only. Application names are validated on construction
//! (see [`AppName`]); free-form configuration values written into YAML are
//! emitted as double-quoted scalars.

use std::fmt::Write as _;

use crate::domain::config::{AppName, ContainerConfig};
use crate::domain::layout::WorkingLayout;

/// Ports the Odoo service listens on (xmlrpc, longpolling).
pub const SERVICE_PORTS: [u16; 2] = [8069, 8072];
/// Service key in the composition file.
pub const SERVICE_NAME: &str = "odoo80";
const ENTRY_POINT: &str = "/entry_point.py";

/// Render the `Dockerfile` for one application.
#[must_use]
pub fn render_image_definition(base_image: &str, app: &AppName) -> String {
    format!(
        r#"
FROM {base_image}

COPY files/supervisord.conf /etc/supervisor/conf.d/supervisord.conf
COPY files/openerp_serverrc /external_files/openerp_serverrc
COPY files/{app}/instance /home/odoo/instance
COPY files/openerp_serverrc /home/odoo/.openerp_serverrc
COPY files/install_deps.sh /home/odoo/install_deps.sh
RUN  bash /home/odoo/install_deps.sh

USER odoo
ENV HOME="/home/odoo" \
    ODOO_CONFIG_FILE="/home/odoo/.openerp_serverrc" \
    ODOO_FILESTORE_PATH="/home/odoo/.local/share/Odoo/filestore" \
    XDG_DATA_HOME="/home/odoo/.local/share" \
    VERSION="8.0"

USER root

## The volumes we want to use
VOLUME ["/var/log/supervisor", "/home/odoo/.local/share/Odoo", "/tmp", "/home/odoo/.ssh"]

## Expose xmlrpc and longpolling ports
EXPOSE {xmlrpc} {longpolling}
CMD {ENTRY_POINT}
"#,
        xmlrpc = SERVICE_PORTS[0],
        longpolling = SERVICE_PORTS[1],
    )
}

/// Render the `docker-compose.yml` that brings up one application container.
#[must_use]
pub fn render_composition(layout: &WorkingLayout, container: &ContainerConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{SERVICE_NAME}:");
    out.push_str("  ports:\n");
    for port in SERVICE_PORTS {
        let _ = writeln!(out, "    - \"{port}\"");
    }
    let _ = writeln!(out, "  image: {}", layout.image_tag());
    let _ = writeln!(out, "  container_name: {}", layout.container_name());
    let _ = writeln!(out, "  hostname: {}", layout.container_name());
    let _ = writeln!(out, "  command: {}", yaml_quote(ENTRY_POINT));
    let _ = writeln!(out, "  mem_limit: {}", yaml_quote(&container.mem_limit));
    out.push_str("  environment:\n");
    let env = [
        ("DB_HOST", container.db_host.as_str()),
        ("DBFILTER", ".*"),
        ("ODOO_CONFIG_FILE", "/home/odoo/.openerp_serverrc"),
        ("DB_USER", container.db_user.as_str()),
        ("DB_PASSWORD", container.db_password.as_str()),
        ("ADMIN_PASSWD", container.admin_password.as_str()),
        ("ODOO_USER", container.odoo_user.as_str()),
    ];
    for (key, value) in env {
        let _ = writeln!(out, "    - {}", yaml_quote(&format!("{key}={value}")));
    }
    out
}

/// Emit `value` as a YAML double-quoted scalar.
#[must_use]
pub fn yaml_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
