//! conserver `procs.cf` rendering: pure functions, no I/O.

#![allow(clippy::format_push_string)]

use std::path::Path;

use crate::domain::instance::{Endpoint, InstanceDefinition, unit_stem};

/// Render one `console` stanza per definition, in store order.
///
/// Disabled definitions are included. TCP endpoints become `type host`
/// stanzas; local sockets become `type uds` stanzas pointing at the
/// instance's control socket under `runtime_dir`.
#[must_use]
pub fn render_procs_cf<'a>(
    defs: impl IntoIterator<Item = &'a InstanceDefinition>,
    runtime_dir: &Path,
) -> String {
    let mut out = String::new();
    for def in defs {
        let name = &def.name;
        out.push('\n');
        out.push_str(&format!("console {name} {{\n"));
        out.push_str("    master localhost;\n");
        match &def.endpoint {
            Endpoint::Tcp(port) => {
                out.push_str("    type host;\n");
                out.push_str("    host localhost;\n");
                out.push_str(&format!("    port {port};\n"));
            }
            Endpoint::Unix(_) => {
                let socket = runtime_dir.join(unit_stem(name)).join("control");
                out.push_str("    type uds;\n");
                out.push_str(&format!("    uds {};\n", socket.display()));
            }
        }
        out.push_str("}\n");
    }
    out
}
