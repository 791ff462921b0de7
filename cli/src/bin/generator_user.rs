//! systemd user generator for procServ instances.

use std::process::ExitCode;

use procserv_cli::domain::config::Scope;

fn main() -> ExitCode {
    procserv_cli::generator::main(Scope::User)
}
