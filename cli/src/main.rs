//! manage-procs - procServ instances under systemd and conserver

use clap::Parser;

use procserv_cli::cli::Cli;
use procserv_cli::output::json;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = cli.run().await {
        if json_mode && let Ok(obj) = json::format_error(&format!("{e:#}")) {
            println!("{obj}");
        }
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
