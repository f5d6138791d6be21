mod config;
mod constants;
mod core_auth;
mod core_cli;
mod core_ftpcommand;
mod core_log;
mod core_network;
mod server;
mod session;

use crate::config::{log_config, Config};
use crate::core_auth::helper::hash_password;
use crate::core_cli::Cli;
use crate::core_log::logger::{init_logger, install_panic_hook};
use anyhow::{Context, Result};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();

    if let Some(password) = args.hash_password {
        let hashed = hash_password(&password).context("Failed to hash password")?;
        println!("{}", hashed);
        return Ok(());
    }

    init_logger(args.verbose);
    install_panic_hook();

    // Load configuration from the TOML file
    let config = Config::load_from_file(&args.config)?;
    log_config(&config);

    // Run the FTP server
    server::run(config).await
}
