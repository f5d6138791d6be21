use crate::config::Config;
use crate::core_auth::fs_driver::FsDriver;
use crate::core_ftpcommand::handlers::initialize_command_handlers;
use crate::core_network::network;
use anyhow::Result;
use log::{error, info};
use std::sync::Arc;

/// Runs the FTP server with the provided configuration.
///
/// The command table is built once here and shared read-only by every
/// session; each login gets its own filesystem driver.
///
/// # Arguments
///
/// * `config` - The server configuration.
///
/// # Returns
///
/// Result<(), anyhow::Error> indicating the success or failure of the operation.
pub async fn run(config: Config) -> Result<()> {
    let config = Arc::new(config);
    let table = Arc::new(initialize_command_handlers());
    info!("Registered {} FTP commands", table.len());

    let driver_factory = FsDriver::factory(Arc::clone(&config));

    if let Err(e) = network::start_server(config, table, driver_factory).await {
        error!("Failed to start server: {}", e);
        return Err(e);
    }

    Ok(())
}
