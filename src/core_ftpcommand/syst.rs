use crate::session::Session;
use anyhow::Result;
use log::info;

/// Handles the SYST (System) FTP command.
///
/// This function sends a response to the client indicating the system type of the server.
pub async fn handle_syst_command(session: &mut Session) -> Result<()> {
    info!("Responding to SYST command with system type.");
    // Typically "UNIX" for Unix-like systems.
    session.write_message(215, "UNIX Type: L8").await?;
    Ok(())
}
