use crate::session::Session;
use anyhow::Result;
use log::info;

/// Handles the QUIT FTP command.
///
/// This function sends a response indicating the service is closing the
/// control connection, then closes it. The command loop ends on its next turn.
pub async fn handle_quit_command(session: &mut Session) -> Result<()> {
    info!("Received QUIT command. Closing connection, ID: {}", session.id);
    session
        .write_message(221, "Service closing control connection.")
        .await?;
    session.disconnect().await;
    Ok(())
}
