use crate::session::Session;
use anyhow::Result;
use log::info;

/// Handles the ALLO (Allocate) FTP command.
///
/// Modern systems typically do not need to pre-allocate space, so this
/// simply acknowledges the request.
pub async fn handle_allo_command(session: &mut Session) -> Result<()> {
    info!("Received ALLO command with argument: {}", session.param);
    session
        .write_message(202, "No storage allocation necessary.")
        .await?;
    Ok(())
}
