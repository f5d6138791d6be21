use crate::session::Session;
use anyhow::Result;

/// Handles the REST (Restart) FTP command.
///
/// The offset is staged for the very next RETR, STOR or APPE and dropped by
/// any other command.
pub async fn handle_rest_command(session: &mut Session) -> Result<()> {
    match session.param.parse::<u64>() {
        Ok(offset) => {
            session.restart_offset = Some(offset);
            let reply = format!("Restarting at {}. Send STORE or RETRIEVE.", offset);
            session.write_message(350, &reply).await?;
        }
        Err(_) => {
            session
                .write_message(501, "Syntax error in parameters or arguments.")
                .await?;
        }
    }
    Ok(())
}
