use crate::session::Session;
use anyhow::Result;

/// Handles the PBSZ FTP command. Stream protection uses no buffer.
pub async fn handle_pbsz_command(session: &mut Session) -> Result<()> {
    session.write_message(200, "PBSZ=0").await?;
    Ok(())
}

/// Handles the PROT FTP command.
///
/// `C` clears the secure flag for the next transfer. `P` is refused since no
/// TLS layer is configured on the server.
pub async fn handle_prot_command(session: &mut Session) -> Result<()> {
    match session.param.to_ascii_uppercase().as_str() {
        "C" => {
            session.transfer_tls = false;
            session
                .write_message(200, "Protection level set to Clear.")
                .await?;
        }
        "P" => {
            session
                .write_message(534, "TLS not available. Please configure SSL/TLS in the server.")
                .await?;
        }
        "" => {
            session
                .write_message(501, "Syntax error in parameters or arguments.")
                .await?;
        }
        _ => {
            session
                .write_message(504, "Protection level not supported.")
                .await?;
        }
    }
    Ok(())
}
