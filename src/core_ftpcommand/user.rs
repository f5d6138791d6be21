use crate::session::Session;
use anyhow::Result;
use log::info;

/// Handles the USER FTP command.
///
/// This function records the username for the session and requests the
/// password from the client. The name only becomes the session's user once
/// PASS succeeds.
///
/// # Arguments
///
/// * `session` - The session of the client; the username is `session.param`.
///
/// # Returns
///
/// An error only if the reply could not be written.
pub async fn handle_user_command(session: &mut Session) -> Result<()> {
    let username = session.param.clone();
    info!("Received USER command, ID: {}, Username: {}", session.id, username);

    if session.is_authenticated() {
        session.write_message(503, "Already logged in.").await?;
        return Ok(());
    }

    if username.is_empty() {
        session
            .write_message(501, "Syntax error in parameters or arguments.")
            .await?;
        return Ok(());
    }

    let anonymous = username.eq_ignore_ascii_case("anonymous");
    session.pending_user = Some(username);

    if anonymous {
        session
            .write_message(331, "Anonymous login okay, send your complete email address as password.")
            .await?;
    } else {
        session.write_message(331, "User name okay, need password.").await?;
    }
    Ok(())
}
