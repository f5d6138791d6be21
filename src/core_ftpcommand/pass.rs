use crate::session::{LoginError, Session};
use anyhow::Result;

/// Handles the PASS FTP command, completing the login started by USER.
pub async fn handle_pass_command(session: &mut Session) -> Result<()> {
    let Some(username) = session.pending_user.take() else {
        session.write_message(503, "Login with USER first.").await?;
        return Ok(());
    };

    let password = session.param.clone();
    match session.login(&username, &password).await {
        Ok(()) => session.write_message(230, "User logged in, proceed.").await?,
        Err(LoginError::AlreadyLoggedIn) => session.write_message(503, "Already logged in.").await?,
        Err(LoginError::Rejected) => session.write_message(530, "Login incorrect.").await?,
    }
    Ok(())
}
