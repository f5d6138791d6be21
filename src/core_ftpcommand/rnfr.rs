use crate::core_ftpcommand::utils::{normalize_path, reply_driver_error, reply_missing_argument};
use crate::session::Session;
use anyhow::Result;

/// Handles the RNFR (Rename From) FTP command.
///
/// This function checks that the file or directory to be renamed exists and
/// stages its path for the RNTO command that must follow.
///
/// # Arguments
///
/// * `session` - The session of the client; the current name is `session.param`.
///
/// # Returns
///
/// An error only if the reply could not be written.
pub async fn handle_rnfr_command(session: &mut Session) -> Result<()> {
    if session.param.is_empty() {
        reply_missing_argument(session).await?;
        return Ok(());
    }

    let path = normalize_path(session.path(), &session.param);
    let driver = session.driver()?;
    let found = driver.stat(&path).await;

    match found {
        Ok(_) => {
            session.rename_from = Some(path);
            session.write_message(350, "Ready for RNTO.").await?;
        }
        Err(e) => reply_driver_error(session, &e).await?,
    }
    Ok(())
}
