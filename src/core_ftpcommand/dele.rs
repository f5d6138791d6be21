use crate::core_ftpcommand::utils::{normalize_path, reply_driver_error, reply_missing_argument};
use crate::session::Session;
use anyhow::Result;
use log::info;

/// Handles the DELE (Delete) FTP command.
pub async fn handle_dele_command(session: &mut Session) -> Result<()> {
    if session.param.is_empty() {
        reply_missing_argument(session).await?;
        return Ok(());
    }

    let path = normalize_path(session.path(), &session.param);
    let driver = session.driver()?;
    let deleted = driver.delete_file(&path).await;

    match deleted {
        Ok(()) => {
            info!("File deleted, ID: {}, Path: {}", session.id, path);
            session.write_message(250, "File deleted.").await?;
        }
        Err(e) => reply_driver_error(session, &e).await?,
    }
    Ok(())
}
