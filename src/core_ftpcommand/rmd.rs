use crate::core_ftpcommand::utils::{normalize_path, reply_driver_error, reply_missing_argument};
use crate::session::Session;
use anyhow::Result;
use log::info;

/// Handles the RMD (Remove Directory) FTP command.
pub async fn handle_rmd_command(session: &mut Session) -> Result<()> {
    if session.param.is_empty() {
        reply_missing_argument(session).await?;
        return Ok(());
    }

    let path = normalize_path(session.path(), &session.param);
    let driver = session.driver()?;
    let removed = driver.delete_dir(&path).await;

    match removed {
        Ok(()) => {
            info!("Directory removed, ID: {}, Path: {}", session.id, path);
            session.write_message(250, "Directory removed.").await?;
        }
        Err(e) => reply_driver_error(session, &e).await?,
    }
    Ok(())
}
