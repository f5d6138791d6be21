use crate::core_ftpcommand::utils::{normalize_path, reply_driver_error, reply_missing_argument};
use crate::session::Session;
use anyhow::Result;
use log::info;

/// Handles the RNTO (Rename To) FTP command, consuming the path staged by RNFR.
pub async fn handle_rnto_command(session: &mut Session) -> Result<()> {
    let Some(from) = session.rename_from.take() else {
        session.write_message(503, "Bad sequence of commands.").await?;
        return Ok(());
    };

    if session.param.is_empty() {
        reply_missing_argument(session).await?;
        return Ok(());
    }

    let to = normalize_path(session.path(), &session.param);
    let driver = session.driver()?;
    let renamed = driver.rename(&from, &to).await;

    match renamed {
        Ok(()) => {
            info!("Renamed, ID: {}, From: {}, To: {}", session.id, from, to);
            session.write_message(250, "Rename successful.").await?;
        }
        Err(e) => reply_driver_error(session, &e).await?,
    }
    Ok(())
}
