use crate::core_ftpcommand::utils::{normalize_path, reply_driver_error, reply_missing_argument};
use crate::session::Session;
use anyhow::Result;

/// Handles the MDTM FTP command: replies with the modification time as
/// `YYYYMMDDHHMMSS` in UTC.
pub async fn handle_mdtm_command(session: &mut Session) -> Result<()> {
    if session.param.is_empty() {
        reply_missing_argument(session).await?;
        return Ok(());
    }

    let path = normalize_path(session.path(), &session.param);
    let driver = session.driver()?;
    let stat = driver.stat(&path).await;

    match stat {
        Ok(info) => {
            let reply = info.modified.format("%Y%m%d%H%M%S").to_string();
            session.write_message(213, &reply).await?;
        }
        Err(e) => reply_driver_error(session, &e).await?,
    }
    Ok(())
}
