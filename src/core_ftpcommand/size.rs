use crate::core_ftpcommand::utils::{normalize_path, reply_driver_error, reply_missing_argument};
use crate::session::Session;
use anyhow::Result;

pub async fn handle_size_command(session: &mut Session) -> Result<()> {
    if session.param.is_empty() {
        reply_missing_argument(session).await?;
        return Ok(());
    }

    let path = normalize_path(session.path(), &session.param);
    let driver = session.driver()?;
    let stat = driver.stat(&path).await;

    match stat {
        Ok(info) if info.is_dir => {
            session.write_message(550, "Not a regular file.").await?;
        }
        Ok(info) => {
            session.write_message(213, &info.size.to_string()).await?;
        }
        Err(e) => reply_driver_error(session, &e).await?,
    }
    Ok(())
}
