use crate::core_ftpcommand::utils::{
    normalize_path, quote_path, reply_driver_error, reply_missing_argument,
};
use crate::session::Session;
use anyhow::Result;
use log::info;

/// Handles the MKD (Make Directory) FTP command.
///
/// This function creates a directory relative to the user's current directory
/// and answers with its absolute path.
pub async fn handle_mkd_command(session: &mut Session) -> Result<()> {
    if session.param.is_empty() {
        reply_missing_argument(session).await?;
        return Ok(());
    }

    let path = normalize_path(session.path(), &session.param);
    let driver = session.driver()?;
    let created = driver.make_dir(&path).await;

    match created {
        Ok(()) => {
            info!("Directory created, ID: {}, Path: {}", session.id, path);
            let reply = format!("{} directory created.", quote_path(&path));
            session.write_message(257, &reply).await?;
        }
        Err(e) => reply_driver_error(session, &e).await?,
    }
    Ok(())
}
