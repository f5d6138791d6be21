use crate::core_ftpcommand::utils::{
    normalize_path, open_transfer, reply_driver_error, reply_missing_argument,
};
use crate::session::Session;
use anyhow::Result;
use log::info;

async fn store(session: &mut Session, append: bool) -> Result<()> {
    if session.param.is_empty() {
        reply_missing_argument(session).await?;
        return Ok(());
    }

    let path = normalize_path(session.path(), &session.param);
    let offset = session.restart_offset.take();
    info!("Receiving file, ID: {}, Path: {}, Offset: {:?}, Append: {}", session.id, path, offset, append);

    let Some(mut conn) = open_transfer(session).await? else {
        return Ok(());
    };

    let driver = session.driver()?;
    let stored = driver.put_file(&path, &mut conn, offset, append).await;

    match stored {
        Ok(n) => {
            info!("File stored successfully, ID: {}, Path: {}, Bytes: {}", session.id, path, n);
            session.transfer_close().await?;
        }
        Err(e) => {
            session.transfer_abort();
            reply_driver_error(session, &e).await?;
        }
    }
    Ok(())
}

/// Handles the STOR (Store File) FTP command.
///
/// This function stores a file uploaded by the client through the session's
/// driver, overwriting it from the REST offset if one was staged.
pub async fn handle_stor_command(session: &mut Session) -> Result<()> {
    store(session, false).await
}

/// Handles the APPE (Append) FTP command.
pub async fn handle_appe_command(session: &mut Session) -> Result<()> {
    store(session, true).await
}
