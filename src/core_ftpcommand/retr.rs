use crate::core_ftpcommand::utils::{
    normalize_path, open_transfer, reply_driver_error, reply_missing_argument,
};
use crate::session::Session;
use anyhow::Result;
use log::{error, info};
use tokio::io::AsyncWriteExt;

/// Handles the RETR (Retrieve) FTP command.
///
/// This function retrieves a file through the session's driver and streams its
/// contents over the declared transfer connection, starting at the offset
/// staged by a preceding REST.
///
/// # Arguments
///
/// * `session` - The session of the client; the file name is `session.param`.
///
/// # Returns
///
/// An error only if the control connection failed.
pub async fn handle_retr_command(session: &mut Session) -> Result<()> {
    if session.param.is_empty() {
        reply_missing_argument(session).await?;
        return Ok(());
    }

    let path = normalize_path(session.path(), &session.param);
    let offset = session.restart_offset.take().unwrap_or(0);

    let driver = session.driver()?;
    let opened = driver.open_file(&path, offset).await;
    let mut file = match opened {
        Ok(file) => file,
        Err(e) => {
            reply_driver_error(session, &e).await?;
            return Ok(());
        }
    };

    let Some(mut conn) = open_transfer(session).await? else {
        return Ok(());
    };
    info!("Sending file, ID: {}, Path: {}, Offset: {}", session.id, path, offset);

    let copied = match tokio::io::copy(&mut file, &mut conn).await {
        Ok(n) => conn.shutdown().await.map(|_| n),
        Err(e) => Err(e),
    };

    match copied {
        Ok(n) => {
            info!("File transfer completed successfully, ID: {}, Path: {}, Bytes: {}", session.id, path, n);
            session.transfer_close().await?;
        }
        Err(e) => {
            error!("Error sending file to client: {}", e);
            session.transfer_abort();
            session
                .write_message(426, "Connection closed; transfer aborted.")
                .await?;
        }
    }
    Ok(())
}
