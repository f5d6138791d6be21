use crate::core_auth::driver::FileInfo;
use crate::core_ftpcommand::utils::{normalize_path, open_transfer, reply_driver_error};
use crate::session::Session;
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use log::{error, info};
use tokio::io::AsyncWriteExt;

/// Formats one entry the way `ls -l` does.
pub fn format_list_line(file: &FileInfo, now: DateTime<Utc>) -> String {
    let permissions = if file.is_dir { "drwxr-xr-x" } else { "-rw-r--r--" };

    // Older or future entries show the year instead of the time
    let date = if file.modified > now - Duration::days(180) && file.modified <= now {
        file.modified.format("%b %e %H:%M")
    } else {
        file.modified.format("%b %e  %Y")
    };

    format!(
        "{} 1 ftp ftp {:>12} {} {}",
        permissions, file.size, date, file.name
    )
}

/// Strips `ls`-style flags such as `-la` that some clients send with LIST.
fn list_target(param: &str) -> &str {
    let mut rest = param;
    while rest.starts_with('-') {
        rest = rest.split_once(' ').map(|(_, r)| r.trim_start()).unwrap_or("");
    }
    rest
}

async fn send_listing(session: &mut Session, names_only: bool) -> Result<()> {
    let path = normalize_path(session.path(), list_target(&session.param));

    let driver = session.driver()?;
    let listing = match driver.stat(&path).await {
        Ok(info) if !info.is_dir => Ok(vec![info]),
        Ok(_) => driver.list_files(&path).await,
        Err(e) => Err(e),
    };

    let files = match listing {
        Ok(files) => files,
        Err(e) => {
            reply_driver_error(session, &e).await?;
            return Ok(());
        }
    };

    let now = Utc::now();
    let mut body = String::new();
    for file in &files {
        let line = if names_only {
            file.name.clone()
        } else {
            format_list_line(file, now)
        };
        body.push_str(&line);
        body.push_str("\r\n");
    }

    let Some(mut conn) = open_transfer(session).await? else {
        return Ok(());
    };

    let sent = match conn.write_all(body.as_bytes()).await {
        Ok(()) => conn.shutdown().await,
        Err(e) => Err(e),
    };

    match sent {
        Ok(()) => {
            info!("Listing sent, ID: {}, Path: {}, Entries: {}", session.id, path, files.len());
            session.transfer_close().await?;
        }
        Err(e) => {
            error!("Error sending listing to client: {}", e);
            session.transfer_abort();
            session
                .write_message(426, "Connection closed; transfer aborted.")
                .await?;
        }
    }
    Ok(())
}

/// Handles the LIST FTP command.
pub async fn handle_list_command(session: &mut Session) -> Result<()> {
    send_listing(session, false).await
}

/// Handles the NLST FTP command.
pub async fn handle_nlst_command(session: &mut Session) -> Result<()> {
    send_listing(session, true).await
}
