use crate::core_ftpcommand::utils::{normalize_path, reply_driver_error};
use crate::session::Session;
use anyhow::Result;
use log::info;

/// Moves the session to `target` if the driver confirms it is a directory.
pub async fn change_directory(session: &mut Session, target: &str) -> Result<()> {
    let new_dir = normalize_path(session.path(), target);

    let driver = session.driver()?;
    let result = driver.change_dir(&new_dir).await;

    match result {
        Ok(()) => {
            info!("Directory changed, ID: {}, Path: {}", session.id, new_dir);
            session.set_path(new_dir);
            session
                .write_message(250, "Directory successfully changed.")
                .await?;
        }
        Err(e) => reply_driver_error(session, &e).await?,
    }
    Ok(())
}

pub async fn handle_cwd_command(session: &mut Session) -> Result<()> {
    let target = session.param.clone();
    change_directory(session, &target).await
}
