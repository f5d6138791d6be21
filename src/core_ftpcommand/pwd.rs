// src/core_ftpcommand/pwd.rs
use crate::core_ftpcommand::utils::quote_path;
use crate::session::Session;
use anyhow::Result;

pub async fn handle_pwd_command(session: &mut Session) -> Result<()> {
    let response = format!("{} is the current directory.", quote_path(session.path()));
    session.write_message(257, &response).await?;
    Ok(())
}
