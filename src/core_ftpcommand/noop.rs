use crate::session::Session;
use anyhow::Result;

pub async fn handle_noop_command(session: &mut Session) -> Result<()> {
    session.write_message(200, "OK, n00p n00p !").await?;
    Ok(())
}
