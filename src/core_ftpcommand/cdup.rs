use crate::core_ftpcommand::cwd::change_directory;
use crate::session::Session;
use anyhow::Result;

/// Handles the CDUP (Change to Parent Directory) FTP command.
///
/// At the root this stays at the root, like `cd ..` would.
pub async fn handle_cdup_command(session: &mut Session) -> Result<()> {
    change_directory(session, "..").await
}
