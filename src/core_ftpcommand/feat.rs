use crate::session::Session;
use anyhow::Result;
use log::info;

const FEATURES: [&str; 6] = ["EPSV", "MDTM", "PASV", "REST STREAM", "SIZE", "UTF8"];

/// Handles the FEAT (Feature) FTP command.
///
/// This function responds with a list of supported features.
pub async fn handle_feat_command(session: &mut Session) -> Result<()> {
    let body: Vec<String> = FEATURES.iter().map(|f| format!(" {}", f)).collect();

    info!("Responding to FEAT command with supported features.");
    session.write_multiline(211, "Features:", &body, "End").await?;
    Ok(())
}

/// Handles the OPTS FTP command. Only `UTF8 ON` is understood.
pub async fn handle_opts_command(session: &mut Session) -> Result<()> {
    if session.param.eq_ignore_ascii_case("UTF8 ON") {
        session.write_message(200, "Always in UTF8 mode.").await?;
    } else {
        session.write_message(501, "Option not understood.").await?;
    }
    Ok(())
}
