use crate::session::{Session, TransferType};
use anyhow::Result;
use log::info;

/// Handles the TYPE FTP command.
///
/// `A` and `I` are accepted, as is `L 8` which is the same as `I`. Data is
/// never converted; the type is only recorded.
pub async fn handle_type_command(session: &mut Session) -> Result<()> {
    let arg = session.param.to_ascii_uppercase();
    let parts: Vec<&str> = arg.split_whitespace().collect();

    let transfer_type = match parts.as_slice() {
        ["A"] | ["A", "N"] => Some(TransferType::Ascii),
        ["I"] | ["L", "8"] => Some(TransferType::Image),
        _ => None,
    };

    match transfer_type {
        Some(transfer_type) => {
            info!("Transfer type set, ID: {}, Type: {:?}", session.id, transfer_type);
            session.transfer_type = transfer_type;
            let reply = match transfer_type {
                TransferType::Ascii => "Switching to ASCII mode.",
                TransferType::Image => "Switching to Binary mode.",
            };
            session.write_message(200, reply).await?;
        }
        None if parts.is_empty() => {
            session
                .write_message(501, "Syntax error in parameters or arguments.")
                .await?;
        }
        None => {
            session
                .write_message(504, "Command not implemented for that parameter.")
                .await?;
        }
    }
    Ok(())
}

/// Handles the MODE FTP command. Only stream mode exists.
pub async fn handle_mode_command(session: &mut Session) -> Result<()> {
    if session.param.eq_ignore_ascii_case("S") {
        session.write_message(200, "Mode set to S.").await?;
    } else {
        session
            .write_message(504, "Command not implemented for that parameter.")
            .await?;
    }
    Ok(())
}

/// Handles the STRU FTP command. Only file structure exists.
pub async fn handle_stru_command(session: &mut Session) -> Result<()> {
    if session.param.eq_ignore_ascii_case("F") {
        session.write_message(200, "Structure set to F.").await?;
    } else {
        session
            .write_message(504, "Command not implemented for that parameter.")
            .await?;
    }
    Ok(())
}
