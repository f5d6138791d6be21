use crate::core_ftpcommand::error::HandlerFault;
use crate::core_ftpcommand::ftpcommand::{CommandFn, CommandTable};
use crate::core_ftpcommand::utils::parse_line;
use crate::core_log::logger::panic_message;
use crate::core_network::transport::Incoming;
use crate::session::{Session, SessionState};
use futures::FutureExt;
use log::{debug, error, warn};
use std::io;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Hides the password of a PASS line.
fn loggable(line: &str) -> &str {
    match parse_line(line) {
        (verb, _) if verb.eq_ignore_ascii_case("PASS") => "PASS ****",
        _ => line,
    }
}

/// Reads and executes commands until the control connection goes away,
/// then tears the session down.
pub async fn handle_commands(mut session: Session, table: Arc<CommandTable>) {
    loop {
        if session.state() == SessionState::Terminated {
            debug!("Clean disconnect: ftp.disconnect, ID: {}, Clean: {}", session.id, true);
            break;
        }

        match session.read_line().await {
            Ok(Incoming::Line(line)) => {
                debug!("FTP RECV: ftp.cmd_recv, ID: {}, Line: {:?}", session.id, loggable(&line));
                if let Err(e) = handle_command(&mut session, &table, &line).await {
                    error!("Write error: ftp.write_error, ID: {}, Error: {}", session.id, e);
                    break;
                }
            }
            Ok(Incoming::TooLong) => {
                warn!("Line too long: ftp.cmd_recv, ID: {}", session.id);
                if let Err(e) = session.write_message(500, "Command line too long").await {
                    error!("Write error: ftp.write_error, ID: {}, Error: {}", session.id, e);
                    break;
                }
            }
            Ok(Incoming::Closed) => {
                debug!("TCP disconnect: ftp.disconnect, ID: {}, Clean: {}", session.id, false);
                break;
            }
            Err(e) => {
                error!("Read error: ftp.read_error, ID: {}, Error: {}", session.id, e);
                break;
            }
        }
    }

    session.end().await;
}

/// Executes one received line. Only a failure to answer on the control
/// connection is returned; every other fault is answered here.
pub async fn handle_command(
    session: &mut Session,
    table: &CommandTable,
    line: &str,
) -> io::Result<()> {
    let (verb, param) = parse_line(line);
    let command = verb.to_ascii_uppercase();

    let Some(desc) = table.get(&command) else {
        return session.write_message(500, "Unknown command").await;
    };

    let Some(handler) = desc.handler else {
        return session
            .write_message(500, &format!("{} command not supported", command))
            .await;
    };

    if !session.is_authenticated() && !desc.open {
        return session
            .write_message(530, "Please login with USER and PASS")
            .await;
    }

    session.begin_command(&command, param);

    if let Err(fault) = run_guarded(session, handler).await {
        error!(
            "Internal error: ftp.internal_error, ID: {}, Command: {}, Error: {}",
            session.id, command, fault
        );
        let (code, message) = fault.to_ftp_response();
        session.write_message(code, message).await?;
    }

    Ok(())
}

/// Runs `handler`, turning a panic or an error into a `HandlerFault`.
async fn run_guarded(session: &mut Session, handler: CommandFn) -> Result<(), HandlerFault> {
    match AssertUnwindSafe(handler(session)).catch_unwind().await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(HandlerFault::Failed(e)),
        Err(payload) => Err(HandlerFault::Panicked(panic_message(payload.as_ref()))),
    }
}
