use crate::constants::ROOT_PATH;
use crate::core_auth::driver::DriverError;
use crate::session::Session;
use anyhow::Result;
use log::warn;
use std::io;
use tokio::net::TcpStream;

/// Splits a raw command line into its verb and parameter.
///
/// The line terminator is stripped, the verb is everything up to the first
/// whitespace, and the parameter is the rest with surrounding blanks removed.
pub fn parse_line(line: &str) -> (&str, &str) {
    let line = line.trim_end_matches(['\r', '\n']);
    match line.split_once(|c: char| c.is_ascii_whitespace()) {
        Some((verb, param)) => (verb, param.trim()),
        None => (line, ""),
    }
}

/// Resolves `arg` against the current directory `cwd` into an absolute
/// logical path. `.` and `..` are folded lexically and `..` never climbs
/// above the root.
pub fn normalize_path(cwd: &str, arg: &str) -> String {
    let joined = if arg.starts_with('/') {
        arg.to_string()
    } else {
        format!("{}/{}", cwd, arg)
    };

    let mut parts: Vec<&str> = Vec::new();
    for part in joined.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            p => parts.push(p),
        }
    }

    if parts.is_empty() {
        ROOT_PATH.to_string()
    } else {
        format!("/{}", parts.join("/"))
    }
}

/// Quotes a path for a 257 reply, doubling embedded quotes.
pub fn quote_path(path: &str) -> String {
    format!("\"{}\"", path.replace('"', "\"\""))
}

/// Opens the declared transfer connection. `None` means the failure has
/// already been answered on the control connection.
pub async fn open_transfer(session: &mut Session) -> Result<Option<TcpStream>> {
    match session.transfer_open().await {
        Ok(conn) => Ok(Some(conn)),
        Err(e) if e.is_reported() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Answers a failed storage operation.
pub async fn reply_driver_error(session: &mut Session, e: &DriverError) -> io::Result<()> {
    warn!("Driver error, ID: {}, Command: {}, Error: {}", session.id, session.command, e);
    let (code, message) = e.to_ftp_response();
    session.write_message(code, &message).await
}

/// Answers a command that needs an argument but received none.
pub async fn reply_missing_argument(session: &mut Session) -> io::Result<()> {
    warn!("{} command received with no arguments", session.command);
    session
        .write_message(501, "Syntax error in parameters or arguments.")
        .await
}
