use crate::config::Config;
use crate::constants::ROOT_PATH;
use crate::core_auth::driver::{Driver, DriverError, DriverFactory};
use crate::core_network::transfer::{TransferError, TransferHandler};
use crate::core_network::transport::{BoxedConnection, Incoming, LineTransport};
use chrono::{DateTime, Utc};
use log::{debug, error, info};
use std::io;
use std::sync::Arc;
use tokio::net::TcpStream;

/// Where a session stands in its login lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
    Terminated,
}

/// Representation type negotiated with TYPE. Data is always moved as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferType {
    Ascii,
    Image,
}

#[derive(Debug, PartialEq, Eq)]
pub enum LoginError {
    AlreadyLoggedIn,
    Rejected,
}

/// The complete live state of one control connection.
pub struct Session {
    pub id: u64,
    transport: LineTransport,
    user: Option<String>,
    pub pending_user: Option<String>,
    path: String,
    pub command: String,
    pub param: String,
    connected_at: DateTime<Utc>,
    pub rename_from: Option<String>,
    pub restart_offset: Option<u64>,
    transfer: Option<Box<dyn TransferHandler>>,
    /// Protection level negotiated with PROT. Informational only: no TLS
    /// layer exists, so `PROT P` is refused and this never becomes true.
    pub transfer_tls: bool,
    pub transfer_type: TransferType,
    driver: Option<Box<dyn Driver>>,
    driver_factory: DriverFactory,
    pub config: Arc<Config>,
}

impl Session {
    pub fn new(
        id: u64,
        connection: BoxedConnection,
        config: Arc<Config>,
        driver_factory: DriverFactory,
    ) -> Self {
        Self {
            id,
            transport: LineTransport::new(connection, config.server.max_line_length),
            user: None,
            pending_user: None,
            path: String::from(ROOT_PATH),
            command: String::new(),
            param: String::new(),
            connected_at: Utc::now(),
            rename_from: None,
            restart_offset: None,
            transfer: None,
            transfer_tls: false,
            transfer_type: TransferType::Ascii,
            driver: None,
            driver_factory,
            config,
        }
    }

    pub fn state(&self) -> SessionState {
        if !self.transport.is_open() {
            SessionState::Terminated
        } else if self.driver.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        }
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Changes the working directory. Callers validate `path` first.
    pub fn set_path(&mut self, path: String) {
        self.path = path;
    }

    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    pub fn is_authenticated(&self) -> bool {
        self.driver.is_some()
    }

    /// The storage driver bound at login.
    pub fn driver(&self) -> anyhow::Result<&dyn Driver> {
        self.driver
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("no driver bound to session {}", self.id))
    }

    /// Builds a driver from the factory and binds it if `user` and
    /// `password` are accepted. Nothing is assigned on failure.
    pub async fn login(&mut self, user: &str, password: &str) -> Result<(), LoginError> {
        if self.driver.is_some() {
            return Err(LoginError::AlreadyLoggedIn);
        }

        let driver = (self.driver_factory)();
        match driver.authenticate(user, password).await {
            Ok(()) => {
                self.driver = Some(driver);
                self.user = Some(user.to_string());
                info!("FTP login: ftp.login, ID: {}, User: {}", self.id, user);
                Ok(())
            }
            Err(DriverError::AuthenticationFailed) => {
                info!("FTP login refused: ftp.login_failed, ID: {}, User: {}", self.id, user);
                Err(LoginError::Rejected)
            }
            Err(e) => {
                error!("FTP login error: ftp.login_failed, ID: {}, User: {}, Error: {}", self.id, user, e);
                Err(LoginError::Rejected)
            }
        }
    }

    pub async fn read_line(&mut self) -> io::Result<Incoming> {
        self.transport.read_line().await
    }

    /// Writes `<code> <message>\r\n` and flushes.
    pub async fn write_message(&mut self, code: u16, message: &str) -> io::Result<()> {
        self.write_line(&format!("{} {}", code, message)).await
    }

    /// Writes a multi-line reply: `<code>-<first>`, the body lines as given,
    /// then `<code> <last>`.
    pub async fn write_multiline(
        &mut self,
        code: u16,
        first: &str,
        body: &[String],
        last: &str,
    ) -> io::Result<()> {
        let mut lines = Vec::with_capacity(body.len() + 2);
        lines.push(format!("{}-{}", code, first));
        lines.extend(body.iter().cloned());
        lines.push(format!("{} {}", code, last));
        for line in &lines {
            debug!("FTP SEND: ftp.cmd_send, ID: {}, Line: {}", self.id, line);
        }
        self.transport.write_lines(&lines).await
    }

    async fn write_line(&mut self, line: &str) -> io::Result<()> {
        debug!("FTP SEND: ftp.cmd_send, ID: {}, Line: {}", self.id, line);
        self.transport.write_line(line).await
    }

    /// Records the verb and parameter about to run and drops staging values
    /// that were not consumed by the command right after them.
    pub fn begin_command(&mut self, command: &str, param: &str) {
        if self.command != "RNFR" {
            self.rename_from = None;
        }
        if self.command != "REST" {
            self.restart_offset = None;
        }
        self.command = command.to_string();
        self.param = param.to_string();
    }

    pub fn has_transfer(&self) -> bool {
        self.transfer.is_some()
    }

    /// Installs the handle for the next transfer, closing any previous one.
    pub fn declare_transfer(&mut self, handler: Box<dyn TransferHandler>) {
        if let Some(mut previous) = self.transfer.take() {
            previous.close();
            debug!("FTP Transfer connection replaced: ftp.transfer_close, ID: {}", self.id);
        }
        self.transfer = Some(handler);
    }

    /// Establishes the declared transfer connection and acknowledges it with 150.
    pub async fn transfer_open(&mut self) -> Result<TcpStream, TransferError> {
        let Some(handler) = self.transfer.as_mut() else {
            self.write_message(550, "No connection declared").await?;
            return Err(TransferError::NotDeclared);
        };

        match handler.open().await {
            Ok(conn) => {
                debug!(
                    "FTP Transfer connection opened: ftp.transfer_open, ID: {}, RemoteAddr: {:?}, LocalAddr: {:?}",
                    self.id,
                    conn.peer_addr(),
                    conn.local_addr()
                );
                self.write_message(150, "Using transfer connection").await?;
                Ok(conn)
            }
            Err(e) => {
                error!("FTP Transfer connection open failed: ftp.transfer_open, ID: {}, Error: {}", self.id, e);
                if let Some(mut handler) = self.transfer.take() {
                    handler.close();
                }
                self.write_message(425, "Can't open data connection").await?;
                Err(TransferError::OpenFailed(e))
            }
        }
    }

    /// Closes the active transfer with a 226. Does nothing when none is active.
    pub async fn transfer_close(&mut self) -> io::Result<()> {
        if let Some(mut handler) = self.transfer.take() {
            handler.close();
            debug!("FTP Transfer connection closed: ftp.transfer_close, ID: {}", self.id);
            self.write_message(226, "Closing transfer connection").await?;
        }
        Ok(())
    }

    /// Drops the active transfer without a 226, for transfers that failed
    /// midway and are answered by the caller.
    pub fn transfer_abort(&mut self) {
        if let Some(mut handler) = self.transfer.take() {
            handler.close();
            debug!("FTP Transfer connection aborted: ftp.transfer_close, ID: {}", self.id);
        }
    }

    /// Closes the transfer handle and the control connection. Used by QUIT.
    pub async fn disconnect(&mut self) {
        if let Some(mut handler) = self.transfer.take() {
            handler.close();
        }
        self.transport.shutdown().await;
    }

    /// Final teardown once the command loop is over. No message is sent.
    pub async fn end(&mut self) {
        if let Some(mut handler) = self.transfer.take() {
            handler.close();
            debug!("FTP Transfer connection dropped: ftp.transfer_close, ID: {}", self.id);
        }
        self.transport.shutdown().await;
        info!(
            "FTP session ended: ftp.disconnect, ID: {}, User: {}, Duration: {}s",
            self.id,
            self.user.as_deref().unwrap_or("-"),
            (Utc::now() - self.connected_at).num_seconds()
        );
    }
}
