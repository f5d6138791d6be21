use async_trait::async_trait;
use std::io;
use thiserror::Error;
use tokio::net::TcpStream;

/// Lifecycle of one secondary (data) connection.
///
/// A handle is declared by PASV/EPSV/PORT and opened by the next transfer
/// command. `close` must be safe to call on a handle that was never opened.
#[async_trait]
pub trait TransferHandler: Send + Sync {
    async fn open(&mut self) -> io::Result<TcpStream>;

    fn close(&mut self);
}

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("No connection declared")]
    NotDeclared,

    #[error("Failed to open transfer connection: {0}")]
    OpenFailed(#[source] io::Error),

    #[error("Control connection failure: {0}")]
    Control(#[from] io::Error),
}

impl TransferError {
    /// Whether the client has already been told about the failure.
    pub fn is_reported(&self) -> bool {
        !matches!(self, TransferError::Control(_))
    }
}
