use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::AsyncRead;

pub type FileReader = Box<dyn AsyncRead + Send + Unpin>;

/// Builds a fresh, unauthenticated driver. Invoked once per successful login.
pub type DriverFactory = Arc<dyn Fn() -> Box<dyn Driver> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    pub is_dir: bool,
    pub modified: DateTime<Utc>,
}

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Login incorrect")]
    AuthenticationFailed,

    #[error("No such file or directory: {0}")]
    NotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Is a directory: {0}")]
    IsADirectory(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl DriverError {
    pub fn from_io(path: &str, e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => DriverError::NotFound(path.to_string()),
            io::ErrorKind::PermissionDenied => DriverError::PermissionDenied(path.to_string()),
            io::ErrorKind::AlreadyExists => DriverError::AlreadyExists(path.to_string()),
            _ => DriverError::Io(e),
        }
    }

    pub fn to_ftp_response(&self) -> (u16, String) {
        match self {
            DriverError::AuthenticationFailed => (530, self.to_string()),
            DriverError::Io(_) => (
                451,
                "Requested action aborted. Local error in processing.".to_string(),
            ),
            _ => (550, self.to_string()),
        }
    }
}

/// Storage backend bound to a session after login.
///
/// Every path is a logical, absolute, normalized path as tracked by the
/// session; the driver decides where it lives.
#[async_trait]
pub trait Driver: Send + Sync {
    async fn authenticate(&self, user: &str, password: &str) -> Result<(), DriverError>;

    /// Succeeds when `path` exists and is a directory.
    async fn change_dir(&self, path: &str) -> Result<(), DriverError>;

    async fn stat(&self, path: &str) -> Result<FileInfo, DriverError>;

    async fn list_files(&self, path: &str) -> Result<Vec<FileInfo>, DriverError>;

    async fn open_file(&self, path: &str, offset: u64) -> Result<FileReader, DriverError>;

    /// Stores everything `data` yields and returns the byte count.
    /// With `append` the offset is ignored; with an offset the file is
    /// overwritten from there without being truncated.
    async fn put_file(
        &self,
        path: &str,
        data: &mut (dyn AsyncRead + Send + Unpin),
        offset: Option<u64>,
        append: bool,
    ) -> Result<u64, DriverError>;

    async fn rename(&self, from: &str, to: &str) -> Result<(), DriverError>;

    async fn delete_file(&self, path: &str) -> Result<(), DriverError>;

    async fn make_dir(&self, path: &str) -> Result<(), DriverError>;

    async fn delete_dir(&self, path: &str) -> Result<(), DriverError>;
}
