use thiserror::Error;

/// Abnormal end of a command handler, caught at the dispatch boundary.
#[derive(Error, Debug)]
pub enum HandlerFault {
    #[error("handler panicked: {0}")]
    Panicked(String),

    #[error("handler failed: {0:#}")]
    Failed(anyhow::Error),
}

impl HandlerFault {
    pub fn to_ftp_response(&self) -> (u16, &'static str) {
        (500, "Internal error")
    }
}
