use log::debug;
use std::io;
use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter,
    ReadHalf, WriteHalf,
};

/// Anything that can carry a control connection.
pub trait Connection: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Connection for T {}

pub type BoxedConnection = Box<dyn Connection>;

/// Result of one line read on the control connection.
#[derive(Debug, PartialEq, Eq)]
pub enum Incoming {
    /// A full line, terminator included.
    Line(String),
    /// The line exceeded the length bound and was discarded.
    TooLong,
    /// The peer closed the stream, or the reader was already released.
    Closed,
}

/// Buffered, line-oriented view of a control connection.
pub struct LineTransport {
    reader: Option<BufReader<ReadHalf<BoxedConnection>>>,
    writer: BufWriter<WriteHalf<BoxedConnection>>,
    max_line_length: usize,
}

impl LineTransport {
    pub fn new(connection: BoxedConnection, max_line_length: usize) -> Self {
        let (read_half, write_half) = tokio::io::split(connection);
        Self {
            reader: Some(BufReader::new(read_half)),
            writer: BufWriter::new(write_half),
            max_line_length: max_line_length.max(1),
        }
    }

    pub fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    /// Reads up to and including the next `\n`.
    ///
    /// A stream ending in the middle of a line counts as closed: the partial
    /// command is never executed.
    pub async fn read_line(&mut self) -> io::Result<Incoming> {
        let limit = self.max_line_length as u64;
        let Some(reader) = self.reader.as_mut() else {
            return Ok(Incoming::Closed);
        };

        let mut buf = Vec::new();
        let n = (&mut *reader).take(limit).read_until(b'\n', &mut buf).await?;
        if n == 0 {
            return Ok(Incoming::Closed);
        }

        if buf.last() != Some(&b'\n') {
            if (buf.len() as u64) < limit {
                return Ok(Incoming::Closed);
            }

            // Skip the rest of the oversized line
            loop {
                let mut discard = Vec::new();
                let n = (&mut *reader)
                    .take(limit)
                    .read_until(b'\n', &mut discard)
                    .await?;
                if n == 0 {
                    return Ok(Incoming::Closed);
                }
                if discard.last() == Some(&b'\n') {
                    break;
                }
            }
            return Ok(Incoming::TooLong);
        }

        Ok(Incoming::Line(String::from_utf8_lossy(&buf).into_owned()))
    }

    /// Writes `line` followed by CRLF and flushes, as one unit.
    pub async fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\r\n").await?;
        self.writer.flush().await
    }

    /// Writes several CRLF-terminated lines with a single flush.
    pub async fn write_lines(&mut self, lines: &[String]) -> io::Result<()> {
        for line in lines {
            self.writer.write_all(line.as_bytes()).await?;
            self.writer.write_all(b"\r\n").await?;
        }
        self.writer.flush().await
    }

    /// Releases the reader and shuts the write side down.
    pub async fn shutdown(&mut self) {
        self.reader = None;
        if let Err(e) = self.writer.shutdown().await {
            debug!("Control connection shutdown: {}", e);
        }
    }
}
