use crate::core_network::transfer::TransferHandler;
use crate::session::Session;
use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info};
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tokio::net::TcpStream;

/// Active-mode handle: we connect back to the address given by PORT.
pub struct ActiveTransfer {
    addr: SocketAddr,
    closed: bool,
}

impl ActiveTransfer {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr, closed: false }
    }
}

#[async_trait]
impl TransferHandler for ActiveTransfer {
    async fn open(&mut self) -> io::Result<TcpStream> {
        if self.closed {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "active transfer closed"));
        }
        debug!("Connecting to client data port {}", self.addr);
        TcpStream::connect(self.addr).await
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

/// Parses `h1,h2,h3,h4,p1,p2` into a socket address.
pub fn parse_port_argument(arg: &str) -> Option<SocketAddr> {
    let parts: Vec<u8> = arg
        .split(',')
        .map(|x| x.trim().parse::<u8>())
        .collect::<Result<_, _>>()
        .ok()?;
    if parts.len() != 6 {
        return None;
    }

    let ip = Ipv4Addr::new(parts[0], parts[1], parts[2], parts[3]);
    let port = (parts[4] as u16) << 8 | parts[5] as u16;
    Some(SocketAddr::new(IpAddr::V4(ip), port))
}

/// Handles the PORT (Active Mode) FTP command.
pub async fn handle_port_command(session: &mut Session) -> Result<()> {
    let Some(addr) = parse_port_argument(&session.param) else {
        session
            .write_message(501, "Syntax error in parameters or arguments.")
            .await?;
        return Ok(());
    };

    info!("Received PORT command, ID: {}, Address: {}", session.id, addr);
    session.declare_transfer(Box::new(ActiveTransfer::new(addr)));
    session.write_message(200, "Command okay.").await?;
    Ok(())
}
