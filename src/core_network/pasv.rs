use crate::core_network::transfer::TransferHandler;
use crate::session::Session;
use anyhow::Result;
use async_trait::async_trait;
use log::{debug, error};
use std::io;
use std::net::Ipv4Addr;
use tokio::net::{TcpListener, TcpStream};

/// Passive-mode handle: the client connects to a listener we opened.
pub struct PassiveTransfer {
    listener: Option<TcpListener>,
}

impl PassiveTransfer {
    pub fn new(listener: TcpListener) -> Self {
        Self {
            listener: Some(listener),
        }
    }
}

#[async_trait]
impl TransferHandler for PassiveTransfer {
    async fn open(&mut self) -> io::Result<TcpStream> {
        let listener = self
            .listener
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "passive listener closed"))?;
        let (data_stream, addr) = listener.accept().await?;
        debug!("Accepted data connection from: {}", addr);
        Ok(data_stream)
    }

    fn close(&mut self) {
        self.listener = None;
    }
}

/// Sets up a passive mode listener on an ephemeral port of `bind_address`.
/// Returns the listener and its port.
pub async fn setup_pasv_listener(bind_address: &str) -> io::Result<(TcpListener, u16)> {
    let listener = TcpListener::bind((bind_address, 0)).await?;
    let port = listener.local_addr()?.port();
    debug!("PASV listener set up on IP: {}, Port: {}", bind_address, port);
    Ok((listener, port))
}

/// Formats the address part of a 227 reply.
pub fn format_pasv_address(ip: Ipv4Addr, port: u16) -> String {
    let [a, b, c, d] = ip.octets();
    format!("{},{},{},{},{},{}", a, b, c, d, port / 256, port % 256)
}

/// Opens a listener, declares it as the session's transfer, and returns its port.
async fn declare_passive(session: &mut Session) -> Result<Option<u16>> {
    let bind_address = session.config.server.listen_address.clone();
    match setup_pasv_listener(&bind_address).await {
        Ok((listener, port)) => {
            session.declare_transfer(Box::new(PassiveTransfer::new(listener)));
            Ok(Some(port))
        }
        Err(e) => {
            error!("Failed to set up passive listener, ID: {}, Error: {}", session.id, e);
            session.write_message(425, "Can't open data connection").await?;
            Ok(None)
        }
    }
}

/// Handles the PASV FTP command.
pub async fn handle_pasv_command(session: &mut Session) -> Result<()> {
    let pasv_ip: Ipv4Addr = match session.config.server.pasv_address.parse() {
        Ok(ip) => ip,
        Err(e) => {
            error!("Invalid pasv_address {:?}: {}", session.config.server.pasv_address, e);
            session.write_message(425, "Can't open data connection").await?;
            return Ok(());
        }
    };

    if let Some(port) = declare_passive(session).await? {
        let reply = format!("Entering Passive Mode ({})", format_pasv_address(pasv_ip, port));
        session.write_message(227, &reply).await?;
    }
    Ok(())
}

/// Handles the EPSV FTP command.
pub async fn handle_epsv_command(session: &mut Session) -> Result<()> {
    if let Some(port) = declare_passive(session).await? {
        let reply = format!("Entering Extended Passive Mode (|||{}|)", port);
        session.write_message(229, &reply).await?;
    }
    Ok(())
}
