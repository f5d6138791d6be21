use crate::config::Config;
use crate::core_auth::driver::DriverFactory;
use crate::core_ftpcommand::dispatch::handle_commands;
use crate::core_ftpcommand::ftpcommand::CommandTable;
use crate::session::Session;
use anyhow::{Context, Result};
use log::{error, info};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};

/// Accepts control connections forever, one task per client.
///
/// `table` must be complete before this is called; sessions only read it.
pub async fn start_server(
    config: Arc<Config>,
    table: Arc<CommandTable>,
    driver_factory: DriverFactory,
) -> Result<()> {
    let bind_address = format!(
        "{}:{}",
        config.server.listen_address, config.server.listen_port
    );
    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    info!("Server listening on {}", bind_address);

    serve(listener, config, table, driver_factory).await
}

pub async fn serve(
    listener: TcpListener,
    config: Arc<Config>,
    table: Arc<CommandTable>,
    driver_factory: DriverFactory,
) -> Result<()> {
    let next_id = AtomicU64::new(1);

    loop {
        let (socket, addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!("Failed to accept connection: {}", e);
                continue;
            }
        };

        let id = next_id.fetch_add(1, Ordering::Relaxed);
        info!("FTP connect: ftp.connect, ID: {}, RemoteAddr: {}", id, addr);

        let config = Arc::clone(&config);
        let table = Arc::clone(&table);
        let driver_factory = Arc::clone(&driver_factory);

        tokio::spawn(async move {
            handle_connection(id, socket, config, table, driver_factory).await;
            info!("Connection closed for {:?}, ID: {}", addr, id);
        });
    }
}

pub async fn handle_connection(
    id: u64,
    socket: TcpStream,
    config: Arc<Config>,
    table: Arc<CommandTable>,
    driver_factory: DriverFactory,
) {
    let welcome = config.server.welcome_message.clone();
    let mut session = Session::new(id, Box::new(socket), config, driver_factory);

    if let Err(e) = session.write_message(220, &welcome).await {
        error!("Failed to send welcome, ID: {}, Error: {}", id, e);
        session.end().await;
        return;
    }

    handle_commands(session, table).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UserConfig;
    use crate::core_auth::fs_driver::FsDriver;
    use crate::core_ftpcommand::handlers::initialize_command_handlers;
    use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
    use tokio::net::tcp::OwnedReadHalf;

    async fn reply(reader: &mut BufReader<OwnedReadHalf>) -> String {
        let mut line = String::new();
        reader.read_line(&mut line).await.unwrap();
        line
    }

    fn pasv_port(reply: &str) -> u16 {
        let start = reply.find('(').unwrap() + 1;
        let end = reply.find(')').unwrap();
        let parts: Vec<u16> = reply[start..end]
            .split(',')
            .map(|p| p.parse().unwrap())
            .collect();
        parts[4] * 256 + parts[5]
    }

    #[tokio::test]
    async fn test_full_session_over_tcp() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"welcome aboard").unwrap();

        let mut config = Config::default();
        config.server.listen_address = "127.0.0.1".to_string();
        config.server.root_dir = dir.path().to_string_lossy().into_owned();
        config.users.push(UserConfig {
            name: "alice".to_string(),
            password_hash: bcrypt::hash("secret", 4).unwrap(),
        });
        let config = Arc::new(config);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let table = Arc::new(initialize_command_handlers());
        let factory = FsDriver::factory(Arc::clone(&config));
        let server = tokio::spawn(serve(listener, config, table, factory));

        let (read_half, mut writer) = TcpStream::connect(addr).await.unwrap().into_split();
        let mut reader = BufReader::new(read_half);
        assert!(reply(&mut reader).await.starts_with("220 "));

        writer.write_all(b"LIST\r\n").await.unwrap();
        assert_eq!(reply(&mut reader).await, "530 Please login with USER and PASS\r\n");

        writer.write_all(b"USER alice\r\nPASS secret\r\n").await.unwrap();
        assert!(reply(&mut reader).await.starts_with("331 "));
        assert!(reply(&mut reader).await.starts_with("230 "));

        writer.write_all(b"PASV\r\n").await.unwrap();
        let port = pasv_port(&reply(&mut reader).await);

        let mut data = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
        writer.write_all(b"RETR readme.txt\r\n").await.unwrap();
        assert_eq!(reply(&mut reader).await, "150 Using transfer connection\r\n");
        let mut content = String::new();
        data.read_to_string(&mut content).await.unwrap();
        assert_eq!(content, "welcome aboard");
        assert_eq!(reply(&mut reader).await, "226 Closing transfer connection\r\n");

        writer.write_all(b"QUIT\r\n").await.unwrap();
        assert!(reply(&mut reader).await.starts_with("221 "));
        assert_eq!(reply(&mut reader).await, "");

        server.abort();
    }
}
