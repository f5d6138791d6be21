use crate::core_ftpcommand::ftpcommand::{CommandDesc, CommandTable};
use crate::core_ftpcommand::{
    allo, cdup, cwd, dele, feat, list, mdtm, mkd, noop, pass, prot, pwd, quit, rest, retr, rmd,
    rnfr, rnto, size, stor, syst, type_, user,
};

// Data connection verbs live with the network code
use crate::core_network::pasv;
use crate::core_network::port;

/// Builds the verb table shared by every session.
///
/// The first flag of each entry tells whether the verb may run before login.
pub fn initialize_command_handlers() -> CommandTable {
    let mut handlers = CommandTable::new();

    // Allowed before login
    handlers.insert("USER", CommandDesc::new(true, |s| Box::pin(user::handle_user_command(s))));
    handlers.insert("PASS", CommandDesc::new(true, |s| Box::pin(pass::handle_pass_command(s))));
    handlers.insert("QUIT", CommandDesc::new(true, |s| Box::pin(quit::handle_quit_command(s))));
    handlers.insert("FEAT", CommandDesc::new(true, |s| Box::pin(feat::handle_feat_command(s))));
    handlers.insert("OPTS", CommandDesc::new(true, |s| Box::pin(feat::handle_opts_command(s))));
    handlers.insert("SYST", CommandDesc::new(true, |s| Box::pin(syst::handle_syst_command(s))));
    handlers.insert("NOOP", CommandDesc::new(true, |s| Box::pin(noop::handle_noop_command(s))));
    handlers.insert("AUTH", CommandDesc::unsupported(true));

    // Navigation
    handlers.insert("PWD", CommandDesc::new(false, |s| Box::pin(pwd::handle_pwd_command(s))));
    handlers.insert("XPWD", CommandDesc::new(false, |s| Box::pin(pwd::handle_pwd_command(s))));
    handlers.insert("CWD", CommandDesc::new(false, |s| Box::pin(cwd::handle_cwd_command(s))));
    handlers.insert("XCWD", CommandDesc::new(false, |s| Box::pin(cwd::handle_cwd_command(s))));
    handlers.insert("CDUP", CommandDesc::new(false, |s| Box::pin(cdup::handle_cdup_command(s))));
    handlers.insert("XCUP", CommandDesc::new(false, |s| Box::pin(cdup::handle_cdup_command(s))));

    // Transfer parameters
    handlers.insert("TYPE", CommandDesc::new(false, |s| Box::pin(type_::handle_type_command(s))));
    handlers.insert("MODE", CommandDesc::new(false, |s| Box::pin(type_::handle_mode_command(s))));
    handlers.insert("STRU", CommandDesc::new(false, |s| Box::pin(type_::handle_stru_command(s))));
    handlers.insert("PASV", CommandDesc::new(false, |s| Box::pin(pasv::handle_pasv_command(s))));
    handlers.insert("EPSV", CommandDesc::new(false, |s| Box::pin(pasv::handle_epsv_command(s))));
    handlers.insert("PORT", CommandDesc::new(false, |s| Box::pin(port::handle_port_command(s))));
    handlers.insert("PBSZ", CommandDesc::new(false, |s| Box::pin(prot::handle_pbsz_command(s))));
    handlers.insert("PROT", CommandDesc::new(false, |s| Box::pin(prot::handle_prot_command(s))));
    handlers.insert("REST", CommandDesc::new(false, |s| Box::pin(rest::handle_rest_command(s))));
    handlers.insert("ALLO", CommandDesc::new(false, |s| Box::pin(allo::handle_allo_command(s))));

    // Transfers
    handlers.insert("LIST", CommandDesc::new(false, |s| Box::pin(list::handle_list_command(s))));
    handlers.insert("NLST", CommandDesc::new(false, |s| Box::pin(list::handle_nlst_command(s))));
    handlers.insert("RETR", CommandDesc::new(false, |s| Box::pin(retr::handle_retr_command(s))));
    handlers.insert("STOR", CommandDesc::new(false, |s| Box::pin(stor::handle_stor_command(s))));
    handlers.insert("APPE", CommandDesc::new(false, |s| Box::pin(stor::handle_appe_command(s))));

    // File management
    handlers.insert("RNFR", CommandDesc::new(false, |s| Box::pin(rnfr::handle_rnfr_command(s))));
    handlers.insert("RNTO", CommandDesc::new(false, |s| Box::pin(rnto::handle_rnto_command(s))));
    handlers.insert("DELE", CommandDesc::new(false, |s| Box::pin(dele::handle_dele_command(s))));
    handlers.insert("MKD", CommandDesc::new(false, |s| Box::pin(mkd::handle_mkd_command(s))));
    handlers.insert("XMKD", CommandDesc::new(false, |s| Box::pin(mkd::handle_mkd_command(s))));
    handlers.insert("RMD", CommandDesc::new(false, |s| Box::pin(rmd::handle_rmd_command(s))));
    handlers.insert("XRMD", CommandDesc::new(false, |s| Box::pin(rmd::handle_rmd_command(s))));
    handlers.insert("SIZE", CommandDesc::new(false, |s| Box::pin(size::handle_size_command(s))));
    handlers.insert("MDTM", CommandDesc::new(false, |s| Box::pin(mdtm::handle_mdtm_command(s))));
    handlers.insert("SITE", CommandDesc::unsupported(false));

    handlers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, UserConfig};
    use crate::core_auth::fs_driver::FsDriver;
    use crate::core_ftpcommand::dispatch::handle_command;
    use crate::session::tests::next_reply;
    use crate::session::{Session, SessionState};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt, BufReader, DuplexStream};
    use tokio::net::TcpListener;

    struct Harness {
        session: Session,
        client: BufReader<DuplexStream>,
        table: CommandTable,
        dir: TempDir,
    }

    impl Harness {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let mut config = Config::default();
            config.server.root_dir = dir.path().to_string_lossy().into_owned();
            config.server.listen_address = "127.0.0.1".to_string();
            config.users.push(UserConfig {
                name: "alice".to_string(),
                password_hash: bcrypt::hash("secret", 4).unwrap(),
            });
            let config = Arc::new(config);

            let (server, client) = duplex(64 * 1024);
            let session = Session::new(
                1,
                Box::new(server),
                Arc::clone(&config),
                FsDriver::factory(config),
            );

            Self {
                session,
                client: BufReader::new(client),
                table: initialize_command_handlers(),
                dir,
            }
        }

        async fn send(&mut self, line: &str) -> String {
            handle_command(&mut self.session, &self.table, &format!("{}\r\n", line))
                .await
                .unwrap();
            next_reply(&mut self.client).await
        }

        async fn login(&mut self) {
            assert_eq!(self.send("USER alice").await, "331 User name okay, need password.\r\n");
            assert_eq!(self.send("PASS secret").await, "230 User logged in, proceed.\r\n");
        }

        /// Declares an active-mode transfer towards a fresh local listener.
        async fn port(&mut self) -> TcpListener {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let port = listener.local_addr().unwrap().port();
            let arg = format!("PORT 127,0,0,1,{},{}", port / 256, port % 256);
            assert_eq!(self.send(&arg).await, "200 Command okay.\r\n");
            listener
        }
    }

    #[tokio::test]
    async fn test_list_before_login_is_refused() {
        let mut h = Harness::new();
        assert_eq!(h.send("LIST /").await, "530 Please login with USER and PASS\r\n");
        assert_eq!(h.send("SYST").await, "215 UNIX Type: L8\r\n");
        assert_eq!(h.send("AUTH TLS").await, "500 AUTH command not supported\r\n");
        assert_eq!(h.session.state(), SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_login_sequence() {
        let mut h = Harness::new();
        assert_eq!(h.send("PASS secret").await, "503 Login with USER first.\r\n");
        assert_eq!(h.send("USER alice").await, "331 User name okay, need password.\r\n");
        assert_eq!(h.send("PASS wrong").await, "530 Login incorrect.\r\n");
        assert!(!h.session.is_authenticated());

        h.login().await;
        assert_eq!(h.session.user(), Some("alice"));
        assert_eq!(h.send("USER bob").await, "503 Already logged in.\r\n");
    }

    #[tokio::test]
    async fn test_list_without_declared_connection() {
        let mut h = Harness::new();
        h.login().await;
        assert_eq!(h.send("LIST /").await, "550 No connection declared\r\n");
        assert_eq!(h.send("NOOP").await, "200 OK, n00p n00p !\r\n");
    }

    #[tokio::test]
    async fn test_navigation() {
        let mut h = Harness::new();
        h.login().await;
        std::fs::create_dir_all(h.dir.path().join("pub/incoming")).unwrap();

        assert_eq!(h.send("PWD").await, "257 \"/\" is the current directory.\r\n");
        assert_eq!(h.send("CWD pub/incoming").await, "250 Directory successfully changed.\r\n");
        assert_eq!(h.send("PWD").await, "257 \"/pub/incoming\" is the current directory.\r\n");
        assert_eq!(h.send("CDUP").await, "250 Directory successfully changed.\r\n");
        assert_eq!(h.session.path(), "/pub");
        assert_eq!(h.send("CWD missing").await, "550 No such file or directory: /pub/missing\r\n");
        assert_eq!(h.session.path(), "/pub");
        assert_eq!(h.send("CWD ../../..").await, "250 Directory successfully changed.\r\n");
        assert_eq!(h.session.path(), "/");
    }

    #[tokio::test]
    async fn test_store_list_and_retrieve() {
        let mut h = Harness::new();
        h.login().await;

        let listener = h.port().await;
        let uploader = tokio::spawn(async move {
            let (mut data, _) = listener.accept().await.unwrap();
            data.write_all(b"hello world").await.unwrap();
        });
        assert_eq!(h.send("STOR hello.txt").await, "150 Using transfer connection\r\n");
        assert_eq!(next_reply(&mut h.client).await, "226 Closing transfer connection\r\n");
        uploader.await.unwrap();
        assert_eq!(std::fs::read(h.dir.path().join("hello.txt")).unwrap(), b"hello world");

        let listener = h.port().await;
        let lister = tokio::spawn(async move {
            let (mut data, _) = listener.accept().await.unwrap();
            let mut listing = String::new();
            data.read_to_string(&mut listing).await.unwrap();
            listing
        });
        assert_eq!(h.send("NLST").await, "150 Using transfer connection\r\n");
        assert_eq!(next_reply(&mut h.client).await, "226 Closing transfer connection\r\n");
        assert_eq!(lister.await.unwrap(), "hello.txt\r\n");

        let listener = h.port().await;
        assert_eq!(h.send("REST 6").await, "350 Restarting at 6. Send STORE or RETRIEVE.\r\n");
        let downloader = tokio::spawn(async move {
            let (mut data, _) = listener.accept().await.unwrap();
            let mut content = String::new();
            data.read_to_string(&mut content).await.unwrap();
            content
        });
        assert_eq!(h.send("RETR hello.txt").await, "150 Using transfer connection\r\n");
        assert_eq!(next_reply(&mut h.client).await, "226 Closing transfer connection\r\n");
        assert_eq!(downloader.await.unwrap(), "world");
        assert!(h.session.restart_offset.is_none());

        assert_eq!(h.send("SIZE hello.txt").await, "213 11\r\n");
    }

    #[tokio::test]
    async fn test_retr_missing_file_does_not_open_transfer() {
        let mut h = Harness::new();
        h.login().await;
        let _listener = h.port().await;

        assert_eq!(h.send("RETR nope.txt").await, "550 No such file or directory: /nope.txt\r\n");
        assert!(h.session.has_transfer());
    }

    #[tokio::test]
    async fn test_rename_sequence() {
        let mut h = Harness::new();
        h.login().await;
        std::fs::write(h.dir.path().join("a.txt"), b"a").unwrap();

        assert_eq!(h.send("RNTO b.txt").await, "503 Bad sequence of commands.\r\n");
        assert_eq!(h.send("RNFR a.txt").await, "350 Ready for RNTO.\r\n");
        assert_eq!(h.send("NOOP").await, "200 OK, n00p n00p !\r\n");
        assert_eq!(h.send("RNTO b.txt").await, "503 Bad sequence of commands.\r\n");

        assert_eq!(h.send("RNFR a.txt").await, "350 Ready for RNTO.\r\n");
        assert_eq!(h.send("RNTO b.txt").await, "250 Rename successful.\r\n");
        assert!(h.dir.path().join("b.txt").exists());
        assert!(h.session.rename_from.is_none());
    }

    #[tokio::test]
    async fn test_directory_management() {
        let mut h = Harness::new();
        h.login().await;

        assert_eq!(h.send("MKD docs").await, "257 \"/docs\" directory created.\r\n");
        assert_eq!(h.send("XMKD docs").await, "550 Already exists: /docs\r\n");
        assert_eq!(h.send("SIZE docs").await, "550 Not a regular file.\r\n");
        assert_eq!(h.send("RMD docs").await, "250 Directory removed.\r\n");

        std::fs::write(h.dir.path().join("x.bin"), b"xx").unwrap();
        assert_eq!(h.send("DELE x.bin").await, "250 File deleted.\r\n");
        assert_eq!(h.send("DELE").await, "501 Syntax error in parameters or arguments.\r\n");
    }

    #[tokio::test]
    async fn test_transfer_parameters() {
        let mut h = Harness::new();
        h.login().await;

        assert_eq!(h.send("TYPE I").await, "200 Switching to Binary mode.\r\n");
        assert_eq!(h.send("type a").await, "200 Switching to ASCII mode.\r\n");
        assert_eq!(h.send("TYPE E").await, "504 Command not implemented for that parameter.\r\n");
        assert_eq!(h.send("PROT P").await, "534 TLS not available. Please configure SSL/TLS in the server.\r\n");
        assert!(!h.session.transfer_tls);
        assert_eq!(h.send("PROT C").await, "200 Protection level set to Clear.\r\n");
        assert_eq!(h.send("PORT 1,2,3").await, "501 Syntax error in parameters or arguments.\r\n");
        assert_eq!(h.send("REST abc").await, "501 Syntax error in parameters or arguments.\r\n");

        let reply = h.send("PASV").await;
        assert!(reply.starts_with("227 Entering Passive Mode (127,0,0,1,"), "{}", reply);
        assert!(h.session.has_transfer());
        let reply = h.send("EPSV").await;
        assert!(reply.starts_with("229 Entering Extended Passive Mode (|||"), "{}", reply);
    }

    #[tokio::test]
    async fn test_feat_and_quit() {
        let mut h = Harness::new();
        assert_eq!(h.send("FEAT").await, "211-Features:\r\n");
        let mut rest = Vec::new();
        loop {
            let line = next_reply(&mut h.client).await;
            let done = line.starts_with("211 ");
            rest.push(line);
            if done {
                break;
            }
        }
        assert!(rest.contains(&" SIZE\r\n".to_string()));
        assert_eq!(rest.last().unwrap(), "211 End\r\n");

        assert_eq!(h.send("QUIT").await, "221 Service closing control connection.\r\n");
        assert_eq!(h.session.state(), SessionState::Terminated);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_writes_through_symlink_are_refused() {
        let mut h = Harness::new();
        h.login().await;
        let outside = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path(), h.dir.path().join("link")).unwrap();
        std::fs::write(h.dir.path().join("a.txt"), b"a").unwrap();

        assert_eq!(h.send("MKD link/newdir").await, "550 Permission denied: /link/newdir\r\n");
        assert_eq!(h.send("RNFR a.txt").await, "350 Ready for RNTO.\r\n");
        assert_eq!(h.send("RNTO link/a.txt").await, "550 Permission denied: /link/a.txt\r\n");

        let _listener = h.port().await;
        assert_eq!(h.send("STOR link/evil.txt").await, "150 Using transfer connection\r\n");
        assert_eq!(next_reply(&mut h.client).await, "550 Permission denied: /link/evil.txt\r\n");
        assert!(!h.session.has_transfer());
        assert!(std::fs::read_dir(outside.path()).unwrap().next().is_none());
    }
}
