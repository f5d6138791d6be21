use crate::config::Config;
use crate::constants::ROOT_PATH;
use crate::core_auth::driver::{Driver, DriverError, DriverFactory, FileInfo, FileReader};
use crate::core_auth::helper::verify_password;
use crate::core_ftpcommand::utils::normalize_path;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::io::SeekFrom;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncRead, AsyncSeekExt, AsyncWriteExt};

const ANONYMOUS_USERS: [&str; 2] = ["anonymous", "ftp"];

/// Serves files from `server.root_dir` and checks logins against the
/// `[[users]]` table of the configuration.
pub struct FsDriver {
    root: PathBuf,
    config: Arc<Config>,
}

impl FsDriver {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            root: PathBuf::from(&config.server.root_dir),
            config,
        }
    }

    pub fn factory(config: Arc<Config>) -> DriverFactory {
        Arc::new(move || Box::new(FsDriver::new(Arc::clone(&config))) as Box<dyn Driver>)
    }

    /// Maps a logical path below the root.
    ///
    /// The target, or its nearest existing ancestor when it does not exist
    /// yet, must not resolve outside the root through a symlink. A dangling
    /// symlink is refused outright.
    async fn resolve(&self, path: &str) -> Result<PathBuf, DriverError> {
        let logical = normalize_path(ROOT_PATH, path);
        let full = self.root.join(logical.trim_start_matches('/'));

        let root = fs::canonicalize(&self.root)
            .await
            .map_err(|e| DriverError::from_io(ROOT_PATH, e))?;

        let mut probe = full.as_path();
        let real = loop {
            match fs::canonicalize(probe).await {
                Ok(real) => break real,
                Err(_) if fs::symlink_metadata(probe).await.is_ok() => {
                    warn!("Unresolvable entry below the root: {:?}", probe);
                    return Err(DriverError::PermissionDenied(logical));
                }
                Err(_) => match probe.parent() {
                    Some(parent) => probe = parent,
                    None => return Err(DriverError::PermissionDenied(logical)),
                },
            }
        };

        if !real.starts_with(&root) {
            warn!("Path is outside of the allowed area: {:?}", real);
            return Err(DriverError::PermissionDenied(logical));
        }

        Ok(full)
    }
}

fn file_info(name: String, metadata: &std::fs::Metadata) -> FileInfo {
    let modified = metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());

    FileInfo {
        name,
        size: if metadata.is_dir() { 0 } else { metadata.len() },
        is_dir: metadata.is_dir(),
        modified,
    }
}

#[async_trait]
impl Driver for FsDriver {
    async fn authenticate(&self, user: &str, password: &str) -> Result<(), DriverError> {
        if self.config.server.allow_anonymous && ANONYMOUS_USERS.contains(&user.to_lowercase().as_str()) {
            debug!("Anonymous login accepted for {}", user);
            return Ok(());
        }

        let Some(entry) = self.config.find_user(user) else {
            return Err(DriverError::AuthenticationFailed);
        };

        // bcrypt verification blocks
        let password = password.to_string();
        let hashed = entry.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hashed))
            .await
            .unwrap_or(false);

        if matches {
            Ok(())
        } else {
            Err(DriverError::AuthenticationFailed)
        }
    }

    async fn change_dir(&self, path: &str) -> Result<(), DriverError> {
        let full = self.resolve(path).await?;
        let metadata = fs::metadata(&full)
            .await
            .map_err(|e| DriverError::from_io(path, e))?;
        if metadata.is_dir() {
            Ok(())
        } else {
            Err(DriverError::NotADirectory(path.to_string()))
        }
    }

    async fn stat(&self, path: &str) -> Result<FileInfo, DriverError> {
        let full = self.resolve(path).await?;
        let metadata = fs::metadata(&full)
            .await
            .map_err(|e| DriverError::from_io(path, e))?;
        let name = full
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| ROOT_PATH.to_string());
        Ok(file_info(name, &metadata))
    }

    async fn list_files(&self, path: &str) -> Result<Vec<FileInfo>, DriverError> {
        let full = self.resolve(path).await?;
        let mut entries = fs::read_dir(&full)
            .await
            .map_err(|e| DriverError::from_io(path, e))?;

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            match entry.metadata().await {
                Ok(metadata) => files.push(file_info(name, &metadata)),
                Err(e) => warn!("Skipping {:?} in listing: {}", entry.path(), e),
            }
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    async fn open_file(&self, path: &str, offset: u64) -> Result<FileReader, DriverError> {
        let full = self.resolve(path).await?;
        let mut file = File::open(&full)
            .await
            .map_err(|e| DriverError::from_io(path, e))?;
        if file.metadata().await?.is_dir() {
            return Err(DriverError::IsADirectory(path.to_string()));
        }
        if offset > 0 {
            file.seek(SeekFrom::Start(offset)).await?;
        }
        Ok(Box::new(file))
    }

    async fn put_file(
        &self,
        path: &str,
        data: &mut (dyn AsyncRead + Send + Unpin),
        offset: Option<u64>,
        append: bool,
    ) -> Result<u64, DriverError> {
        let full = self.resolve(path).await?;
        let mut options = OpenOptions::new();
        options.create(true);
        if append {
            options.append(true);
        } else if offset.is_some() {
            options.write(true);
        } else {
            options.write(true).truncate(true);
        }

        let mut file = options
            .open(&full)
            .await
            .map_err(|e| DriverError::from_io(path, e))?;
        if let (false, Some(offset)) = (append, offset) {
            file.seek(SeekFrom::Start(offset)).await?;
        }

        let written = tokio::io::copy(data, &mut file).await?;
        file.flush().await?;
        Ok(written)
    }

    async fn rename(&self, from: &str, to: &str) -> Result<(), DriverError> {
        let source = self.resolve(from).await?;
        let target = self.resolve(to).await?;
        fs::rename(&source, &target)
            .await
            .map_err(|e| DriverError::from_io(from, e))
    }

    async fn delete_file(&self, path: &str) -> Result<(), DriverError> {
        let full = self.resolve(path).await?;
        fs::remove_file(&full)
            .await
            .map_err(|e| DriverError::from_io(path, e))
    }

    async fn make_dir(&self, path: &str) -> Result<(), DriverError> {
        let full = self.resolve(path).await?;
        fs::create_dir(&full)
            .await
            .map_err(|e| DriverError::from_io(path, e))
    }

    async fn delete_dir(&self, path: &str) -> Result<(), DriverError> {
        if normalize_path(ROOT_PATH, path) == ROOT_PATH {
            return Err(DriverError::PermissionDenied(path.to_string()));
        }
        let full = self.resolve(path).await?;
        fs::remove_dir(&full)
            .await
            .map_err(|e| DriverError::from_io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UserConfig;
    use tokio::io::AsyncReadExt;

    fn driver_for(root: &std::path::Path, anonymous: bool) -> FsDriver {
        let mut config = Config::default();
        config.server.root_dir = root.to_string_lossy().into_owned();
        config.server.allow_anonymous = anonymous;
        config.users.push(UserConfig {
            name: "alice".to_string(),
            password_hash: bcrypt::hash("secret", 4).unwrap(),
        });
        FsDriver::new(Arc::new(config))
    }

    #[tokio::test]
    async fn test_authenticate() {
        let dir = tempfile::tempdir().unwrap();
        let driver = driver_for(dir.path(), false);

        assert!(driver.authenticate("alice", "secret").await.is_ok());
        assert!(matches!(
            driver.authenticate("alice", "nope").await,
            Err(DriverError::AuthenticationFailed)
        ));
        assert!(driver.authenticate("mallory", "secret").await.is_err());
        assert!(driver.authenticate("anonymous", "me@example.com").await.is_err());

        let driver = driver_for(dir.path(), true);
        assert!(driver.authenticate("Anonymous", "me@example.com").await.is_ok());
    }

    #[tokio::test]
    async fn test_directories_and_listing() {
        let dir = tempfile::tempdir().unwrap();
        let driver = driver_for(dir.path(), false);

        driver.make_dir("/pub").await.unwrap();
        assert!(driver.change_dir("/pub").await.is_ok());
        assert!(matches!(
            driver.change_dir("/missing").await,
            Err(DriverError::NotFound(_))
        ));

        std::fs::write(dir.path().join("pub/b.txt"), b"bbb").unwrap();
        std::fs::write(dir.path().join("pub/a.txt"), b"a").unwrap();
        let files = driver.list_files("/pub").await.unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
        assert_eq!(files[1].size, 3);

        assert!(matches!(
            driver.change_dir("/pub/a.txt").await,
            Err(DriverError::NotADirectory(_))
        ));
        assert!(driver.delete_dir("/").await.is_err());
    }

    #[tokio::test]
    async fn test_paths_stay_below_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("jail")).unwrap();
        std::fs::write(dir.path().join("outside.txt"), b"secret").unwrap();
        let driver = driver_for(&dir.path().join("jail"), false);

        assert!(matches!(
            driver.open_file("/../outside.txt", 0).await,
            Err(DriverError::NotFound(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinked_directory_cannot_escape_root() {
        let dir = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("secret.txt"), b"secret").unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();
        std::fs::write(dir.path().join("a.txt"), b"a").unwrap();
        let driver = driver_for(dir.path(), false);

        let mut data: &[u8] = b"evil!";
        assert!(matches!(
            driver.put_file("/link/evil.txt", &mut data, None, false).await,
            Err(DriverError::PermissionDenied(_))
        ));
        let mut data: &[u8] = b"evil!";
        assert!(matches!(
            driver.put_file("/link/secret.txt", &mut data, None, true).await,
            Err(DriverError::PermissionDenied(_))
        ));
        assert!(matches!(
            driver.make_dir("/link/newdir").await,
            Err(DriverError::PermissionDenied(_))
        ));
        assert!(matches!(
            driver.rename("/a.txt", "/link/a.txt").await,
            Err(DriverError::PermissionDenied(_))
        ));
        assert!(matches!(
            driver.open_file("/link/secret.txt", 0).await,
            Err(DriverError::PermissionDenied(_))
        ));
        assert!(matches!(
            driver.change_dir("/link").await,
            Err(DriverError::PermissionDenied(_))
        ));

        assert!(!outside.path().join("evil.txt").exists());
        assert!(!outside.path().join("newdir").exists());
        assert!(!outside.path().join("a.txt").exists());
        assert_eq!(std::fs::read(outside.path().join("secret.txt")).unwrap(), b"secret");
        assert!(dir.path().join("a.txt").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dangling_symlink_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        let target = outside.path().join("created.txt");
        std::os::unix::fs::symlink(&target, dir.path().join("dangling")).unwrap();
        let driver = driver_for(dir.path(), false);

        let mut data: &[u8] = b"evil!";
        assert!(matches!(
            driver.put_file("/dangling", &mut data, None, false).await,
            Err(DriverError::PermissionDenied(_))
        ));
        assert!(!target.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_inside_root_is_followed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("real")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("alias")).unwrap();
        let driver = driver_for(dir.path(), false);

        let mut data: &[u8] = b"ok";
        driver.put_file("/alias/f.txt", &mut data, None, false).await.unwrap();
        driver.make_dir("/alias/sub").await.unwrap();
        assert!(dir.path().join("real/f.txt").exists());
        assert!(dir.path().join("real/sub").is_dir());
    }

    #[tokio::test]
    async fn test_put_open_with_offsets() {
        let dir = tempfile::tempdir().unwrap();
        let driver = driver_for(dir.path(), false);

        let mut data: &[u8] = b"hello world";
        assert_eq!(driver.put_file("/f.txt", &mut data, None, false).await.unwrap(), 11);

        let mut data: &[u8] = b"WORLD";
        driver.put_file("/f.txt", &mut data, Some(6), false).await.unwrap();

        let mut data: &[u8] = b"!";
        driver.put_file("/f.txt", &mut data, None, true).await.unwrap();

        let mut reader = driver.open_file("/f.txt", 6).await.unwrap();
        let mut content = String::new();
        reader.read_to_string(&mut content).await.unwrap();
        assert_eq!(content, "WORLD!");

        let info = driver.stat("/f.txt").await.unwrap();
        assert_eq!(info.size, 12);
        assert!(!info.is_dir);
    }

    #[tokio::test]
    async fn test_rename_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let driver = driver_for(dir.path(), false);
        std::fs::write(dir.path().join("old.txt"), b"x").unwrap();

        driver.rename("/old.txt", "/new.txt").await.unwrap();
        assert!(dir.path().join("new.txt").exists());
        driver.delete_file("/new.txt").await.unwrap();
        assert!(matches!(
            driver.delete_file("/new.txt").await,
            Err(DriverError::NotFound(_))
        ));

        driver.make_dir("/d").await.unwrap();
        assert!(matches!(driver.make_dir("/d").await, Err(DriverError::AlreadyExists(_))));
        driver.delete_dir("/d").await.unwrap();
    }
}
