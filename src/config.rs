use crate::constants::{DEFAULT_LISTEN_PORT, DEFAULT_MAX_LINE_LENGTH, DEFAULT_WELCOME_MESSAGE};
use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_address: String,
    pub listen_port: u16,
    pub pasv_address: String, // Public IP address advertised for PASV mode
    pub root_dir: String,
    pub max_line_length: usize,
    pub allow_anonymous: bool,
    pub welcome_message: String,
}

/// An account allowed to log in, with a bcrypt hash of its password.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserConfig {
    pub name: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: String::from("0.0.0.0"),
            listen_port: DEFAULT_LISTEN_PORT,
            pasv_address: String::from("127.0.0.1"),
            root_dir: String::from("/var/ftp"),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            allow_anonymous: false,
            welcome_message: String::from(DEFAULT_WELCOME_MESSAGE),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path))?;
        Self::from_toml(&config_str)
            .with_context(|| format!("Failed to parse configuration file: {}", path))
    }

    pub fn from_toml(config_str: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(config_str)?;

        // A zero bound would reject every line
        if config.server.max_line_length == 0 {
            config.server.max_line_length = DEFAULT_MAX_LINE_LENGTH;
        }

        Ok(config)
    }

    pub fn find_user(&self, name: &str) -> Option<&UserConfig> {
        self.users.iter().find(|u| u.name == name)
    }
}

// Helper function to log configuration options
pub fn log_config(config: &Config) {
    info!("  Listen Address: {}", config.server.listen_address);
    info!("  Listen Port: {}", config.server.listen_port);
    info!("  PASV Address: {}", config.server.pasv_address);
    info!("  Root Directory: {}", config.server.root_dir);
    info!("  Max Line Length: {}", config.server.max_line_length);
    info!("  Anonymous Login: {}", config.server.allow_anonymous);
    info!("  Users: {}", config.users.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config() {
        let config = Config::from_toml(
            r#"
            [server]
            listen_address = "127.0.0.1"
            listen_port = 2100
            pasv_address = "10.0.0.1"
            root_dir = "/srv/ftp"
            max_line_length = 512
            allow_anonymous = true
            welcome_message = "hello"

            [[users]]
            name = "alice"
            password_hash = "$2b$04$abc"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.listen_port, 2100);
        assert_eq!(config.server.pasv_address, "10.0.0.1");
        assert_eq!(config.server.max_line_length, 512);
        assert!(config.server.allow_anonymous);
        assert_eq!(config.find_user("alice").unwrap().password_hash, "$2b$04$abc");
        assert!(config.find_user("bob").is_none());
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = Config::from_toml("[server]\nroot_dir = \"/data\"\n").unwrap();
        assert_eq!(config.server.root_dir, "/data");
        assert_eq!(config.server.listen_port, DEFAULT_LISTEN_PORT);
        assert_eq!(config.server.max_line_length, DEFAULT_MAX_LINE_LENGTH);
        assert!(config.users.is_empty());
    }

    #[test]
    fn test_zero_line_length_falls_back() {
        let config = Config::from_toml("[server]\nmax_line_length = 0\n").unwrap();
        assert_eq!(config.server.max_line_length, DEFAULT_MAX_LINE_LENGTH);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(Config::from_toml("[server\nlisten_port = ").is_err());
    }
}
