// src/constants.rs

pub const DEFAULT_CONFIG_PATH: &str = "/etc/rouilleftpd.conf";
pub const DEFAULT_LISTEN_PORT: u16 = 2121;
pub const DEFAULT_MAX_LINE_LENGTH: usize = 4096;
pub const DEFAULT_WELCOME_MESSAGE: &str = "Welcome to rouilleFTPd.";
pub const ROOT_PATH: &str = "/";
