use clap::Parser;

use crate::constants::DEFAULT_CONFIG_PATH;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "rouilleftpd", about = "A FTP server written in Rust.")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the bcrypt hash of a password for the [[users]] section, then exit
    #[arg(long, value_name = "PASSWORD")]
    pub hash_password: Option<String>,
}
