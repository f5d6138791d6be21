pub mod network;
pub mod pasv;
pub mod port;
pub mod transfer;
pub mod transport;
