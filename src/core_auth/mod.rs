pub mod driver;
pub mod fs_driver;
pub mod helper;
