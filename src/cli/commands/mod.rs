pub mod get;
pub mod init;
pub mod list;
pub mod reset;
pub mod rotate;
pub mod save;
pub mod version;
