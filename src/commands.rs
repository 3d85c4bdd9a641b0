pub mod build;
pub mod check;
pub mod clean;
pub mod init;
pub mod theme;
pub mod watch;
