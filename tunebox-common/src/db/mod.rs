//! Database initialization for the SQLite backend

pub mod init;

pub use init::*;
