//! Command handlers, one module per command group.

pub mod import;
pub mod init;
pub mod misc;
pub mod profile;
pub mod records;
