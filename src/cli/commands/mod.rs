//! CLI command implementations

pub mod anonymize;
pub mod init;
pub mod revert;
pub mod scan;
pub mod validate;
