//! CLI command implementations

pub mod info;
pub mod record;
pub mod trim;
