//! Building blocks of the `comextract` command line tool.

pub mod config;
pub mod format;
pub mod transport;
pub mod writer;
