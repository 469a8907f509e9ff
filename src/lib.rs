pub mod boundary;
pub mod changelog;
pub mod changes;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod increment;
pub mod lineage;
pub mod manifest;
pub mod ui;

pub use error::{RelverError, Result};
