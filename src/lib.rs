pub mod analyzer;
pub mod boundary;
pub mod changelog;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod manifest;
pub mod registry;
pub mod ui;
pub mod workspace;

pub use error::{ReleaseError, Result};
