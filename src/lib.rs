pub mod boundary;
pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod hooks;
pub mod range;
pub mod slack;
pub mod template;
pub mod tracker;
pub mod ui;

pub use error::{ChangelogError, Result};
