pub mod config;
pub mod error;
pub mod io;
pub mod learn;
pub mod locator;
pub mod paths;
pub mod prompt;
pub mod runner;
pub mod scanner;
pub mod setup;
pub mod templates;
pub mod types;

pub use error::{AtddError, Result};
