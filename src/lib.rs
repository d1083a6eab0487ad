pub mod algorithms;
pub mod config;
pub mod error;
pub mod network;
pub mod protocol;
pub mod report;
pub mod types;

pub use error::{ConfigError, ConfigurationError, PathError};
pub use types::Cost;

pub type RouterId = String;
