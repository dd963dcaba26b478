pub mod config;
pub mod error;
pub mod types;

pub use config::JotConfig;
pub use error::{JotError, Result};
pub use types::*;
