pub mod config;
pub mod error;

pub use config::FreddoConfig;
pub use error::{FreddoError, Result};
