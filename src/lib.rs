pub mod config;
pub mod error;
pub mod handler;
pub mod prediction;
pub mod retry;
pub mod server;

pub use error::{Error, Result};
