pub mod codec;
pub mod config;
pub mod error;
pub mod generate;
pub mod history;
pub mod identifier;
pub mod logging;
pub mod output;
pub mod paths;
pub mod scan;

pub use error::{Result, StudioError};
