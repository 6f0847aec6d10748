//! Schema module - Configuration and input types for streamline engines.

mod color;
mod config;
mod field_file;

pub use color::*;
pub use config::*;
pub use field_file::*;
