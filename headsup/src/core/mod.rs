mod config;
mod settings;
mod summary;

pub use config::*;
pub use settings::*;
