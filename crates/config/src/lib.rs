// Configuration loading

mod error;
pub mod settings;

pub use error::ConfigError;
pub use settings::{
    CompareConfig, CompareSettings, DatabaseSettings, ForecasterSettings, DEFAULT_CONFIG_FILE,
};
