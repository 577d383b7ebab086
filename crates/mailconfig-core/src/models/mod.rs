/// Data models for the mail configuration system
pub mod config;
pub mod settings;

// Re-export commonly used types
pub use config::*;
pub use settings::*;
