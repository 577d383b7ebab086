/// Mailconfig Core - layered site mail configuration
///
/// This crate resolves the effective outbound mail configuration for a site
/// (or subsite), caches the result, and turns it into a transport descriptor
/// for `lettre`.
pub mod constants;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use error::MailConfigError;
pub use models::{MailConfiguration, StaticMailConfig, TenantId};
pub use services::{ConfigResolver, TransportDescriptor, TransportFactory};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
