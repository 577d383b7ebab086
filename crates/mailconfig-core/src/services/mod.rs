/// Resolution, caching, persistence and transport services
pub mod cache;
pub mod completeness;
pub mod mailer;
pub mod resolver;
pub mod settings;
pub mod source;
pub mod transport;

// Re-export service types
pub use cache::{CacheBackend, CacheKey, CacheLookup, ConfigCache, InvalidationScope};
pub use completeness::{Completeness, is_complete};
pub use mailer::{MailService, TestSendOutcome};
pub use resolver::ConfigResolver;
pub use settings::MailSettingsService;
pub use source::{DefaultTenantRecordProvider, SettingsRepository, TenantRecordSource};
pub use transport::{
    MailTransport, SmtpEndpoint, SmtpSecurity, TransportDescriptor, TransportFactory,
};
