/// Application constants
///
/// Hardcoded values used throughout the workspace, grouped by concern.

// ============================================================================
// Cache Constants
// ============================================================================
/// Lifetime of a resolved configuration in the cache (24 hours)
pub const CONFIG_CACHE_TTL_SECONDS: u64 = 86400;

/// Prefix of every cache key; the tenant id is appended when tenancy is enabled
pub const CACHE_KEY_PREFIX: &str = "mail_config_subsite_";

// ============================================================================
// Transport Constants
// ============================================================================

/// DSN of the transport that silently discards every message
pub const NULL_TRANSPORT_DSN: &str = "null://null";

/// Scheme used when synthesizing a DSN from discrete SMTP fields
pub const SMTP_SCHEME: &str = "smtp";

/// Scheme for SMTP over implicit TLS
pub const SMTPS_SCHEME: &str = "smtps";

/// Plain SMTP port, upgraded with STARTTLS when offered
pub const SMTP_PORT: u16 = 25;

/// Implicit TLS (SMTPS) port
pub const SMTPS_PORT: u16 = 465;

// ============================================================================
// Environment Variables
// ============================================================================

pub const ENV_SMTP_SERVER: &str = "MAIL_SMTP_SERVER";
pub const ENV_SMTP_PORT: &str = "MAIL_SMTP_PORT";
pub const ENV_SMTP_USER: &str = "MAIL_SMTP_USER";
pub const ENV_SMTP_PASSWORD: &str = "MAIL_SMTP_PASSWORD";
pub const ENV_ADMIN_EMAIL: &str = "MAIL_ADMIN_EMAIL";
pub const ENV_ADMIN_NAME: &str = "MAIL_ADMIN_NAME";
pub const ENV_CUSTOM_DSN: &str = "MAIL_CUSTOM_DSN";

// ============================================================================
// DynamoDB Attribute Names
// ============================================================================

/// Partition key of the settings table
pub const ATTR_TENANT_ID: &str = "tenantId";

/// Partition key of the cache table
pub const ATTR_CACHE_KEY: &str = "cacheKey";

/// Serialized configuration snapshot stored in the cache table
pub const ATTR_CONFIG: &str = "config";

/// Expiry (unix seconds); also the table's TTL attribute
pub const ATTR_TTL: &str = "ttl";

// ============================================================================
// Test Email
// ============================================================================

/// Subject prefix of the ad-hoc test email; the site title is appended
pub const TEST_EMAIL_SUBJECT_PREFIX: &str = "Mail Test - ";

/// Body of the ad-hoc test email
pub const TEST_EMAIL_BODY: &str = "The mail test was successful.";

/// Maximum email address length (RFC 5321)
pub const MAX_EMAIL_ADDRESS_LENGTH: usize = 320;
