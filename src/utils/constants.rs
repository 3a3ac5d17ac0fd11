//! Shared constants and invariants

pub const TOKEN_TYPE_BEARER: &str = "Bearer";
/// Tokens are treated as expired this many seconds early
pub const EXPIRY_DELTA_SECONDS: i64 = 10;
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 5000;

// Environment
pub const ENV_GOOGLE_CLOUD_PROJECT: &str = "GOOGLE_CLOUD_PROJECT";
pub const ENV_GOOGLE_APPLICATION_CREDENTIALS: &str = "GOOGLE_APPLICATION_CREDENTIALS";
pub const ENV_GCE_METADATA_HOST: &str = "GCE_METADATA_HOST";
pub const ENV_CLOUDSDK_CONFIG: &str = "CLOUDSDK_CONFIG";

// OAuth2
pub const OAUTH2_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
pub const REFRESH_TOKEN_GRANT_TYPE: &str = "refresh_token";
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
/// Lifetime requested for self-signed assertions
pub const ASSERTION_LIFETIME_SECONDS: i64 = 3600;

// Metadata server
pub const METADATA_HOST_DEFAULT: &str = "metadata.google.internal";
pub const METADATA_FLAVOR_HEADER: &str = "Metadata-Flavor";
pub const METADATA_FLAVOR_VALUE: &str = "Google";
pub const METADATA_PROJECT_ID_PATH: &str = "project/project-id";
pub const METADATA_IDENTITY_PATH: &str = "instance/service-accounts/default/identity";
pub const METADATA_TOKEN_PATH: &str = "instance/service-accounts/default/token";

// Credential file types
pub const CREDENTIALS_SERVICE_ACCOUNT: &str = "service_account";
pub const CREDENTIALS_AUTHORIZED_USER: &str = "authorized_user";
