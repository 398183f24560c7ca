// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names read by the browser

// Server Connection
pub const AYON_SERVER_URL: &str = "AYON_SERVER_URL";
pub const AYON_API_KEY: &str = "AYON_API_KEY";
pub const AYON_TOKEN: &str = "AYON_TOKEN";
pub const AYON_PROJECT_NAME: &str = "AYON_PROJECT_NAME";

// HTTP Client
pub const AYON_HTTP_REQUEST_TIMEOUT_SECS: &str = "AYON_HTTP_REQUEST_TIMEOUT_SECS";
pub const AYON_HTTP_CONNECT_TIMEOUT_SECS: &str = "AYON_HTTP_CONNECT_TIMEOUT_SECS";

// Query Cache
pub const AYON_CACHE_STALE_SECS: &str = "AYON_CACHE_STALE_SECS";

// Config File Override
pub const AYON_CONFIG_PATH: &str = "AYON_CONFIG_PATH";
