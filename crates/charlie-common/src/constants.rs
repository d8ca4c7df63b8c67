//! Shared constants for Charlie components.

/// Default location of the local storage file
pub const DEFAULT_STORAGE_PATH: &str = "data/local_storage.json";

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/charlie.toml";

/// Simulated auth round trip (milliseconds)
pub const DEFAULT_LOGIN_DELAY_MS: u64 = 500;

/// Simulated upload round trip (milliseconds)
pub const DEFAULT_POST_DELAY_MS: u64 = 500;

/// Smallest CAPTCHA operand
pub const CAPTCHA_OPERAND_MIN: u8 = 1;

/// Largest CAPTCHA operand
pub const CAPTCHA_OPERAND_MAX: u8 = 10;

/// Display format for `Post::uploaded_at` (e.g. "10/17/2026, 3:04:05 PM")
pub const UPLOADED_AT_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Local storage keys
pub mod storage_keys {
    /// Current username (plain string)
    pub const IDENTITY: &str = "charlie_user";

    /// Feed contents (JSON array of posts, newest first)
    pub const FEED: &str = "charlie_posts";
}
