pub mod api {
    pub const DEFAULT_BASE_URL: &str = "https://public-api.kiwify.com/v1";
    pub const OAUTH_TOKEN_PATH: &str = "/oauth/token";
    pub const ACCOUNT_HEADER: &str = "x-kiwify-account-id";
    pub const USER_AGENT: &str = "mcp-kiwify/1.0";
}

pub mod oauth {
    /// Seconds shaved off the reported token lifetime so refresh happens early.
    pub const EXPIRY_MARGIN_SECS: i64 = 300;
}

pub mod rate_limit {
    pub const EXCEEDED_MESSAGE: &str = "Rate limit exceeded (100 req/min). Try again in a moment.";
}

pub mod env {
    pub const CLIENT_ID: &str = "KIWIFY_CLIENT_ID";
    pub const CLIENT_SECRET: &str = "KIWIFY_CLIENT_SECRET";
    pub const ACCOUNT_ID: &str = "KIWIFY_ACCOUNT_ID";
    pub const BASE_URL: &str = "KIWIFY_API_BASE_URL";
    pub const LOG_LEVEL: &str = "KIWIFY_LOG_LEVEL";
    pub const LOG_LEVEL_FALLBACK: &str = "LOG_LEVEL";
}

pub mod server {
    pub const PROTOCOL_VERSION: &str = "2025-06-18";
    pub const NAME: &str = "mcp-kiwify";
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

pub mod protocols {
    pub const ALLOWED_HTTP: &[&str] = &["http", "https"];
}
