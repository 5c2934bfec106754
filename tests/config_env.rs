mod common;

use common::ENV_LOCK;
use kiwify::config::{Config, ConfigError};
use kiwify::services::logger::LogLevel;

const VARS: &[&str] = &[
    "KIWIFY_CLIENT_ID",
    "KIWIFY_CLIENT_SECRET",
    "KIWIFY_ACCOUNT_ID",
    "KIWIFY_API_BASE_URL",
    "KIWIFY_LOG_LEVEL",
    "LOG_LEVEL",
];

fn clear() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

fn set_credentials() {
    std::env::set_var("KIWIFY_CLIENT_ID", "cid");
    std::env::set_var("KIWIFY_CLIENT_SECRET", "csecret");
    std::env::set_var("KIWIFY_ACCOUNT_ID", "acct");
}

#[tokio::test]
async fn credentials_are_read_from_env() {
    let _guard = ENV_LOCK.lock().await;
    clear();
    set_credentials();

    let config = Config::from_env().expect("config");
    assert_eq!(config.client_id, "cid");
    assert_eq!(config.account_id, "acct");
    assert_eq!(config.base_url, "https://public-api.kiwify.com/v1");
    assert!(!format!("{:?}", config).contains("csecret"));
    clear();
}

#[tokio::test]
async fn missing_credential_names_the_variable() {
    let _guard = ENV_LOCK.lock().await;
    clear();
    std::env::set_var("KIWIFY_CLIENT_ID", "cid");

    let err = Config::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::MissingEnv("KIWIFY_CLIENT_SECRET")));
    assert!(err.to_string().contains("KIWIFY_ACCOUNT_ID"));
    clear();
}

#[tokio::test]
async fn base_url_override_is_normalized() {
    let _guard = ENV_LOCK.lock().await;
    clear();
    set_credentials();
    std::env::set_var("KIWIFY_API_BASE_URL", "http://127.0.0.1:8080/v1/");

    let config = Config::from_env().expect("config");
    assert_eq!(config.base_url, "http://127.0.0.1:8080/v1");

    std::env::set_var("KIWIFY_API_BASE_URL", "ftp://example.com");
    assert!(matches!(
        Config::from_env(),
        Err(ConfigError::InvalidBaseUrl { .. })
    ));
    clear();
}

#[tokio::test]
async fn log_level_prefers_the_prefixed_variable() {
    let _guard = ENV_LOCK.lock().await;
    clear();
    assert_eq!(LogLevel::from_env(), LogLevel::Info);

    std::env::set_var("LOG_LEVEL", "debug");
    assert_eq!(LogLevel::from_env(), LogLevel::Debug);

    std::env::set_var("KIWIFY_LOG_LEVEL", "error");
    assert_eq!(LogLevel::from_env(), LogLevel::Error);
    clear();
}
