use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use nsi_rust_requester::domain::coordinator::coordinator_config::{CoordinatorConfig, DEFAULT_REPLY_WAIT, NotificationChannel};
use nsi_rust_requester::domain::protocol::credential::Credential;
use nsi_rust_requester::error::Error;

fn write_config(file_name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("nsi_requester_{}_{}", std::process::id(), file_name));
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_load_bundled_config() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/requester.json");

    let config = CoordinatorConfig::from_json_file(&path).unwrap();

    assert_eq!(config.provider.nsa.as_str(), "urn:ogf:network:example.net:2013:nsa:provider");
    assert_eq!(config.provider.uri, "https://provider.example.net/nsi/ConnectionProvider");
    assert_eq!(config.requester_nsa.as_str(), "urn:ogf:network:example.net:2013:nsa:requester");
    assert_eq!(config.notification_channel.requester_uri(), Some("https://requester.example.net/nsi/ConnectionRequester"));
    assert_eq!(config.reply_wait, Duration::from_secs(300));
    assert!(config.credential.is_anonymous());
}

#[test]
fn test_minimal_config_uses_defaults() {
    let path = write_config(
        "minimal.json",
        r#"{
            "providerNsa": "urn:ogf:network:p:nsa",
            "providerUri": "http://localhost:9000/provider",
            "requesterNsa": "urn:ogf:network:r:nsa",
            "httpUser": "operator",
            "httpPassword": "secret"
        }"#,
    );

    let config = CoordinatorConfig::from_json_file(&path).unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(config.notification_channel, NotificationChannel::RequestOnly);
    assert_eq!(config.reply_wait, DEFAULT_REPLY_WAIT);
    assert_eq!(config.credential, Credential::Basic { user: "operator".to_string(), password: "secret".to_string() });
    assert!(!format!("{:?}", config).contains("secret"));
}

#[test]
fn test_invalid_configs_are_rejected() {
    let missing_field = write_config("missing.json", r#"{ "providerNsa": "urn:p", "providerUri": "http://p" }"#);
    assert!(matches!(CoordinatorConfig::from_json_file(&missing_field), Err(Error::DeserializationError(_))));
    fs::remove_file(&missing_field).ok();

    let zero_wait = write_config(
        "zero_wait.json",
        r#"{ "providerNsa": "urn:p", "providerUri": "http://p", "requesterNsa": "urn:r", "replyWaitSecs": 0 }"#,
    );
    assert!(matches!(CoordinatorConfig::from_json_file(&zero_wait), Err(Error::ConfigError(_))));
    fs::remove_file(&zero_wait).ok();

    let missing_file = std::env::temp_dir().join("nsi_requester_does_not_exist.json");
    assert!(matches!(CoordinatorConfig::from_json_file(&missing_file), Err(Error::IoError(_))));
}
