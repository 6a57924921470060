//! Integration tests for logging system

use bridge_traits::time::LogLevel;
use core_runtime::logging::{
    init_logging, redact_if_sensitive, redact_source_url, strip_path, LogFormat, LoggingConfig,
};

#[test]
fn test_logging_initialization_once() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug);

    init_logging(config.clone()).expect("first initialization succeeds");

    // A global subscriber can only be installed once per process
    let second = init_logging(config);
    assert!(second.is_err());
}

#[test]
fn test_invalid_filter_rejected() {
    let config = LoggingConfig::default().with_filter("core_audio=verbose");
    let err = init_logging(config).unwrap_err();
    assert!(err.to_string().contains("Invalid log filter"));
}

#[test]
fn test_redaction_of_credentials() {
    assert_eq!(redact_if_sensitive("access_token", "abc"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("password", "pw"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("x_signature", "deadbeef"), "[REDACTED]");
}

#[test]
fn test_presigned_url_redaction() {
    let url = "https://storage.example.com/projects/42/vo/line-7.m4a?X-Amz-Credential=AKIA&X-Amz-Signature=f00";
    let redacted = redact_source_url(url);

    assert!(redacted.starts_with("https://storage.example.com/projects/42/vo/line-7.m4a"));
    assert!(!redacted.contains("AKIA"));
    assert!(!redacted.contains("f00"));
}

#[test]
fn test_normal_values_pass_through() {
    assert_eq!(redact_if_sensitive("sample_rate", "44100"), "44100");
    assert_eq!(redact_if_sensitive("operation", "trim"), "trim");
}

#[test]
fn test_path_stripping() {
    assert_eq!(strip_path("/home/user/vo/line.wav"), "line.wav");
    assert_eq!(strip_path("D:\\recordings\\take2.flac"), "take2.flac");
    assert_eq!(strip_path("take2.flac"), "take2.flac");
    assert_eq!(strip_path(""), "");
}

#[test]
fn test_config_chaining() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Json)
        .with_level(LogLevel::Warn)
        .with_pii_redaction(false)
        .with_spans(false);

    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.level, LogLevel::Warn);
    assert!(!config.redact_pii);
    assert!(!config.enable_spans);
    assert!(config.logger_sink.is_none());
}
