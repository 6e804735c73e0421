use serde_json::json;
use stride_domain::config::{JournalConfig, LoggingConfig, RetryConfig, StrideConfig};

#[test]
fn config_defaults_are_sane() {
    let retry = RetryConfig::default();
    assert_eq!(retry.max_retries, 3);
    assert_eq!(retry.base_delay_ms, 1_000);
    assert_eq!(retry.multiplier, 2);
    assert_eq!(retry.max_delay_ms, 30_000);
    assert_eq!(retry.timeout_ms, Some(30_000));
    assert!(!retry.require_online);

    let journal = JournalConfig::default();
    assert_eq!(journal.capacity, 100);
    assert_eq!(journal.storage_key, "enrollment_error_logs");
    assert!(journal.dir.is_none());

    let logging = LoggingConfig::default();
    assert_eq!(logging.level, "info");
    assert!(logging.console);
}

#[test]
fn stride_config_deserializes_partial_trees() {
    let raw = json!({
        "retry": { "max_retries": 5, "timeout_ms": null },
        "journal": { "dir": "/tmp/stride" },
        "network": { "slow_rtt_ms": 750 }
    });

    let cfg: StrideConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.retry.max_retries, 5);
    assert_eq!(cfg.retry.base_delay_ms, 1_000);
    assert_eq!(cfg.retry.timeout_ms, None);
    assert_eq!(cfg.journal.dir, Some(std::path::PathBuf::from("/tmp/stride")));
    assert_eq!(cfg.journal.capacity, 100);
    assert_eq!(cfg.network.slow_rtt_ms, 750);
    assert_eq!(cfg.logging.level, "info");
}

#[test]
fn deref_mut_clones_on_write() {
    let shared = StrideConfig::default();
    let mut tuned = shared.clone();
    tuned.retry.max_retries = 1;

    assert_eq!(shared.retry.max_retries, 3);
    assert_eq!(tuned.retry.max_retries, 1);
}
