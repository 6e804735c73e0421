use std::time::Duration;
use stride_resilience::{ConnectionQuality, EffectiveType, NetworkMonitor};
use tokio::time::{sleep, timeout};

#[tokio::test(start_paused = true)]
async fn wait_online_resolves_on_transition() {
    let monitor = NetworkMonitor::new(false);

    tokio::spawn({
        let monitor = monitor.clone();
        async move {
            sleep(Duration::from_secs(2)).await;
            monitor.set_online();
        }
    });

    timeout(Duration::from_secs(5), monitor.wait_online()).await.expect("should come back online");
    assert!(monitor.is_online());
}

#[tokio::test(start_paused = true)]
async fn wait_offline_is_immediate_when_already_offline() {
    let monitor = NetworkMonitor::new(false);
    timeout(Duration::from_millis(1), monitor.wait_offline()).await.expect("already offline");
}

#[tokio::test]
async fn subscribers_see_quality_updates() {
    let monitor = NetworkMonitor::default().with_slow_rtt(Duration::from_millis(500));
    let mut rx = monitor.subscribe();

    monitor.update_quality(ConnectionQuality {
        effective_type: Some(EffectiveType::ThreeG),
        rtt_ms: Some(800),
        ..ConnectionQuality::default()
    });

    rx.changed().await.unwrap();
    let status = rx.borrow_and_update().clone();
    assert!(status.online);
    assert_eq!(status.quality.rtt_ms, Some(800));
    assert!(monitor.is_slow());
}
