use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use stride_domain::config::NetworkConfig;
use stride_domain::constants::DEFAULT_SLOW_RTT_MS;
use strum_macros::{AsRefStr, Display, EnumString};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Connection class reported by the client (Network Information API naming).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum EffectiveType {
    #[serde(rename = "slow-2g")]
    #[strum(serialize = "slow-2g")]
    Slow2g,
    #[serde(rename = "2g")]
    #[strum(serialize = "2g")]
    TwoG,
    #[serde(rename = "3g")]
    #[strum(serialize = "3g")]
    ThreeG,
    #[serde(rename = "4g")]
    #[strum(serialize = "4g")]
    FourG,
}

impl EffectiveType {
    #[must_use]
    pub const fn is_slow(self) -> bool {
        matches!(self, Self::Slow2g | Self::TwoG)
    }
}

/// Connection-quality hints. Every field is optional because clients report them selectively.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionQuality {
    pub effective_type: Option<EffectiveType>,
    pub downlink_mbps: Option<f64>,
    pub rtt_ms: Option<u64>,
    pub save_data: bool,
}

/// Snapshot published to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStatus {
    pub online: bool,
    pub quality: ConnectionQuality,
}

impl Default for NetworkStatus {
    fn default() -> Self {
        Self { online: true, quality: ConnectionQuality::default() }
    }
}

/// Observable network state.
///
/// Clones share one underlying `watch` channel: updates from any clone reach every
/// subscriber. Subscribers are notified only when the published status actually changes.
#[derive(Debug, Clone)]
pub struct NetworkMonitor {
    tx: Arc<watch::Sender<NetworkStatus>>,
    slow_rtt: Duration,
}

impl Default for NetworkMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl NetworkMonitor {
    #[must_use]
    pub fn new(online: bool) -> Self {
        let status = NetworkStatus { online, ..NetworkStatus::default() };
        Self {
            tx: Arc::new(watch::Sender::new(status)),
            slow_rtt: Duration::from_millis(DEFAULT_SLOW_RTT_MS),
        }
    }

    #[must_use]
    pub fn from_config(config: &NetworkConfig) -> Self {
        Self::new(true).with_slow_rtt(Duration::from_millis(config.slow_rtt_ms))
    }

    /// Round-trip time above which the connection counts as slow.
    #[must_use]
    pub const fn with_slow_rtt(mut self, threshold: Duration) -> Self {
        self.slow_rtt = threshold;
        self
    }

    pub fn set_online(&self) {
        self.set_reachable(true);
    }

    pub fn set_offline(&self) {
        self.set_reachable(false);
    }

    pub fn set_reachable(&self, online: bool) {
        let changed = self.tx.send_if_modified(|status| {
            if status.online == online {
                return false;
            }
            status.online = online;
            true
        });

        if changed {
            if online {
                info!("Network connection restored");
            } else {
                warn!("Network connection lost");
            }
        }
    }

    pub fn update_quality(&self, quality: ConnectionQuality) {
        let changed = self.tx.send_if_modified(|status| {
            if status.quality == quality {
                return false;
            }
            status.quality = quality.clone();
            true
        });

        if changed {
            debug!(
                effective_type = ?quality.effective_type,
                rtt_ms = quality.rtt_ms,
                downlink_mbps = quality.downlink_mbps,
                save_data = quality.save_data,
                "Connection quality updated"
            );
        }
    }

    #[must_use]
    pub fn is_online(&self) -> bool {
        self.tx.borrow().online
    }

    #[must_use]
    pub fn status(&self) -> NetworkStatus {
        self.tx.borrow().clone()
    }

    /// Slow when the effective type is `slow-2g`/`2g` or the reported RTT exceeds the
    /// threshold.
    #[must_use]
    pub fn is_slow(&self) -> bool {
        let status = self.tx.borrow();
        let quality = &status.quality;
        let slow_type = quality.effective_type.is_some_and(EffectiveType::is_slow);
        let slow_rtt = quality.rtt_ms.is_some_and(|rtt| Duration::from_millis(rtt) > self.slow_rtt);
        slow_type || slow_rtt
    }

    /// Receiver that observes every subsequent change. The current value is marked as seen.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<NetworkStatus> {
        self.tx.subscribe()
    }

    /// Resolves immediately when online, otherwise on the next transition to online.
    pub async fn wait_online(&self) {
        self.wait_for(true).await;
    }

    /// Resolves immediately when offline, otherwise on the next transition to offline.
    pub async fn wait_offline(&self) {
        self.wait_for(false).await;
    }

    async fn wait_for(&self, online: bool) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|status| status.online == online).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slow_by_type_or_rtt() {
        let monitor = NetworkMonitor::default();
        assert!(!monitor.is_slow());

        monitor.update_quality(ConnectionQuality {
            effective_type: Some(EffectiveType::TwoG),
            ..ConnectionQuality::default()
        });
        assert!(monitor.is_slow());

        monitor.update_quality(ConnectionQuality {
            effective_type: Some(EffectiveType::FourG),
            rtt_ms: Some(1_500),
            ..ConnectionQuality::default()
        });
        assert!(monitor.is_slow());

        monitor.update_quality(ConnectionQuality {
            effective_type: Some(EffectiveType::ThreeG),
            rtt_ms: Some(300),
            downlink_mbps: Some(1.4),
            save_data: false,
        });
        assert!(!monitor.is_slow());
    }

    #[test]
    fn effective_type_uses_wire_names() {
        assert_eq!("slow-2g".parse::<EffectiveType>().unwrap(), EffectiveType::Slow2g);
        assert_eq!(EffectiveType::FourG.to_string(), "4g");
        let quality: ConnectionQuality =
            serde_json::from_str(r#"{"effectiveType":"3g","rttMs":450,"saveData":true}"#).unwrap();
        assert_eq!(quality.effective_type, Some(EffectiveType::ThreeG));
        assert!(quality.save_data);
    }

    #[test]
    fn unchanged_state_does_not_notify() {
        let monitor = NetworkMonitor::new(true);
        let rx = monitor.subscribe();
        monitor.set_online();
        assert!(!rx.has_changed().unwrap());
        monitor.set_offline();
        assert!(rx.has_changed().unwrap());
        assert!(!monitor.is_online());
    }
}
