use proptest::prelude::*;
use std::time::Duration;
use stride_resilience::RetryPolicy;

proptest! {
    #[test]
    fn delays_never_decrease_and_respect_cap(
        base_ms in 1u64..5_000,
        multiplier in 1u32..6,
        cap_ms in 1u64..120_000,
        n in 1u32..64,
    ) {
        let policy = RetryPolicy::default()
            .with_base_delay(Duration::from_millis(base_ms))
            .with_multiplier(multiplier)
            .with_max_delay(Duration::from_millis(cap_ms));

        let current = policy.delay_for(n);
        let next = policy.delay_for(n + 1);

        prop_assert!(next >= current);
        prop_assert!(current <= Duration::from_millis(cap_ms));
        prop_assert_eq!(policy.delay_for(1), Duration::from_millis(base_ms.min(cap_ms)));
    }

    #[test]
    fn schedule_length_matches_max_retries(max_retries in 0u32..20) {
        let policy = RetryPolicy::default().with_max_retries(max_retries);
        let schedule: Vec<_> = policy.schedule().collect();
        prop_assert_eq!(schedule.len(), max_retries as usize);
        prop_assert_eq!(policy.total_backoff(), schedule.iter().copied().sum::<Duration>());
        prop_assert!(schedule.windows(2).all(|w| w[0] <= w[1]));
    }
}

#[test]
fn default_policy_matches_documented_delays() {
    let policy = RetryPolicy::default();
    let expected = [(1, 1_000), (2, 2_000), (3, 4_000), (10, 30_000)];
    for (n, ms) in expected {
        assert_eq!(policy.delay_for(n), Duration::from_millis(ms), "delay_for({n})");
    }
}
