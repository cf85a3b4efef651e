//! Handshake: probe every provider concurrently, cache the result, and derive
//! the order the sequencer should try providers in.
//!
//! The handshake only ever *informs* ordering. Answer requests never wait on
//! it; they read whatever snapshot is cached.

use super::health::HealthProbe;
use super::registry::{ProviderRegistry, ProviderSlot};
use super::status_cache::{HealthSnapshot, ProviderHealth, StatusCache};
use futures_util::future::join_all;
use std::sync::Arc;

pub struct HandshakeCoordinator {
    registry: Arc<ProviderRegistry>,
    cache: Arc<StatusCache>,
    probe: HealthProbe,
}

impl HandshakeCoordinator {
    pub fn new(registry: Arc<ProviderRegistry>, cache: Arc<StatusCache>, probe: HealthProbe) -> Self {
        Self {
            registry,
            cache,
            probe,
        }
    }

    pub fn cache(&self) -> &Arc<StatusCache> {
        &self.cache
    }

    /// Cached snapshot while valid; otherwise probe all configured providers
    /// concurrently and store the merged result.
    ///
    /// Safe to call redundantly: concurrent refreshes race to store
    /// equivalent snapshots and the last write wins.
    pub async fn refresh(&self) -> Arc<HealthSnapshot> {
        if let Some(snapshot) = self.cache.get_valid() {
            tracing::debug!("handshake served from cache");
            return snapshot;
        }

        let started = self.cache.now();
        let probes = self
            .registry
            .slots()
            .iter()
            .map(|slot| self.probe_slot(slot));
        let providers = join_all(probes).await;

        let snapshot = HealthSnapshot::new(providers, self.cache.now());
        tracing::info!(
            any_available = snapshot.any_available,
            elapsed_ms = u64::try_from(snapshot.computed_at.saturating_duration_since(started).as_millis())
                .unwrap_or(u64::MAX),
            "handshake complete"
        );
        if !snapshot.any_available {
            tracing::warn!("no provider answered the handshake");
        }
        self.cache.set(snapshot)
    }

    /// Discard the cached snapshot and probe again.
    pub async fn force_refresh(&self) -> Arc<HealthSnapshot> {
        self.cache.invalidate();
        self.refresh().await
    }

    async fn probe_slot(&self, slot: &ProviderSlot) -> ProviderHealth {
        let available = if slot.is_configured() {
            self.probe.probe(slot.adapter()).await
        } else {
            false
        };
        ProviderHealth {
            name: slot.name().to_string(),
            available,
        }
    }
}

/// Provider order for an answer attempt. The static order is primaries before
/// secondaries, each in configured order. With a snapshot, providers that
/// answered the handshake come first, each group keeping the static order.
pub fn ordering(registry: &ProviderRegistry, snapshot: Option<&HealthSnapshot>) -> Vec<usize> {
    let slots = registry.slots();
    let mut order: Vec<usize> = (0..registry.len()).collect();
    order.sort_by_key(|&i| slots[i].descriptor().role);
    let Some(snapshot) = snapshot else {
        return order;
    };
    let (mut available, rest): (Vec<usize>, Vec<usize>) = order
        .into_iter()
        .partition(|&i| snapshot.is_available(slots[i].name()));
    available.extend(rest);
    available
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::llm::ErrorKind;
    use crate::llm::status_cache::ManualClock;
    use crate::llm::traits::{CompletionProvider, ProviderFuture};
    use crate::llm::types::{GenerationRequest, ProviderDescriptor, ProviderKind, ProviderRole};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct TimedProbe {
        name: &'static str,
        delay: Duration,
        healthy: bool,
        probes: Arc<AtomicUsize>,
    }

    impl CompletionProvider for TimedProbe {
        fn name(&self) -> &str {
            self.name
        }

        fn probe(&self) -> ProviderFuture<'_, ()> {
            Box::pin(async move {
                self.probes.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(self.delay).await;
                if self.healthy {
                    Ok(())
                } else {
                    Err(ProviderError::new(ErrorKind::NetworkError, self.name, "down"))
                }
            })
        }

        fn invoke<'a>(
            &'a self,
            _model: &'a str,
            _request: &'a GenerationRequest,
        ) -> ProviderFuture<'a, String> {
            Box::pin(async { Ok(String::new()) })
        }
    }

    fn slot(
        name: &'static str,
        key: Option<&str>,
        delay_ms: u64,
        healthy: bool,
        probes: &Arc<AtomicUsize>,
    ) -> ProviderSlot {
        slot_with_role(name, ProviderRole::Secondary, key, delay_ms, healthy, probes)
    }

    fn slot_with_role(
        name: &'static str,
        role: ProviderRole,
        key: Option<&str>,
        delay_ms: u64,
        healthy: bool,
        probes: &Arc<AtomicUsize>,
    ) -> ProviderSlot {
        ProviderSlot::new(
            ProviderDescriptor {
                name: name.into(),
                kind: ProviderKind::OpenaiCompatible,
                credential: key.map(String::from),
                models: vec!["m".into()],
                role,
                base_url: None,
            },
            Arc::new(TimedProbe {
                name,
                delay: Duration::from_millis(delay_ms),
                healthy,
                probes: Arc::clone(probes),
            }),
        )
    }

    fn coordinator(slots: Vec<ProviderSlot>, clock: Arc<ManualClock>) -> HandshakeCoordinator {
        HandshakeCoordinator::new(
            Arc::new(ProviderRegistry::new(slots)),
            Arc::new(StatusCache::with_clock(Duration::from_secs(180), clock)),
            HealthProbe::new(Duration::from_secs(2)),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn probes_run_concurrently() {
        let probes = Arc::new(AtomicUsize::new(0));
        let handshake = coordinator(
            vec![
                slot("a", Some("k"), 1_500, true, &probes),
                slot("b", Some("k"), 1_900, true, &probes),
                slot("c", Some("k"), 300, false, &probes),
                slot("d", Some("k"), 5_000, true, &probes),
            ],
            Arc::new(ManualClock::new()),
        );

        let started = tokio::time::Instant::now();
        let snapshot = handshake.refresh().await;
        let elapsed = started.elapsed();

        // Bounded by the slowest probe (d hits the 2s timeout), not the 8.7s sum.
        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_millis(2_100), "elapsed {elapsed:?}");
        assert_eq!(probes.load(Ordering::SeqCst), 4);
        assert!(snapshot.is_available("a"));
        assert!(snapshot.is_available("b"));
        assert!(!snapshot.is_available("c"));
        assert!(!snapshot.is_available("d"), "timed-out probe counts as down");
        assert!(snapshot.any_available);
    }

    #[tokio::test(start_paused = true)]
    async fn second_refresh_within_ttl_makes_no_calls() {
        let probes = Arc::new(AtomicUsize::new(0));
        let clock = Arc::new(ManualClock::new());
        let handshake = coordinator(
            vec![
                slot("a", Some("k"), 10, true, &probes),
                slot("b", Some("k"), 10, true, &probes),
            ],
            Arc::clone(&clock),
        );

        handshake.refresh().await;
        assert!(handshake.cache().is_valid());
        assert_eq!(probes.load(Ordering::SeqCst), 2);

        clock.advance(Duration::from_secs(60));
        handshake.refresh().await;
        assert_eq!(probes.load(Ordering::SeqCst), 2);

        clock.advance(Duration::from_secs(120));
        assert!(!handshake.cache().is_valid());
        handshake.refresh().await;
        assert_eq!(probes.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn force_refresh_probes_again() {
        let probes = Arc::new(AtomicUsize::new(0));
        let handshake = coordinator(
            vec![slot("a", Some("k"), 10, true, &probes)],
            Arc::new(ManualClock::new()),
        );
        handshake.refresh().await;
        handshake.force_refresh().await;
        assert_eq!(probes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn unconfigured_providers_are_not_probed() {
        let probes = Arc::new(AtomicUsize::new(0));
        let handshake = coordinator(
            vec![
                slot("a", Some("your_api_key_here"), 10, true, &probes),
                slot("b", None, 10, true, &probes),
            ],
            Arc::new(ManualClock::new()),
        );
        let snapshot = handshake.refresh().await;
        assert_eq!(probes.load(Ordering::SeqCst), 0);
        assert!(!snapshot.any_available);
        assert_eq!(snapshot.providers.len(), 2);
    }

    #[test]
    fn ordering_puts_available_first_in_config_order() {
        let probes = Arc::new(AtomicUsize::new(0));
        let registry = ProviderRegistry::new(vec![
            slot("gemini", Some("k"), 0, true, &probes),
            slot("openai", Some("k"), 0, true, &probes),
            slot("groq", Some("k"), 0, true, &probes),
        ]);
        let snapshot = HealthSnapshot::new(
            vec![
                ProviderHealth {
                    name: "gemini".into(),
                    available: false,
                },
                ProviderHealth {
                    name: "openai".into(),
                    available: true,
                },
                ProviderHealth {
                    name: "groq".into(),
                    available: true,
                },
            ],
            std::time::Instant::now(),
        );
        assert_eq!(ordering(&registry, Some(&snapshot)), vec![1, 2, 0]);
        assert_eq!(ordering(&registry, None), vec![0, 1, 2]);
    }

    #[test]
    fn primary_role_goes_first_within_each_group() {
        let probes = Arc::new(AtomicUsize::new(0));
        let registry = ProviderRegistry::new(vec![
            slot("openai", Some("k"), 0, true, &probes),
            slot("gemini", Some("k"), 0, true, &probes),
            slot_with_role("groq", ProviderRole::Primary, Some("k"), 0, true, &probes),
        ]);
        assert_eq!(ordering(&registry, None), vec![2, 0, 1]);

        let snapshot = HealthSnapshot::new(
            vec![
                ProviderHealth {
                    name: "openai".into(),
                    available: true,
                },
                ProviderHealth {
                    name: "gemini".into(),
                    available: true,
                },
                ProviderHealth {
                    name: "groq".into(),
                    available: false,
                },
            ],
            std::time::Instant::now(),
        );
        assert_eq!(ordering(&registry, Some(&snapshot)), vec![0, 1, 2]);
    }
}
