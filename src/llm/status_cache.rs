use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub const DEFAULT_STATUS_TTL: Duration = Duration::from_secs(180);

/// Time source for cache validity, injectable so tests can move time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for tests and simulations.
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = *self.offset.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        self.base + offset
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderHealth {
    pub name: String,
    pub available: bool,
}

/// Availability of every provider at one moment. Replaced as a whole, never
/// edited in place.
#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub providers: Vec<ProviderHealth>,
    #[serde(skip)]
    pub computed_at: Instant,
    pub recorded_at: DateTime<Utc>,
    pub any_available: bool,
}

impl HealthSnapshot {
    pub fn new(providers: Vec<ProviderHealth>, computed_at: Instant) -> Self {
        let any_available = providers.iter().any(|p| p.available);
        Self {
            providers,
            computed_at,
            recorded_at: Utc::now(),
            any_available,
        }
    }

    pub fn is_available(&self, provider: &str) -> bool {
        self.providers
            .iter()
            .any(|p| p.name == provider && p.available)
    }
}

/// TTL memo of the last health snapshot. Validity is computed on read; there
/// is no background eviction.
pub struct StatusCache {
    snapshot: ArcSwapOption<HealthSnapshot>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl StatusCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            snapshot: ArcSwapOption::empty(),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Last stored snapshot, fresh or stale.
    pub fn get(&self) -> Option<Arc<HealthSnapshot>> {
        self.snapshot.load_full()
    }

    pub fn set(&self, snapshot: HealthSnapshot) -> Arc<HealthSnapshot> {
        let snapshot = Arc::new(snapshot);
        self.snapshot.store(Some(Arc::clone(&snapshot)));
        snapshot
    }

    /// Present and younger than the TTL. A read exactly at the TTL is stale.
    pub fn is_valid(&self) -> bool {
        self.get().is_some_and(|snapshot| self.is_fresh(&snapshot))
    }

    /// The snapshot only if still valid.
    pub fn get_valid(&self) -> Option<Arc<HealthSnapshot>> {
        self.get().filter(|snapshot| self.is_fresh(snapshot))
    }

    /// Drop the snapshot so the next handshake probes again.
    pub fn invalidate(&self) {
        self.snapshot.store(None);
    }

    fn is_fresh(&self, snapshot: &HealthSnapshot) -> bool {
        self.clock.now().saturating_duration_since(snapshot.computed_at) < self.ttl
    }
}
