//! Runtime metrics and instrumentation for the pacing layer.
//!
//! Hot-path events increment lock-free `AtomicU64` counters with relaxed
//! ordering; dashboards read them through [`PacerCounters::snapshot`]. The
//! per-window tier histogram and the tick budget monitor cover the two
//! questions an operator actually asks: "what tiers are my bots in right
//! now" and "is the pacing layer itself staying inside its tick budget".

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;

use crate::tier::Tier;

// ---------------------------------------------------------------------------
// Global Counters (lock-free)
// ---------------------------------------------------------------------------

/// Atomic counters for high-frequency scheduler and save-controller events.
#[derive(Debug)]
pub struct PacerCounters {
    /// Bot ticks processed since startup.
    pub ticks_total: AtomicU64,
    /// Phases executed across all ticks.
    pub phases_run: AtomicU64,
    /// Phases gated off while the tier was `Full` (always zero; kept so the
    /// per-tier triple stays a closed set).
    pub phases_skipped_full: AtomicU64,
    /// Phases gated off while the tier was `Reduced`.
    pub phases_skipped_reduced: AtomicU64,
    /// Phases gated off while the tier was `Minimal`.
    pub phases_skipped_minimal: AtomicU64,
    /// Phase callables that failed (logged, tick continued).
    pub phase_failures: AtomicU64,
    /// Ticks ended early by the safety phase.
    pub safety_interrupts: AtomicU64,
    /// Ticks aborted because safety reported the bot invalid.
    pub ticks_aborted: AtomicU64,
    /// `should_save` decisions taken.
    pub save_checks: AtomicU64,
    /// Save opportunities allowed to write.
    pub saves_allowed: AtomicU64,
    /// Save opportunities skipped (no durable change).
    pub saves_skipped: AtomicU64,
    /// Saves allowed because durable fields were unavailable.
    pub fail_open_saves: AtomicU64,
    /// Stored snapshots advanced after a completed save.
    pub snapshot_updates: AtomicU64,
    /// Save countdowns re-armed on tier transitions.
    pub interval_rearms: AtomicU64,
    /// Controller records created.
    pub records_created: AtomicU64,
    /// Controller records removed on bot teardown.
    pub records_removed: AtomicU64,
    /// Ticks whose role classified as unknown.
    pub unknown_roles: AtomicU64,
}

impl PacerCounters {
    /// Create a new set of zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ticks_total: AtomicU64::new(0),
            phases_run: AtomicU64::new(0),
            phases_skipped_full: AtomicU64::new(0),
            phases_skipped_reduced: AtomicU64::new(0),
            phases_skipped_minimal: AtomicU64::new(0),
            phase_failures: AtomicU64::new(0),
            safety_interrupts: AtomicU64::new(0),
            ticks_aborted: AtomicU64::new(0),
            save_checks: AtomicU64::new(0),
            saves_allowed: AtomicU64::new(0),
            saves_skipped: AtomicU64::new(0),
            fail_open_saves: AtomicU64::new(0),
            snapshot_updates: AtomicU64::new(0),
            interval_rearms: AtomicU64::new(0),
            records_created: AtomicU64::new(0),
            records_removed: AtomicU64::new(0),
            unknown_roles: AtomicU64::new(0),
        }
    }

    /// Record one gated-off phase under the tier that gated it.
    pub fn note_phase_skipped(&self, tier: Tier) {
        let counter = match tier {
            Tier::Full => &self.phases_skipped_full,
            Tier::Reduced => &self.phases_skipped_reduced,
            Tier::Minimal => &self.phases_skipped_minimal,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot all counters for export.
    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            ticks_total: self.ticks_total.load(Ordering::Relaxed),
            phases_run: self.phases_run.load(Ordering::Relaxed),
            phases_skipped: [
                self.phases_skipped_full.load(Ordering::Relaxed),
                self.phases_skipped_reduced.load(Ordering::Relaxed),
                self.phases_skipped_minimal.load(Ordering::Relaxed),
            ],
            phase_failures: self.phase_failures.load(Ordering::Relaxed),
            safety_interrupts: self.safety_interrupts.load(Ordering::Relaxed),
            ticks_aborted: self.ticks_aborted.load(Ordering::Relaxed),
            save_checks: self.save_checks.load(Ordering::Relaxed),
            saves_allowed: self.saves_allowed.load(Ordering::Relaxed),
            saves_skipped: self.saves_skipped.load(Ordering::Relaxed),
            fail_open_saves: self.fail_open_saves.load(Ordering::Relaxed),
            snapshot_updates: self.snapshot_updates.load(Ordering::Relaxed),
            interval_rearms: self.interval_rearms.load(Ordering::Relaxed),
            records_created: self.records_created.load(Ordering::Relaxed),
            records_removed: self.records_removed.load(Ordering::Relaxed),
            unknown_roles: self.unknown_roles.load(Ordering::Relaxed),
        }
    }
}

impl Default for PacerCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// A snapshot of counter values at a point in time.
#[derive(Debug, Clone)]
pub struct CounterSnapshot {
    /// Bot ticks processed.
    pub ticks_total: u64,
    /// Phases executed.
    pub phases_run: u64,
    /// Phases gated off, by tier index `[full, reduced, minimal]`.
    pub phases_skipped: [u64; 3],
    /// Failed phase callables.
    pub phase_failures: u64,
    /// Ticks ended early by safety.
    pub safety_interrupts: u64,
    /// Ticks aborted on invalid bots.
    pub ticks_aborted: u64,
    /// Save decisions taken.
    pub save_checks: u64,
    /// Saves allowed.
    pub saves_allowed: u64,
    /// Saves skipped.
    pub saves_skipped: u64,
    /// Fail-open saves.
    pub fail_open_saves: u64,
    /// Stored snapshot updates.
    pub snapshot_updates: u64,
    /// Countdown re-arms.
    pub interval_rearms: u64,
    /// Records created.
    pub records_created: u64,
    /// Records removed.
    pub records_removed: u64,
    /// Unknown-role classifications.
    pub unknown_roles: u64,
}

impl CounterSnapshot {
    /// Format as Prometheus-compatible text.
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        format!(
            "# HELP pacer_ticks_total Bot ticks processed\n\
             # TYPE pacer_ticks_total counter\n\
             pacer_ticks_total {}\n\
             # HELP pacer_phases_run_total Phases executed\n\
             # TYPE pacer_phases_run_total counter\n\
             pacer_phases_run_total {}\n\
             # HELP pacer_phases_skipped_total Phases gated off by tier\n\
             # TYPE pacer_phases_skipped_total counter\n\
             pacer_phases_skipped_total{{tier=\"full\"}} {}\n\
             pacer_phases_skipped_total{{tier=\"reduced\"}} {}\n\
             pacer_phases_skipped_total{{tier=\"minimal\"}} {}\n\
             # HELP pacer_phase_failures_total Failed phase callables\n\
             # TYPE pacer_phase_failures_total counter\n\
             pacer_phase_failures_total {}\n\
             # HELP pacer_safety_interrupts_total Ticks ended early by safety\n\
             # TYPE pacer_safety_interrupts_total counter\n\
             pacer_safety_interrupts_total {}\n\
             # HELP pacer_ticks_aborted_total Ticks aborted on invalid bots\n\
             # TYPE pacer_ticks_aborted_total counter\n\
             pacer_ticks_aborted_total {}\n\
             # HELP pacer_save_checks_total Save decisions taken\n\
             # TYPE pacer_save_checks_total counter\n\
             pacer_save_checks_total {}\n\
             # HELP pacer_saves_allowed_total Save opportunities allowed\n\
             # TYPE pacer_saves_allowed_total counter\n\
             pacer_saves_allowed_total {}\n\
             # HELP pacer_saves_skipped_total Save opportunities skipped\n\
             # TYPE pacer_saves_skipped_total counter\n\
             pacer_saves_skipped_total {}\n\
             # HELP pacer_fail_open_saves_total Saves allowed with unknown state\n\
             # TYPE pacer_fail_open_saves_total counter\n\
             pacer_fail_open_saves_total {}\n\
             # HELP pacer_snapshot_updates_total Stored snapshot advances\n\
             # TYPE pacer_snapshot_updates_total counter\n\
             pacer_snapshot_updates_total {}\n\
             # HELP pacer_interval_rearms_total Save countdown re-arms\n\
             # TYPE pacer_interval_rearms_total counter\n\
             pacer_interval_rearms_total {}\n\
             # HELP pacer_records_created_total Controller records created\n\
             # TYPE pacer_records_created_total counter\n\
             pacer_records_created_total {}\n\
             # HELP pacer_records_removed_total Controller records removed\n\
             # TYPE pacer_records_removed_total counter\n\
             pacer_records_removed_total {}\n\
             # HELP pacer_unknown_roles_total Unknown-role classifications\n\
             # TYPE pacer_unknown_roles_total counter\n\
             pacer_unknown_roles_total {}\n",
            self.ticks_total,
            self.phases_run,
            self.phases_skipped[0],
            self.phases_skipped[1],
            self.phases_skipped[2],
            self.phase_failures,
            self.safety_interrupts,
            self.ticks_aborted,
            self.save_checks,
            self.saves_allowed,
            self.saves_skipped,
            self.fail_open_saves,
            self.snapshot_updates,
            self.interval_rearms,
            self.records_created,
            self.records_removed,
            self.unknown_roles,
        )
    }
}

// ---------------------------------------------------------------------------
// Tier Histogram (per sampling window)
// ---------------------------------------------------------------------------

/// Counts ticks per tier within the current sampling window.
///
/// [`TierHistogram::snapshot_and_reset`] closes a window: the dashboard
/// exporter calls it once per scrape and gets the distribution since the
/// previous scrape.
#[derive(Debug, Default)]
pub struct TierHistogram {
    full: AtomicU64,
    reduced: AtomicU64,
    minimal: AtomicU64,
}

impl TierHistogram {
    /// Create an empty histogram.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            full: AtomicU64::new(0),
            reduced: AtomicU64::new(0),
            minimal: AtomicU64::new(0),
        }
    }

    /// Record one tick observed at `tier`.
    pub fn record(&self, tier: Tier) {
        let counter = match tier {
            Tier::Full => &self.full,
            Tier::Reduced => &self.reduced,
            Tier::Minimal => &self.minimal,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Close the current window: return its distribution and start a new one.
    pub fn snapshot_and_reset(&self) -> TierWindow {
        TierWindow {
            full: self.full.swap(0, Ordering::Relaxed),
            reduced: self.reduced.swap(0, Ordering::Relaxed),
            minimal: self.minimal.swap(0, Ordering::Relaxed),
        }
    }

    /// Read the current window without closing it.
    #[must_use]
    pub fn peek(&self) -> TierWindow {
        TierWindow {
            full: self.full.load(Ordering::Relaxed),
            reduced: self.reduced.load(Ordering::Relaxed),
            minimal: self.minimal.load(Ordering::Relaxed),
        }
    }
}

/// Tick distribution across tiers for one sampling window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TierWindow {
    /// Ticks at `Full`.
    pub full: u64,
    /// Ticks at `Reduced`.
    pub reduced: u64,
    /// Ticks at `Minimal`.
    pub minimal: u64,
}

impl TierWindow {
    /// Total ticks in the window.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.full + self.reduced + self.minimal
    }

    /// Ticks recorded for `tier`.
    #[must_use]
    pub fn count(&self, tier: Tier) -> u64 {
        match tier {
            Tier::Full => self.full,
            Tier::Reduced => self.reduced,
            Tier::Minimal => self.minimal,
        }
    }
}

// ---------------------------------------------------------------------------
// Tick Budget Monitor
// ---------------------------------------------------------------------------

/// Tracks how long individual bot ticks take against a budget.
///
/// Durations are stored as whole microseconds in a fixed ring of the most
/// recent ticks; percentile queries sort a copy, which is fine for the rare
/// dashboard read.
#[derive(Debug)]
pub struct TickBudgetMonitor {
    budget_us: u64,
    ring: Mutex<TickRing>,
}

#[derive(Debug)]
struct TickRing {
    samples: [u64; 256],
    write_idx: usize,
    count: u64,
    last_over_budget: bool,
}

impl TickBudgetMonitor {
    /// Create a monitor with the given per-tick budget in milliseconds.
    #[must_use]
    pub fn new(budget_ms: f64) -> Self {
        Self {
            budget_us: (budget_ms * 1000.0).max(0.0) as u64,
            ring: Mutex::new(TickRing {
                samples: [0; 256],
                write_idx: 0,
                count: 0,
                last_over_budget: false,
            }),
        }
    }

    /// Begin timing a tick. The returned guard records elapsed time on drop.
    pub fn begin_tick(&self) -> TickGuard<'_> {
        TickGuard {
            monitor: self,
            start: Instant::now(),
        }
    }

    /// Record a tick duration manually, in microseconds.
    pub fn record_us(&self, us: u64) {
        let mut ring = self.ring.lock();
        let idx = ring.write_idx;
        ring.samples[idx] = us;
        ring.write_idx = (idx + 1) % ring.samples.len();
        ring.count += 1;
        ring.last_over_budget = us > self.budget_us;
    }

    /// Duration of the most recent tick, in microseconds.
    #[must_use]
    pub fn last_tick_us(&self) -> u64 {
        let ring = self.ring.lock();
        if ring.count == 0 {
            return 0;
        }
        let idx = if ring.write_idx == 0 {
            ring.samples.len() - 1
        } else {
            ring.write_idx - 1
        };
        ring.samples[idx]
    }

    /// Whether the most recent tick exceeded the budget.
    #[must_use]
    pub fn is_over_budget(&self) -> bool {
        self.ring.lock().last_over_budget
    }

    /// Total ticks recorded.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.ring.lock().count
    }

    /// The configured budget, in microseconds.
    #[must_use]
    pub fn budget_us(&self) -> u64 {
        self.budget_us
    }

    /// P50 / P95 / P99 / max over the retained ring, plus over-budget ratio.
    #[must_use]
    pub fn percentiles(&self) -> TickPercentiles {
        let ring = self.ring.lock();
        let n = usize::try_from(ring.count).unwrap_or(usize::MAX).min(ring.samples.len());
        if n == 0 {
            return TickPercentiles::default();
        }

        // Once the ring wraps, n equals the ring length and every slot holds
        // a valid sample.
        let mut sorted: Vec<u64> = ring.samples[..n].to_vec();
        sorted.sort_unstable();

        let len = sorted.len();
        let over = sorted.iter().filter(|&&us| us > self.budget_us).count();
        TickPercentiles {
            p50_us: sorted[len / 2],
            p95_us: sorted[(len * 95) / 100],
            p99_us: sorted[(len * 99) / 100],
            max_us: sorted[len - 1],
            over_budget_ratio: over as f64 / len as f64,
        }
    }
}

/// RAII guard that records elapsed tick time when dropped.
#[derive(Debug)]
pub struct TickGuard<'a> {
    monitor: &'a TickBudgetMonitor,
    start: Instant,
}

impl Drop for TickGuard<'_> {
    fn drop(&mut self) {
        let us = u64::try_from(self.start.elapsed().as_micros()).unwrap_or(u64::MAX);
        self.monitor.record_us(us);
    }
}

/// Percentile statistics for tick durations.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickPercentiles {
    /// 50th percentile, microseconds.
    pub p50_us: u64,
    /// 95th percentile, microseconds.
    pub p95_us: u64,
    /// 99th percentile, microseconds.
    pub p99_us: u64,
    /// Maximum observed, microseconds.
    pub max_us: u64,
    /// Ratio of retained ticks that exceeded the budget (0.0–1.0).
    pub over_budget_ratio: f64,
}

// ---------------------------------------------------------------------------
// Tracing Span Names
// ---------------------------------------------------------------------------

/// Span names used with `tracing::span!` for profiler integration.
pub mod spans {
    /// Top-level per-bot tick span.
    pub const BOT_TICK: &str = "pacer::tick";
    /// Single phase execution.
    pub const PHASE: &str = "pacer::phase";
    /// Save decision at a save opportunity.
    pub const SAVE_CHECK: &str = "pacer::save_check";
    /// Snapshot capture from durable fields.
    pub const SNAPSHOT: &str = "pacer::snapshot";
    /// Countdown re-arm on tier transition.
    pub const REARM: &str = "pacer::rearm";
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_default_zero() {
        let counters = PacerCounters::new();
        let snap = counters.snapshot();
        assert_eq!(snap.ticks_total, 0);
        assert_eq!(snap.phases_skipped, [0, 0, 0]);
        assert_eq!(snap.saves_skipped, 0);
    }

    #[test]
    fn skip_counter_lands_on_the_right_tier() {
        let counters = PacerCounters::new();
        counters.note_phase_skipped(Tier::Reduced);
        counters.note_phase_skipped(Tier::Reduced);
        counters.note_phase_skipped(Tier::Minimal);

        let snap = counters.snapshot();
        assert_eq!(snap.phases_skipped, [0, 2, 1]);
    }

    #[test]
    fn prometheus_format_valid() {
        let counters = PacerCounters::new();
        counters.save_checks.fetch_add(42, Ordering::Relaxed);
        let prom = counters.snapshot().to_prometheus();
        assert!(prom.contains("pacer_save_checks_total 42"));
        assert!(prom.contains("# TYPE"));
        assert!(prom.contains("# HELP"));
        assert!(prom.contains("pacer_phases_skipped_total{tier=\"reduced\"}"));
    }

    #[test]
    fn histogram_windows_reset() {
        let hist = TierHistogram::new();
        hist.record(Tier::Full);
        hist.record(Tier::Full);
        hist.record(Tier::Minimal);

        let window = hist.snapshot_and_reset();
        assert_eq!(window.full, 2);
        assert_eq!(window.reduced, 0);
        assert_eq!(window.minimal, 1);
        assert_eq!(window.total(), 3);

        // New window starts empty.
        assert_eq!(hist.peek().total(), 0);
    }

    #[test]
    fn monitor_records_and_detects_over_budget() {
        let monitor = TickBudgetMonitor::new(1.0); // 1ms = 1000μs
        monitor.record_us(400);
        assert!(!monitor.is_over_budget());
        monitor.record_us(1500);
        assert!(monitor.is_over_budget());
        assert_eq!(monitor.last_tick_us(), 1500);
        assert_eq!(monitor.tick_count(), 2);
    }

    #[test]
    fn guard_records_timing() {
        let monitor = TickBudgetMonitor::new(100.0);
        {
            let _guard = monitor.begin_tick();
            let mut _sum = 0u64;
            for i in 0..1000 {
                _sum += i;
            }
        }
        assert_eq!(monitor.tick_count(), 1);
        assert!(!monitor.is_over_budget());
    }

    #[test]
    fn percentiles_ordered() {
        let monitor = TickBudgetMonitor::new(1.0);
        for us in (0..200).map(|i| i * 10) {
            monitor.record_us(us);
        }

        let pct = monitor.percentiles();
        assert!(pct.p50_us <= pct.p95_us);
        assert!(pct.p95_us <= pct.p99_us);
        assert!(pct.p99_us <= pct.max_us);
        assert!(pct.over_budget_ratio > 0.0);
    }

    #[test]
    fn percentiles_empty() {
        let monitor = TickBudgetMonitor::new(1.0);
        let pct = monitor.percentiles();
        assert_eq!(pct.max_us, 0);
        assert!((pct.over_budget_ratio - 0.0).abs() < f64::EPSILON);
    }
}
