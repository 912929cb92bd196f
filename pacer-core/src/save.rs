//! The save controller — coarse differential persistence for bots.
//!
//! The host owns the actual write path and a per-bot save countdown; this
//! controller only answers two questions:
//!
//! - On a tier transition: *what should the countdown be re-armed to?*
//! - At a save opportunity: *did anything meaningful change since the last
//!   completed save?*
//!
//! Per-bot state lives in a registry of plain-value records keyed by
//! [`BotId`]. The registry is sharded ([`DashMap`]), so the guard is held
//! only for the duration of one lookup, insert, or erase; the fields inside
//! a record are touched only from that bot's serialized path. The interval
//! table is read-mostly behind an `RwLock` and can be replaced at runtime;
//! replacements take effect at the next tier transition.
//!
//! The controller never retries saves, never writes bot state, and never
//! blocks.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::atomic::Ordering;
use tracing::{debug, warn};

use crate::config::IntervalConfig;
use crate::metrics::PacerCounters;
use crate::snapshot::SaveSnapshot;
use crate::tier::Tier;
use crate::types::{BotId, DurableFields};

// ---------------------------------------------------------------------------
// Per-bot record
// ---------------------------------------------------------------------------

/// Freshness of a bot's stored snapshot relative to durable storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotState {
    /// No save has completed yet; the first opportunity always writes.
    NotYet,
    /// The stored snapshot matches the last completed save.
    Fresh,
    /// Divergence was observed at a save check; a write is pending.
    Stale,
}

/// One controller record per live bot. Plain values only; holds no
/// references into host objects and is safe to retain until erased.
#[derive(Debug)]
struct BotRecord {
    snapshot: SaveSnapshot,
    state: SnapshotState,
    last_tier: Option<Tier>,
    checks: u64,
    allowed: u64,
    skipped: u64,
    transitions: u64,
}

impl BotRecord {
    fn new() -> Self {
        Self {
            snapshot: SaveSnapshot::empty(),
            state: SnapshotState::NotYet,
            last_tier: None,
            checks: 0,
            allowed: 0,
            skipped: 0,
            transitions: 0,
        }
    }
}

/// Read-only view of one bot's save statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotSaveStats {
    /// Save decisions taken for this bot.
    pub checks: u64,
    /// Decisions that allowed a write.
    pub allowed: u64,
    /// Decisions that deferred the write.
    pub skipped: u64,
    /// Tier transitions observed.
    pub transitions: u64,
    /// Current snapshot freshness.
    pub state: SnapshotState,
    /// Most recently observed tier, if any.
    pub last_tier: Option<Tier>,
}

// ---------------------------------------------------------------------------
// SaveController
// ---------------------------------------------------------------------------

/// Decides whether save opportunities write, and re-arms save cadence on
/// tier transitions.
#[derive(Debug)]
pub struct SaveController {
    records: DashMap<BotId, BotRecord>,
    intervals: RwLock<IntervalConfig>,
    counters: Arc<PacerCounters>,
}

impl SaveController {
    /// Create a controller with the given interval table.
    #[must_use]
    pub fn new(intervals: IntervalConfig, counters: Arc<PacerCounters>) -> Self {
        Self {
            records: DashMap::new(),
            intervals: RwLock::new(intervals),
            counters,
        }
    }

    // ------------------------------------------------------------------
    // Interval table
    // ------------------------------------------------------------------

    /// The countdown duration for `tier` under the current table.
    ///
    /// Public so the host can re-arm after a deferred save using the
    /// current tier's interval.
    #[must_use]
    pub fn interval_for(&self, tier: Tier) -> Duration {
        self.intervals.read().interval_for(tier)
    }

    /// Replace the interval table. Takes effect at the next tier
    /// transition; countdowns already armed keep running.
    pub fn set_intervals(&self, intervals: IntervalConfig) {
        *self.intervals.write() = intervals;
        debug!(
            full_ms = intervals.full_interval_ms,
            reduced_ms = intervals.reduced_interval_ms,
            minimal_ms = intervals.minimal_interval_ms,
            "Save interval table replaced"
        );
    }

    // ------------------------------------------------------------------
    // Tier transitions
    // ------------------------------------------------------------------

    /// Record that `bot` is now at `new_tier` and return the countdown the
    /// host should re-arm with.
    ///
    /// Writes no bot state; only the record's tier observation changes. The
    /// scheduler calls this from inside a tick whenever classification
    /// differs from the recorded tier; hosts never call it directly.
    pub fn on_tier_transition(&self, bot: BotId, new_tier: Tier) -> Duration {
        let mut rec = self.record_entry(bot);
        let prev = rec.last_tier;
        rec.last_tier = Some(new_tier);
        rec.transitions += 1;
        drop(rec);

        self.counters.interval_rearms.fetch_add(1, Ordering::Relaxed);
        let interval = self.interval_for(new_tier);
        debug!(
            bot = %bot,
            from = prev.map_or("none", Tier::label),
            to = %new_tier,
            interval_ms = interval.as_millis() as u64,
            "Tier transition, save countdown re-armed"
        );
        interval
    }

    /// Compare `tier` against the recorded observation; on change, record
    /// it and return the interval to re-arm with. Returns `None` when the
    /// tier is unchanged.
    ///
    /// The first observation for a bot counts as a transition, which gives
    /// the bot its initial tier-appropriate countdown.
    pub fn observe_tier(&self, bot: BotId, tier: Tier) -> Option<Duration> {
        if let Some(rec) = self.records.get(&bot) {
            if rec.last_tier == Some(tier) {
                return None;
            }
        }
        Some(self.on_tier_transition(bot, tier))
    }

    // ------------------------------------------------------------------
    // Save decisions
    // ------------------------------------------------------------------

    /// Decide whether the host should write `bot` at this save opportunity.
    ///
    /// `fields` is the host's fresh capture of the bot's durable state, or
    /// `None` when it could not be formed — in which case the decision is
    /// `true` (fail-open: never silently lose a save).
    ///
    /// A `false` return means "defer": nothing changed that the snapshot
    /// can observe, and the host should re-arm the countdown with
    /// [`SaveController::interval_for`] of the bot's current tier.
    pub fn should_save(&self, bot: BotId, fields: Option<&DurableFields>) -> bool {
        let mut rec = self.record_entry(bot);
        rec.checks += 1;
        self.counters.save_checks.fetch_add(1, Ordering::Relaxed);

        let Some(fields) = fields else {
            rec.allowed += 1;
            self.counters.fail_open_saves.fetch_add(1, Ordering::Relaxed);
            self.counters.saves_allowed.fetch_add(1, Ordering::Relaxed);
            warn!(bot = %bot, "Durable fields unavailable, allowing save");
            return true;
        };

        let fresh = SaveSnapshot::capture(fields);
        let changed = match rec.state {
            SnapshotState::NotYet => true,
            SnapshotState::Fresh | SnapshotState::Stale => fresh != rec.snapshot,
        };

        if changed {
            if rec.state == SnapshotState::Fresh {
                rec.state = SnapshotState::Stale;
            }
            rec.allowed += 1;
            self.counters.saves_allowed.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            rec.skipped += 1;
            self.counters.saves_skipped.fetch_add(1, Ordering::Relaxed);
            debug!(bot = %bot, checks = rec.checks, "Save skipped, no durable change");
            false
        }
    }

    /// Advance the stored snapshot after the host completed a save.
    ///
    /// This is the only path that writes the stored snapshot, so a skipped
    /// decision can never mask state the last write did not cover. If the
    /// host's save failed it must not call this; the next opportunity then
    /// re-evaluates against the last known-good snapshot.
    pub fn on_save_completed(&self, bot: BotId, fields: Option<&DurableFields>) {
        let mut rec = self.record_entry(bot);
        match fields {
            Some(fields) => {
                rec.snapshot = SaveSnapshot::capture(fields);
                rec.state = SnapshotState::Fresh;
                self.counters.snapshot_updates.fetch_add(1, Ordering::Relaxed);
                debug!(bot = %bot, "Stored snapshot advanced after save");
            }
            None => {
                // Leave the record un-advanced; the next check fails open.
                warn!(bot = %bot, "Save completed but durable fields unavailable");
            }
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Erase the controller record on bot teardown. Returns `true` if a
    /// record existed.
    pub fn remove(&self, bot: BotId) -> bool {
        let removed = self.records.remove(&bot).is_some();
        if removed {
            self.counters.records_removed.fetch_add(1, Ordering::Relaxed);
            debug!(bot = %bot, "Controller record removed");
        }
        removed
    }

    /// Number of live controller records.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Per-bot save statistics, if a record exists.
    #[must_use]
    pub fn stats(&self, bot: BotId) -> Option<BotSaveStats> {
        self.records.get(&bot).map(|rec| BotSaveStats {
            checks: rec.checks,
            allowed: rec.allowed,
            skipped: rec.skipped,
            transitions: rec.transitions,
            state: rec.state,
            last_tier: rec.last_tier,
        })
    }

    /// Fetch or lazily create the record for `bot`.
    fn record_entry(&self, bot: BotId) -> dashmap::mapref::one::RefMut<'_, BotId, BotRecord> {
        self.records.entry(bot).or_insert_with(|| {
            self.counters.records_created.fetch_add(1, Ordering::Relaxed);
            BotRecord::new()
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
