//! The per-bot driver — the facade the host game loop invokes.
//!
//! One [`BotDriver`] serves every bot on the process. It wires the role
//! classifier, the work scheduler, and the save controller together behind
//! the exact hook surface the host expects: `tick_bot` once per bot per
//! logical update, `should_save` / `on_save_completed` around each save
//! opportunity, `remove` on teardown.
//!
//! The driver holds only shared-safe state (counters, the record registry,
//! the interval table); ticking distinct bots from distinct shard threads is
//! fine as long as calls for one bot stay serialized, which the host
//! guarantees.

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use tracing::debug;

use pacer_core::config::{IntervalConfig, PacerConfig, TelemetryConfig};
use pacer_core::metrics::{CounterSnapshot, PacerCounters, TickBudgetMonitor, TierWindow};
use pacer_core::save::{BotSaveStats, SaveController};
use pacer_core::schedule::{Scheduler, TickReport};
use pacer_core::tier::{Tier, classify};
use pacer_core::types::{BotId, Role};

use crate::hooks::HostHooks;

/// Facade combining the scheduler and the save controller for the host.
#[derive(Debug)]
pub struct BotDriver {
    scheduler: Scheduler,
    saves: SaveController,
    monitor: TickBudgetMonitor,
    telemetry: TelemetryConfig,
    counters: Arc<PacerCounters>,
}

impl BotDriver {
    /// Build a driver from configuration.
    #[must_use]
    pub fn new(config: &PacerConfig) -> Self {
        let counters = Arc::new(PacerCounters::new());
        Self {
            scheduler: Scheduler::new(Arc::clone(&counters)),
            saves: SaveController::new(config.intervals, Arc::clone(&counters)),
            monitor: TickBudgetMonitor::new(config.telemetry.tick_budget_ms),
            telemetry: config.telemetry,
            counters,
        }
    }

    /// Run one logical update for `bot`.
    ///
    /// Classifies the bot's current role into a tier, re-arms the host's
    /// save countdown if the tier changed since the last observation, then
    /// runs every phase the tier permits, in order. Returns a diagnostic
    /// report the host may ignore.
    pub fn tick_bot<H: HostHooks>(&self, host: &mut H, bot: &mut H::Bot) -> TickReport {
        let guard = self.monitor.begin_tick();

        let id = host.bot_id(bot);
        let role = host.role_of(bot);
        if role == Role::Unknown {
            self.counters.unknown_roles.fetch_add(1, Ordering::Relaxed);
            if self.telemetry.log_unknown_roles {
                debug!(bot = %id, "Unknown role, running at full budget");
            }
        }
        let tier = classify(role);

        if let Some(countdown) = self.saves.observe_tier(id, tier) {
            host.arm_save_countdown(bot, countdown);
        }

        let report = self.scheduler.run_tick(host, bot, tier);

        drop(guard);
        if self.telemetry.log_slow_ticks && self.monitor.is_over_budget() {
            debug!(
                bot = %id,
                elapsed_us = self.monitor.last_tick_us(),
                budget_us = self.monitor.budget_us(),
                "Bot tick exceeded budget"
            );
        }
        report
    }

    /// Decide whether the host should write `bot` at this save opportunity.
    ///
    /// `false` means defer: skip the write and re-arm the countdown with
    /// [`BotDriver::interval_for`] of the bot's current tier.
    pub fn should_save<H: HostHooks>(&self, host: &H, bot: &H::Bot) -> bool {
        let fields = host.capture_durable_fields(bot);
        self.saves.should_save(host.bot_id(bot), fields.as_ref())
    }

    /// Notify the driver that the host just completed a successful save.
    /// Advances the stored snapshot. Not calling this (a failed save) keeps
    /// the previous snapshot, so the next opportunity re-evaluates.
    pub fn on_save_completed<H: HostHooks>(&self, host: &H, bot: &H::Bot) {
        let fields = host.capture_durable_fields(bot);
        self.saves.on_save_completed(host.bot_id(bot), fields.as_ref());
    }

    /// Force a tier transition: record `new_tier` for `bot` and re-arm the
    /// host's countdown with that tier's interval. `tick_bot` does this
    /// automatically when classification changes; this entry point exists
    /// for components that observe a transition out-of-band.
    pub fn on_tier_transition<H: HostHooks>(&self, host: &mut H, bot: &H::Bot, new_tier: Tier) {
        let countdown = self.saves.on_tier_transition(host.bot_id(bot), new_tier);
        host.arm_save_countdown(bot, countdown);
    }

    /// Erase all per-bot state on teardown. Returns `true` if a record
    /// existed.
    pub fn remove(&self, bot: BotId) -> bool {
        self.saves.remove(bot)
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// The save countdown for `tier` under the current interval table.
    #[must_use]
    pub fn interval_for(&self, tier: Tier) -> Duration {
        self.saves.interval_for(tier)
    }

    /// Replace the save interval table at runtime.
    pub fn set_intervals(&self, intervals: IntervalConfig) {
        self.saves.set_intervals(intervals);
    }

    /// Snapshot all counters.
    #[must_use]
    pub fn counters(&self) -> CounterSnapshot {
        self.counters.snapshot()
    }

    /// Close the current tier sampling window.
    pub fn tier_window(&self) -> TierWindow {
        self.scheduler.tier_window()
    }

    /// Per-bot save statistics, if the bot has a record.
    #[must_use]
    pub fn save_stats(&self, bot: BotId) -> Option<BotSaveStats> {
        self.saves.stats(bot)
    }

    /// Number of live controller records.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.saves.record_count()
    }

    /// The tick budget monitor, for dashboard export.
    #[must_use]
    pub fn monitor(&self) -> &TickBudgetMonitor {
        &self.monitor
    }
}

impl Default for BotDriver {
    fn default() -> Self {
        Self::new(&PacerConfig::default())
    }
}
