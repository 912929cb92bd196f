//! The work scheduler — tier-gated phase dispatch for one bot tick.
//!
//! The scheduler owns no bot state. Per tick it takes the tier derived from
//! the bot's current role, walks the fixed phase order, and invokes the
//! host-bound callable for every phase the tier permits. Gated phases are
//! wholly skipped and counted; permitted phases run in full.
//!
//! Tiers throttle scope inside a tick only. How often `run_tick` is called
//! per bot is the host's proximity throttler's business, not ours.
//!
//! ## Error policy
//!
//! A phase that fails is logged and the tick continues; failures never reach
//! the host loop. The only early exits are driven by the safety phase:
//! [`PhaseControl::EndTick`] (safety acted, e.g. cast a defensive) and
//! [`PhaseControl::AbortTick`] (the bot is invalid).

use std::sync::Arc;
use std::sync::atomic::Ordering;

use tracing::warn;

use crate::error::Result;
use crate::metrics::{PacerCounters, TierHistogram, TierWindow};
use crate::phase::{Phase, PhaseControl, PhaseMask};
use crate::tier::Tier;

// ---------------------------------------------------------------------------
// PhaseRunner
// ---------------------------------------------------------------------------

/// One callable per AI phase, bound by the host.
///
/// Each method performs one phase for one bot, synchronously, and reports
/// what the scheduler should do next. From the scheduler's perspective every
/// callable is stateless at the scope of the tick; any state it keeps lives
/// on the host side.
pub trait PhaseRunner {
    /// The host's bot entity type.
    type Bot;

    /// Imminent-death checks and other must-act conditions.
    fn run_safety(&mut self, bot: &mut Self::Bot) -> Result<PhaseControl>;
    /// Pathing and position updates.
    fn run_movement(&mut self, bot: &mut Self::Bot) -> Result<PhaseControl>;
    /// Target acquisition and threat selection.
    fn run_combat_targeting(&mut self, bot: &mut Self::Bot) -> Result<PhaseControl>;
    /// One step of the class-specific combat rotation.
    fn run_combat_rotation(&mut self, bot: &mut Self::Bot) -> Result<PhaseControl>;
    /// Buff upkeep and defensive cooldowns.
    fn run_buffs_and_defensives(&mut self, bot: &mut Self::Bot) -> Result<PhaseControl>;
    /// Goal reordering and strategy selection.
    fn run_strategy_evaluation(&mut self, bot: &mut Self::Bot) -> Result<PhaseControl>;
    /// Pending event-driven AI triggers.
    fn run_triggers(&mut self, bot: &mut Self::Bot) -> Result<PhaseControl>;
    /// One step of the humanization behavior manager.
    fn run_humanization(&mut self, bot: &mut Self::Bot) -> Result<PhaseControl>;
}

// ---------------------------------------------------------------------------
// Tick results
// ---------------------------------------------------------------------------

/// How a tick ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Every permitted phase was offered.
    Completed,
    /// The safety phase acted and ended the tick early.
    SafetyInterrupt,
    /// The safety phase reported the bot invalid; the tick was abandoned.
    Aborted,
}

/// Diagnostic summary of one tick. Purely observational; hosts may ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// The tier the tick ran under.
    pub tier: Tier,
    /// Phases that actually executed.
    pub executed: PhaseMask,
    /// How the tick ended.
    pub outcome: TickOutcome,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Tier-gated phase dispatcher. One instance serves all bots; it holds only
/// counters, so ticking distinct bots from distinct shards in parallel is
/// safe.
#[derive(Debug)]
pub struct Scheduler {
    counters: Arc<PacerCounters>,
    histogram: TierHistogram,
}

impl Scheduler {
    /// Create a scheduler reporting into `counters`.
    #[must_use]
    pub fn new(counters: Arc<PacerCounters>) -> Self {
        Self {
            counters,
            histogram: TierHistogram::new(),
        }
    }

    /// Run one tick for one bot at the given tier.
    ///
    /// Phases run in [`Phase::ORDERED`] order; gated phases are wholly
    /// skipped. The tier was derived from the bot's role at the start of
    /// this call's caller — if the role changes mid-tick, the new tier
    /// takes effect at the next tick, never retroactively.
    pub fn run_tick<R: PhaseRunner>(
        &self,
        runner: &mut R,
        bot: &mut R::Bot,
        tier: Tier,
    ) -> TickReport {
        self.counters.ticks_total.fetch_add(1, Ordering::Relaxed);
        self.histogram.record(tier);

        let mut executed = PhaseMask::EMPTY;
        let mut outcome = TickOutcome::Completed;

        for phase in Phase::ORDERED {
            if !tier.permits(phase) {
                self.counters.note_phase_skipped(tier);
                continue;
            }

            match Self::dispatch(runner, bot, phase) {
                Ok(PhaseControl::Continue) => {
                    executed.insert(phase);
                    self.counters.phases_run.fetch_add(1, Ordering::Relaxed);
                }
                Ok(PhaseControl::EndTick) => {
                    executed.insert(phase);
                    self.counters.phases_run.fetch_add(1, Ordering::Relaxed);
                    self.counters.safety_interrupts.fetch_add(1, Ordering::Relaxed);
                    outcome = TickOutcome::SafetyInterrupt;
                    break;
                }
                Ok(PhaseControl::AbortTick) => {
                    self.counters.ticks_aborted.fetch_add(1, Ordering::Relaxed);
                    outcome = TickOutcome::Aborted;
                    break;
                }
                Err(error) => {
                    // Log and keep going; phase failures never propagate to
                    // the host loop.
                    self.counters.phase_failures.fetch_add(1, Ordering::Relaxed);
                    warn!(phase = %phase, %error, "Phase failed, continuing tick");
                }
            }
        }

        TickReport {
            tier,
            executed,
            outcome,
        }
    }

    /// Close the current sampling window of the tier histogram.
    pub fn tier_window(&self) -> TierWindow {
        self.histogram.snapshot_and_reset()
    }

    /// Read the current (unclosed) tier window.
    #[must_use]
    pub fn tier_window_peek(&self) -> TierWindow {
        self.histogram.peek()
    }

    fn dispatch<R: PhaseRunner>(
        runner: &mut R,
        bot: &mut R::Bot,
        phase: Phase,
    ) -> Result<PhaseControl> {
        match phase {
            Phase::Safety => runner.run_safety(bot),
            Phase::Movement => runner.run_movement(bot),
            Phase::CombatTargeting => runner.run_combat_targeting(bot),
            Phase::CombatRotation => runner.run_combat_rotation(bot),
            Phase::BuffsAndDefensives => runner.run_buffs_and_defensives(bot),
            Phase::StrategyEvaluation => runner.run_strategy_evaluation(bot),
            Phase::Triggers => runner.run_triggers(bot),
            Phase::HumanizationBehavior => runner.run_humanization(bot),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
