//! A deterministic simulated host for tests and benches.
//!
//! [`SimHost`] stands in for the game server: it records every phase
//! invocation and every countdown arm, and its bots carry mutable durable
//! fields so save-decision flows can be exercised end to end without an
//! actual game.

use std::time::Duration;

use pacer_core::error::{PacerError, Result};
use pacer_core::phase::{Phase, PhaseControl};
use pacer_core::schedule::PhaseRunner;
use pacer_core::types::{BotId, DurableFields, QuestProgress, QuestStatus, Role};

use crate::hooks::HostHooks;

/// A simulated bot: identity, role, and durable fields, nothing else.
#[derive(Debug, Clone)]
pub struct SimBot {
    /// Bot identity.
    pub id: BotId,
    /// Current lifestyle role; tests mutate this to drive tier changes.
    pub role: Role,
    /// Durable fields the host would capture for snapshots.
    pub fields: DurableFields,
    /// When set, `capture_durable_fields` returns `None` for this bot.
    pub capture_broken: bool,
}

impl SimBot {
    /// Create a bot with the given role and representative durable fields.
    #[must_use]
    pub fn new(role: Role) -> Self {
        Self {
            id: BotId::new(),
            role,
            fields: DurableFields {
                level: 42,
                xp: 118_000,
                money: 21_500,
                zone_id: 14,
                equipped_item_ids: vec![101, 202, 303],
                active_quests: vec![QuestProgress {
                    quest_id: 9001,
                    status: QuestStatus::Incomplete,
                }],
            },
            capture_broken: false,
        }
    }
}

/// Records what the pacing layer asked the host to do.
#[derive(Debug, Default)]
pub struct SimHost {
    /// Invocation counts per phase, indexed by [`Phase::index`].
    pub phase_counts: [u64; 8],
    /// Every phase invocation in order, across all bots.
    pub phase_trace: Vec<Phase>,
    /// Every `arm_save_countdown` call, in order.
    pub armed: Vec<(BotId, Duration)>,
    /// What the safety phase returns. Defaults to `Continue`.
    pub safety_control: Option<PhaseControl>,
    /// A phase scripted to fail, if any.
    pub failing_phase: Option<Phase>,
}

impl SimHost {
    /// Create a host with no recorded activity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Invocation count for `phase`.
    #[must_use]
    pub fn count(&self, phase: Phase) -> u64 {
        self.phase_counts[phase.index()]
    }

    /// The most recent countdown arm, if any.
    #[must_use]
    pub fn last_armed(&self) -> Option<(BotId, Duration)> {
        self.armed.last().copied()
    }

    /// Forget recorded phase activity (counts and trace). Armed countdowns
    /// are kept.
    pub fn clear_phases(&mut self) {
        self.phase_counts = [0; 8];
        self.phase_trace.clear();
    }

    fn step(&mut self, phase: Phase) -> Result<PhaseControl> {
        self.phase_counts[phase.index()] += 1;
        self.phase_trace.push(phase);
        if self.failing_phase == Some(phase) {
            return Err(PacerError::PhaseFailed {
                phase,
                reason: "simulated failure".to_string(),
            });
        }
        if phase == Phase::Safety {
            if let Some(control) = self.safety_control {
                return Ok(control);
            }
        }
        Ok(PhaseControl::Continue)
    }
}

impl PhaseRunner for SimHost {
    type Bot = SimBot;

    fn run_safety(&mut self, _bot: &mut SimBot) -> Result<PhaseControl> {
        self.step(Phase::Safety)
    }
    fn run_movement(&mut self, _bot: &mut SimBot) -> Result<PhaseControl> {
        self.step(Phase::Movement)
    }
    fn run_combat_targeting(&mut self, _bot: &mut SimBot) -> Result<PhaseControl> {
        self.step(Phase::CombatTargeting)
    }
    fn run_combat_rotation(&mut self, _bot: &mut SimBot) -> Result<PhaseControl> {
        self.step(Phase::CombatRotation)
    }
    fn run_buffs_and_defensives(&mut self, _bot: &mut SimBot) -> Result<PhaseControl> {
        self.step(Phase::BuffsAndDefensives)
    }
    fn run_strategy_evaluation(&mut self, _bot: &mut SimBot) -> Result<PhaseControl> {
        self.step(Phase::StrategyEvaluation)
    }
    fn run_triggers(&mut self, _bot: &mut SimBot) -> Result<PhaseControl> {
        self.step(Phase::Triggers)
    }
    fn run_humanization(&mut self, _bot: &mut SimBot) -> Result<PhaseControl> {
        self.step(Phase::HumanizationBehavior)
    }
}

impl HostHooks for SimHost {
    fn bot_id(&self, bot: &SimBot) -> BotId {
        bot.id
    }

    fn role_of(&self, bot: &SimBot) -> Role {
        bot.role
    }

    fn arm_save_countdown(&mut self, bot: &SimBot, countdown: Duration) {
        self.armed.push((bot.id, countdown));
    }

    fn capture_durable_fields(&self, bot: &SimBot) -> Option<DurableFields> {
        if bot.capture_broken {
            None
        } else {
            Some(bot.fields.clone())
        }
    }
}
