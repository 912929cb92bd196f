//! The closed, ordered set of AI phases a bot tick is made of.
//!
//! Phases run in the order of [`Phase::ORDERED`], single-threaded per bot.
//! A phase either runs in full or is wholly skipped by tier gating; there is
//! no partial execution.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One AI step inside a bot tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// Imminent-death checks and other must-act conditions. Always runs and
    /// may short-circuit the rest of the tick.
    Safety,
    /// Pathing and position updates.
    Movement,
    /// Target acquisition and threat selection.
    CombatTargeting,
    /// One step of the class-specific combat rotation, delegated to the
    /// host-bound rotation collaborator.
    CombatRotation,
    /// Buff upkeep and defensive cooldowns.
    BuffsAndDefensives,
    /// Goal reordering and strategy selection.
    StrategyEvaluation,
    /// Pending event-driven AI triggers.
    Triggers,
    /// One step of the humanization behavior manager.
    HumanizationBehavior,
}

impl Phase {
    /// All phases in tick execution order.
    pub const ORDERED: [Self; 8] = [
        Self::Safety,
        Self::Movement,
        Self::CombatTargeting,
        Self::CombatRotation,
        Self::BuffsAndDefensives,
        Self::StrategyEvaluation,
        Self::Triggers,
        Self::HumanizationBehavior,
    ];

    /// Stable index of this phase in execution order.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Safety => 0,
            Self::Movement => 1,
            Self::CombatTargeting => 2,
            Self::CombatRotation => 3,
            Self::BuffsAndDefensives => 4,
            Self::StrategyEvaluation => 5,
            Self::Triggers => 6,
            Self::HumanizationBehavior => 7,
        }
    }

    /// Human-readable label, used in logs and metrics.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Safety => "safety",
            Self::Movement => "movement",
            Self::CombatTargeting => "combat-targeting",
            Self::CombatRotation => "combat-rotation",
            Self::BuffsAndDefensives => "buffs-and-defensives",
            Self::StrategyEvaluation => "strategy-evaluation",
            Self::Triggers => "triggers",
            Self::HumanizationBehavior => "humanization-behavior",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Compact phase set, one bit per phase in execution order.
///
/// Used by tick reports so recording which phases ran costs no allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PhaseMask(u8);

impl PhaseMask {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Add a phase to the set.
    pub fn insert(&mut self, phase: Phase) {
        self.0 |= 1 << phase.index();
    }

    /// Whether the set contains `phase`.
    #[must_use]
    pub fn contains(self, phase: Phase) -> bool {
        self.0 & (1 << phase.index()) != 0
    }

    /// Number of phases in the set.
    #[must_use]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate the contained phases in execution order.
    pub fn iter(self) -> impl Iterator<Item = Phase> {
        Phase::ORDERED.into_iter().filter(move |p| self.contains(*p))
    }
}

impl FromIterator<Phase> for PhaseMask {
    fn from_iter<I: IntoIterator<Item = Phase>>(iter: I) -> Self {
        let mut mask = Self::EMPTY;
        for phase in iter {
            mask.insert(phase);
        }
        mask
    }
}

/// What a phase callable asks the scheduler to do next.
///
/// Only the safety phase meaningfully returns anything but
/// [`PhaseControl::Continue`]; the type permits it everywhere so the host
/// trait stays uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseControl {
    /// Proceed to the next permitted phase.
    Continue,
    /// Safety acted (e.g. cast a defensive); end the tick here. The host's
    /// save opportunity for this bot is unaffected.
    EndTick,
    /// The bot is no longer valid; abort the tick immediately.
    AbortTick,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_covers_every_phase_once() {
        for (i, phase) in Phase::ORDERED.iter().enumerate() {
            assert_eq!(phase.index(), i);
        }
    }

    #[test]
    fn safety_runs_first() {
        assert_eq!(Phase::ORDERED[0], Phase::Safety);
    }

    #[test]
    fn labels_are_unique() {
        let mut labels: Vec<&str> = Phase::ORDERED.iter().map(|p| p.label()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), 8);
    }

    #[test]
    fn phase_mask_insert_and_query() {
        let mut mask = PhaseMask::EMPTY;
        assert!(mask.is_empty());

        mask.insert(Phase::Safety);
        mask.insert(Phase::Movement);
        assert_eq!(mask.len(), 2);
        assert!(mask.contains(Phase::Safety));
        assert!(mask.contains(Phase::Movement));
        assert!(!mask.contains(Phase::Triggers));

        // Inserting twice is idempotent.
        mask.insert(Phase::Safety);
        assert_eq!(mask.len(), 2);
    }

    #[test]
    fn phase_mask_iterates_in_execution_order() {
        let mask: PhaseMask =
            [Phase::Triggers, Phase::Safety, Phase::Movement].into_iter().collect();
        let phases: Vec<Phase> = mask.iter().collect();
        assert_eq!(phases, vec![Phase::Safety, Phase::Movement, Phase::Triggers]);
    }
}
