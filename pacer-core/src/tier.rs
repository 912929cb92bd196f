//! Budget tiers and the role classifier.
//!
//! A tier is the single coarse signal everything else keys off: which phases
//! run inside a tick, and which save interval the host's countdown gets.
//! Tiers throttle *scope inside a tick*, never time between ticks; inter-tick
//! frequency belongs to the host's proximity throttler.
//!
//! | Tier      | Phases                                                    |
//! |-----------|-----------------------------------------------------------|
//! | `Full`    | all eight                                                 |
//! | `Reduced` | safety, movement, buffs-and-defensives, humanization      |
//! | `Minimal` | safety only                                               |

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::phase::Phase;
use crate::types::Role;

/// Coarse per-bot work budget, ordered by how much work is permitted.
///
/// The derived ordering puts `Minimal < Reduced < Full`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Safety-critical phases only; no active behavior.
    Minimal,
    /// Movement and safety phases only; no combat targeting, no strategy
    /// re-evaluation, no trigger processing.
    Reduced,
    /// All phases run.
    Full,
}

impl Tier {
    /// Every tier, for table tests and counter indexing.
    pub const ALL: [Self; 3] = [Self::Full, Self::Reduced, Self::Minimal];

    /// Stable index used by per-tier counter arrays: full=0, reduced=1,
    /// minimal=2.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Full => 0,
            Self::Reduced => 1,
            Self::Minimal => 2,
        }
    }

    /// Whether `phase` is in this tier's permitted subset.
    #[must_use]
    pub fn permits(self, phase: Phase) -> bool {
        match self {
            Self::Full => true,
            Self::Reduced => matches!(
                phase,
                Phase::Safety
                    | Phase::Movement
                    | Phase::BuffsAndDefensives
                    | Phase::HumanizationBehavior
            ),
            Self::Minimal => matches!(phase, Phase::Safety),
        }
    }

    /// The permitted phase subset, in execution order.
    #[must_use]
    pub fn phases(self) -> &'static [Phase] {
        match self {
            Self::Full => &Phase::ORDERED,
            Self::Reduced => &[
                Phase::Safety,
                Phase::Movement,
                Phase::BuffsAndDefensives,
                Phase::HumanizationBehavior,
            ],
            Self::Minimal => &[Phase::Safety],
        }
    }

    /// Human-readable label, used in logs and metrics.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Reduced => "reduced",
            Self::Minimal => "minimal",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Map a bot's current role to its budget tier.
///
/// Total, deterministic, side-effect-free: a branch table with no hidden
/// inputs, no allocation, no locking. Derived anew at every decision point;
/// nothing stores an authoritative tier.
///
/// Unknown roles map to [`Tier::Full`]: missing humanization data must not
/// suppress combat AI.
#[must_use]
pub fn classify(role: Role) -> Tier {
    match role {
        Role::Grinding | Role::Questing | Role::Dungeon | Role::Gathering => Tier::Full,
        Role::Traveling
        | Role::Exploring
        | Role::CityLife
        | Role::Socializing
        | Role::Training => Tier::Reduced,
        Role::Idle | Role::Resting | Role::Inactive => Tier::Minimal,
        Role::Unknown => Tier::Full,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifier_table() {
        assert_eq!(classify(Role::Grinding), Tier::Full);
        assert_eq!(classify(Role::Questing), Tier::Full);
        assert_eq!(classify(Role::Dungeon), Tier::Full);
        assert_eq!(classify(Role::Gathering), Tier::Full);
        assert_eq!(classify(Role::Traveling), Tier::Reduced);
        assert_eq!(classify(Role::Exploring), Tier::Reduced);
        assert_eq!(classify(Role::CityLife), Tier::Reduced);
        assert_eq!(classify(Role::Socializing), Tier::Reduced);
        assert_eq!(classify(Role::Training), Tier::Reduced);
        assert_eq!(classify(Role::Idle), Tier::Minimal);
        assert_eq!(classify(Role::Resting), Tier::Minimal);
        assert_eq!(classify(Role::Inactive), Tier::Minimal);
    }

    #[test]
    fn unknown_role_defaults_to_full() {
        assert_eq!(classify(Role::Unknown), Tier::Full);
        assert_eq!(classify(Role::from_name("no-such-role")), Tier::Full);
    }

    #[test]
    fn classifier_is_total() {
        for role in Role::ALL {
            // Must return one of the three tiers for every role, including
            // the unknown catch-all.
            let tier = classify(role);
            assert!(Tier::ALL.contains(&tier));
        }
    }

    #[test]
    fn tier_ordering_tracks_permitted_work() {
        assert!(Tier::Minimal < Tier::Reduced);
        assert!(Tier::Reduced < Tier::Full);
    }

    #[test]
    fn full_permits_everything() {
        for phase in Phase::ORDERED {
            assert!(Tier::Full.permits(phase));
        }
        assert_eq!(Tier::Full.phases().len(), 8);
    }

    #[test]
    fn reduced_permits_exactly_four() {
        let permitted: Vec<Phase> = Phase::ORDERED
            .into_iter()
            .filter(|p| Tier::Reduced.permits(*p))
            .collect();
        assert_eq!(
            permitted,
            vec![
                Phase::Safety,
                Phase::Movement,
                Phase::BuffsAndDefensives,
                Phase::HumanizationBehavior,
            ]
        );
        assert_eq!(Tier::Reduced.phases(), permitted.as_slice());
    }

    #[test]
    fn minimal_permits_safety_only() {
        for phase in Phase::ORDERED {
            assert_eq!(Tier::Minimal.permits(phase), phase == Phase::Safety);
        }
        assert_eq!(Tier::Minimal.phases(), &[Phase::Safety]);
    }

    #[test]
    fn permits_agrees_with_phase_list() {
        for tier in Tier::ALL {
            for phase in Phase::ORDERED {
                assert_eq!(tier.permits(phase), tier.phases().contains(&phase));
            }
        }
    }
}
