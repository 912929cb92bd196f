//! Core type definitions for the PACER pacing system.
//!
//! All types are plain values: no back-references to host entities, safe to
//! retain past a bot's removal.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity Types
// ---------------------------------------------------------------------------

/// Unique identifier for a bot character, stable within process lifetime.
///
/// Hosts with integer GUIDs can map them into UUIDs at the boundary; PACER
/// only ever hashes and compares these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BotId(pub Uuid);

impl BotId {
    /// Create a new random bot ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BotId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Role State
// ---------------------------------------------------------------------------

/// High-level lifestyle role of a bot, owned by the external humanization
/// layer. PACER consumes it read-only as the classifier's input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Farming mobs for experience or loot.
    Grinding,
    /// Actively working a quest objective.
    Questing,
    /// Inside an instanced group dungeon.
    Dungeon,
    /// Harvesting professions (mining, herbalism, fishing spots).
    Gathering,
    /// Long-distance travel between zones.
    Traveling,
    /// Wandering the world without a fixed objective.
    Exploring,
    /// City-life activities (vendors, auction house, idling in town).
    CityLife,
    /// Chatting or emoting with other characters.
    Socializing,
    /// Visiting a class trainer or profession trainer.
    Training,
    /// Standing around with nothing scheduled.
    Idle,
    /// Resting at an inn or campfire.
    Resting,
    /// Logged in but deliberately dormant (AFK simulation).
    Inactive,
    /// Role value the humanization layer produced but PACER does not know.
    /// Classified as full-budget so missing data never suppresses combat AI.
    Unknown,
}

impl Role {
    /// Every role variant, for exhaustive table tests.
    pub const ALL: [Self; 13] = [
        Self::Grinding,
        Self::Questing,
        Self::Dungeon,
        Self::Gathering,
        Self::Traveling,
        Self::Exploring,
        Self::CityLife,
        Self::Socializing,
        Self::Training,
        Self::Idle,
        Self::Resting,
        Self::Inactive,
        Self::Unknown,
    ];

    /// Parse a role from its wire name (the humanization layer's label).
    ///
    /// Unrecognized names map to [`Role::Unknown`] and are logged at debug
    /// level so missing mappings surface in diagnostics without changing
    /// behavior.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "grinding" => Self::Grinding,
            "questing" => Self::Questing,
            "dungeon" => Self::Dungeon,
            "gathering" => Self::Gathering,
            "traveling" => Self::Traveling,
            "exploring" => Self::Exploring,
            "city-life" => Self::CityLife,
            "socializing" => Self::Socializing,
            "training" => Self::Training,
            "idle" => Self::Idle,
            "resting" => Self::Resting,
            "inactive" => Self::Inactive,
            other => {
                tracing::debug!(role = other, "Unmapped role name, treating as unknown");
                Self::Unknown
            }
        }
    }

    /// The wire name of this role.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Grinding => "grinding",
            Self::Questing => "questing",
            Self::Dungeon => "dungeon",
            Self::Gathering => "gathering",
            Self::Traveling => "traveling",
            Self::Exploring => "exploring",
            Self::CityLife => "city-life",
            Self::Socializing => "socializing",
            Self::Training => "training",
            Self::Idle => "idle",
            Self::Resting => "resting",
            Self::Inactive => "inactive",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Durable State View
// ---------------------------------------------------------------------------

/// Completion status of an active quest in the bot's log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestStatus {
    /// Accepted, objectives not yet met.
    Incomplete,
    /// Objectives met, reward not yet turned in.
    Complete,
    /// Failed (timer expired, escort died).
    Failed,
}

impl QuestStatus {
    /// Stable small-integer encoding used by the quest-log fingerprint.
    #[must_use]
    pub fn code(self) -> u64 {
        match self {
            Self::Incomplete => 0,
            Self::Complete => 1,
            Self::Failed => 2,
        }
    }
}

/// One entry of the bot's active quest log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestProgress {
    /// Quest template identifier.
    pub quest_id: u32,
    /// Current completion status.
    pub status: QuestStatus,
}

/// Read-only view of a bot's durable fields, captured by the host.
///
/// This is everything the save controller fingerprints. Transient fields
/// (position, health, mana) are deliberately absent: a resting bot that
/// drifts a few yards must not defeat differential saves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurableFields {
    /// Current character level.
    pub level: u32,
    /// Experience accumulated toward the next level.
    pub xp: u32,
    /// Carried currency, in the smallest denomination.
    pub money: u64,
    /// Identifier of the zone the bot is in.
    pub zone_id: u32,
    /// Item identifiers currently equipped, in host iteration order.
    /// Order is irrelevant to the fingerprint.
    pub equipped_item_ids: Vec<u32>,
    /// Active quest log entries, in host iteration order.
    pub active_quests: Vec<QuestProgress>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_names_round_trip() {
        for role in Role::ALL {
            if role == Role::Unknown {
                continue;
            }
            assert_eq!(Role::from_name(role.name()), role);
        }
    }

    #[test]
    fn unrecognized_role_name_maps_to_unknown() {
        assert_eq!(Role::from_name("speedrunning"), Role::Unknown);
        assert_eq!(Role::from_name(""), Role::Unknown);
    }

    #[test]
    fn quest_status_codes_distinct() {
        let codes = [
            QuestStatus::Incomplete.code(),
            QuestStatus::Complete.code(),
            QuestStatus::Failed.code(),
        ];
        assert_eq!(codes.len(), 3);
        assert_ne!(codes[0], codes[1]);
        assert_ne!(codes[1], codes[2]);
        assert_ne!(codes[0], codes[2]);
    }

    #[test]
    fn bot_ids_are_unique() {
        assert_ne!(BotId::new(), BotId::new());
    }
}
