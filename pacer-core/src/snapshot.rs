//! Save snapshots — lightweight fingerprints of a bot's durable state.
//!
//! A snapshot is what the save controller compares at each save opportunity
//! to decide whether a write is worth making. It deliberately covers only
//! meaningful persistent events (loot, level-up, quest progress, zone
//! change) and ignores transient fields entirely.
//!
//! The equipment and quest-log fingerprints are order-independent: each
//! element is mixed through a SplitMix64-style finalizer and the results are
//! folded with XOR, so host iteration order never triggers a spurious save.
//! The digests are in-memory only and need not be stable across process
//! restarts.

use serde::{Deserialize, Serialize};

use crate::types::DurableFields;

// ---------------------------------------------------------------------------
// Order-independent digests
// ---------------------------------------------------------------------------

/// SplitMix64 finalizer. Small and local; a whole hashing crate would be
/// overkill for two u64 digests.
fn mix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

/// Fold a set of elements into an order-independent digest.
///
/// XOR is commutative and associative, so any permutation of the same
/// element set produces the same digest. The empty set digests to zero.
pub fn set_digest<I>(items: I) -> u64
where
    I: IntoIterator<Item = u64>,
{
    items.into_iter().fold(0, |acc, item| acc ^ mix64(item))
}

// ---------------------------------------------------------------------------
// SaveSnapshot
// ---------------------------------------------------------------------------

/// Fingerprint of a bot's durable state at one point in time.
///
/// Opaque outside the save controller; only equality and the initialized
/// flag are observable. Two snapshots are equal iff all plain fields compare
/// equal and both digests compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveSnapshot {
    /// Character level at capture time.
    pub level: u32,
    /// Experience toward next level at capture time.
    pub xp: u32,
    /// Carried currency at capture time.
    pub money: u64,
    /// Zone the bot was in at capture time.
    pub zone_id: u32,
    /// Order-independent digest of equipped item identifiers.
    pub equipment_digest: u64,
    /// Order-independent digest of (quest id, status) pairs.
    pub quest_digest: u64,
    /// Distinguishes "no snapshot yet" from a snapshot of all-zero state.
    pub initialized: bool,
}

impl SaveSnapshot {
    /// The "no snapshot yet" sentinel stored before the first completed save.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            level: 0,
            xp: 0,
            money: 0,
            zone_id: 0,
            equipment_digest: 0,
            quest_digest: 0,
            initialized: false,
        }
    }

    /// Capture a snapshot from a host-provided view of durable fields.
    #[must_use]
    pub fn capture(fields: &DurableFields) -> Self {
        let equipment_digest =
            set_digest(fields.equipped_item_ids.iter().map(|&id| u64::from(id)));
        // A quest entry hashes both the id and its status so a completion
        // flip changes the digest even when the log keeps the same ids.
        let quest_digest = set_digest(
            fields
                .active_quests
                .iter()
                .map(|q| (u64::from(q.quest_id) << 2) | q.status.code()),
        );

        Self {
            level: fields.level,
            xp: fields.xp,
            money: fields.money,
            zone_id: fields.zone_id,
            equipment_digest,
            quest_digest,
            initialized: true,
        }
    }
}

impl Default for SaveSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}
