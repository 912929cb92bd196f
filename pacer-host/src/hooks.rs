//! The hook surface the host game server implements.
//!
//! PACER never reaches into host internals. Everything it needs — the bot's
//! current role, its durable fields, the phase callables, the save countdown
//! — comes through [`HostHooks`]. All methods are synchronous and are called
//! from the host's game-loop thread for the shard that owns the bot; calls
//! for the same bot never interleave.

use std::time::Duration;

use pacer_core::schedule::PhaseRunner;
use pacer_core::types::{BotId, DurableFields, Role};

/// Everything the pacing layer needs from the host, on top of the phase
/// callables of [`PhaseRunner`].
///
/// The class-specific combat rotation and the humanization behavior manager
/// are bound on the host side: from here they are just two of the eight
/// phase callables.
pub trait HostHooks: PhaseRunner {
    /// Stable identity of `bot` within this process.
    fn bot_id(&self, bot: &Self::Bot) -> BotId;

    /// The bot's current lifestyle role, owned by the humanization layer.
    ///
    /// Read anew at every decision point; PACER stores no authoritative
    /// copy.
    fn role_of(&self, bot: &Self::Bot) -> Role;

    /// Set the bot's next-save countdown on the host side. Idempotent.
    fn arm_save_countdown(&mut self, bot: &Self::Bot, countdown: Duration);

    /// Read-only capture of the bot's durable fields for snapshotting.
    ///
    /// Return `None` when the data cannot be formed (bot mid-teardown,
    /// storage proxy missing); the save controller then fails open.
    fn capture_durable_fields(&self, bot: &Self::Bot) -> Option<DurableFields>;
}
