//! Integration tests — end-to-end pacing flows against a simulated host.
//!
//! Each test drives a [`BotDriver`] through the same hook sequence the real
//! game loop would use: tick, save opportunity, completed save, teardown.

use std::time::Duration;

use pacer_core::config::{IntervalConfig, PacerConfig};
use pacer_core::phase::{Phase, PhaseControl};
use pacer_core::schedule::TickOutcome;
use pacer_core::tier::Tier;
use pacer_core::types::Role;
use pacer_host::driver::BotDriver;
use pacer_host::sim::{SimBot, SimHost};

fn driver() -> BotDriver {
    BotDriver::new(&PacerConfig::default())
}

// ---------------------------------------------------------------------------
// Scenario: resting bot skips saves
// ---------------------------------------------------------------------------

#[test]
fn resting_bot_skips_saves() {
    let driver = driver();
    let mut host = SimHost::new();
    let mut bot = SimBot::new(Role::Resting);

    // Explicit transition to minimal re-arms with the 30-minute interval.
    driver.on_tier_transition(&mut host, &bot, Tier::Minimal);
    assert_eq!(
        host.last_armed(),
        Some((bot.id, Duration::from_millis(1_800_000)))
    );

    // A tick at minimal runs the safety callable and nothing else.
    driver.tick_bot(&mut host, &mut bot);
    assert_eq!(host.count(Phase::Safety), 1);
    for phase in Phase::ORDERED.into_iter().skip(1) {
        assert_eq!(host.count(phase), 0, "{phase} must not run at minimal");
    }

    // Establish a snapshot, then an unchanged bot defers.
    driver.on_save_completed(&host, &bot);
    assert!(!driver.should_save(&host, &bot));

    // A zone change is a meaningful durable event.
    bot.fields.zone_id = 85;
    assert!(driver.should_save(&host, &bot));

    // After the save completes, quiet again.
    driver.on_save_completed(&host, &bot);
    assert!(!driver.should_save(&host, &bot));
}

// ---------------------------------------------------------------------------
// Scenario: grinding bot runs the full pipeline
// ---------------------------------------------------------------------------

#[test]
fn grinding_bot_runs_full_pipeline() {
    let driver = driver();
    let mut host = SimHost::new();
    let mut bot = SimBot::new(Role::Grinding);

    let report = driver.tick_bot(&mut host, &mut bot);
    assert_eq!(report.tier, Tier::Full);
    assert_eq!(report.outcome, TickOutcome::Completed);
    assert_eq!(host.phase_trace, Phase::ORDERED.to_vec());

    driver.on_tier_transition(&mut host, &bot, Tier::Full);
    assert_eq!(
        host.last_armed(),
        Some((bot.id, Duration::from_millis(300_000)))
    );
}

// ---------------------------------------------------------------------------
// Scenario: traveling bot — movement yes, combat no
// ---------------------------------------------------------------------------

#[test]
fn traveling_bot_gets_movement_but_not_combat() {
    let driver = driver();
    let mut host = SimHost::new();
    let mut bot = SimBot::new(Role::Traveling);

    driver.tick_bot(&mut host, &mut bot);

    assert_eq!(
        host.phase_trace,
        vec![
            Phase::Safety,
            Phase::Movement,
            Phase::BuffsAndDefensives,
            Phase::HumanizationBehavior,
        ]
    );
    assert_eq!(host.count(Phase::CombatTargeting), 0);
    assert_eq!(host.count(Phase::CombatRotation), 0);
    assert_eq!(host.count(Phase::StrategyEvaluation), 0);
    assert_eq!(host.count(Phase::Triggers), 0);
}

// ---------------------------------------------------------------------------
// Scenario: inventory permutation does not trigger a save
// ---------------------------------------------------------------------------

#[test]
fn inventory_permutation_does_not_trigger_save() {
    let driver = driver();
    let host = SimHost::new();
    let mut bot = SimBot::new(Role::CityLife);
    bot.fields.equipped_item_ids = vec![101, 202, 303];

    driver.on_save_completed(&host, &bot);

    bot.fields.equipped_item_ids = vec![303, 101, 202];
    assert!(!driver.should_save(&host, &bot));
}

// ---------------------------------------------------------------------------
// Scenario: level-up triggers a save even on a minimal bot
// ---------------------------------------------------------------------------

#[test]
fn level_up_triggers_save_on_minimal_bot() {
    let driver = driver();
    let mut host = SimHost::new();
    let mut bot = SimBot::new(Role::Idle);

    driver.tick_bot(&mut host, &mut bot);
    driver.on_save_completed(&host, &bot);
    assert!(!driver.should_save(&host, &bot));

    bot.fields.level = 43;
    assert!(driver.should_save(&host, &bot));
}

// ---------------------------------------------------------------------------
// Scenario: tier change re-arms even without a save
// ---------------------------------------------------------------------------

#[test]
fn tier_change_rearms_without_save() {
    let driver = driver();
    let mut host = SimHost::new();
    let mut bot = SimBot::new(Role::Resting);

    // First tick observes minimal and arms the initial countdown.
    driver.tick_bot(&mut host, &mut bot);
    assert_eq!(
        host.last_armed(),
        Some((bot.id, Duration::from_millis(1_800_000)))
    );
    let arms_before = host.armed.len();

    // Role flips to traveling; the next tick detects the transition.
    bot.role = Role::Traveling;
    driver.tick_bot(&mut host, &mut bot);
    assert_eq!(
        host.last_armed(),
        Some((bot.id, Duration::from_millis(900_000)))
    );
    assert_eq!(host.armed.len(), arms_before + 1);

    // Same tier again: no further re-arm.
    driver.tick_bot(&mut host, &mut bot);
    assert_eq!(host.armed.len(), arms_before + 1);

    // No save decision was ever taken.
    assert_eq!(driver.counters().save_checks, 0);
}

// ---------------------------------------------------------------------------
// First save, fail-open, and teardown flows
// ---------------------------------------------------------------------------

#[test]
fn first_save_opportunity_always_writes() {
    let driver = driver();
    let host = SimHost::new();
    let bot = SimBot::new(Role::Questing);

    assert!(driver.should_save(&host, &bot));
}

#[test]
fn broken_capture_fails_open() {
    let driver = driver();
    let host = SimHost::new();
    let mut bot = SimBot::new(Role::Questing);

    driver.on_save_completed(&host, &bot);
    assert!(!driver.should_save(&host, &bot));

    bot.capture_broken = true;
    assert!(driver.should_save(&host, &bot));
    assert_eq!(driver.counters().fail_open_saves, 1);
}

#[test]
fn failed_save_is_reevaluated_next_opportunity() {
    let driver = driver();
    let host = SimHost::new();
    let mut bot = SimBot::new(Role::Grinding);

    driver.on_save_completed(&host, &bot);
    bot.fields.money += 500;

    // Host asked, was told to save, but the write failed: it must not call
    // on_save_completed. The decision repeats until a save lands.
    assert!(driver.should_save(&host, &bot));
    assert!(driver.should_save(&host, &bot));

    driver.on_save_completed(&host, &bot);
    assert!(!driver.should_save(&host, &bot));
}

#[test]
fn teardown_erases_record() {
    let driver = driver();
    let mut host = SimHost::new();
    let mut bot = SimBot::new(Role::Grinding);

    driver.tick_bot(&mut host, &mut bot);
    driver.on_save_completed(&host, &bot);
    assert_eq!(driver.record_count(), 1);

    assert!(driver.remove(bot.id));
    assert_eq!(driver.record_count(), 0);

    // A returning bot starts from scratch: first save never skipped.
    assert!(driver.should_save(&host, &bot));
}

// ---------------------------------------------------------------------------
// Scheduler edge flows through the driver
// ---------------------------------------------------------------------------

#[test]
fn safety_interrupt_stops_the_tick_after_safety() {
    let driver = driver();
    let mut host = SimHost::new();
    host.safety_control = Some(PhaseControl::EndTick);
    let mut bot = SimBot::new(Role::Grinding);

    let report = driver.tick_bot(&mut host, &mut bot);
    assert_eq!(report.outcome, TickOutcome::SafetyInterrupt);
    assert_eq!(host.phase_trace, vec![Phase::Safety]);

    // The persistence decision is still offered afterwards.
    assert!(driver.should_save(&host, &bot));
}

#[test]
fn phase_failure_is_contained() {
    let driver = driver();
    let mut host = SimHost::new();
    host.failing_phase = Some(Phase::StrategyEvaluation);
    let mut bot = SimBot::new(Role::Dungeon);

    let report = driver.tick_bot(&mut host, &mut bot);
    assert_eq!(report.outcome, TickOutcome::Completed);
    // The failing phase was invoked, and later phases still ran.
    assert_eq!(host.count(Phase::StrategyEvaluation), 1);
    assert_eq!(host.count(Phase::Triggers), 1);
    assert_eq!(driver.counters().phase_failures, 1);
}

#[test]
fn unknown_role_runs_full_pipeline() {
    let driver = driver();
    let mut host = SimHost::new();
    let mut bot = SimBot::new(Role::Unknown);

    let report = driver.tick_bot(&mut host, &mut bot);
    assert_eq!(report.tier, Tier::Full);
    assert_eq!(host.phase_trace.len(), 8);
    assert_eq!(driver.counters().unknown_roles, 1);
}

// ---------------------------------------------------------------------------
// Runtime interval reconfiguration
// ---------------------------------------------------------------------------

#[test]
fn interval_reload_applies_at_next_transition() {
    let driver = driver();
    let mut host = SimHost::new();
    let mut bot = SimBot::new(Role::Resting);

    driver.tick_bot(&mut host, &mut bot);
    assert_eq!(
        host.last_armed(),
        Some((bot.id, Duration::from_millis(1_800_000)))
    );

    driver.set_intervals(IntervalConfig {
        minimal_interval_ms: 600_000,
        ..IntervalConfig::default()
    });

    // Still minimal: the armed countdown is untouched.
    driver.tick_bot(&mut host, &mut bot);
    assert_eq!(
        host.last_armed(),
        Some((bot.id, Duration::from_millis(1_800_000)))
    );

    // Leave and re-enter minimal: the new table applies.
    bot.role = Role::Grinding;
    driver.tick_bot(&mut host, &mut bot);
    bot.role = Role::Resting;
    driver.tick_bot(&mut host, &mut bot);
    assert_eq!(
        host.last_armed(),
        Some((bot.id, Duration::from_millis(600_000)))
    );
}

// ---------------------------------------------------------------------------
// Multi-bot bookkeeping
// ---------------------------------------------------------------------------

#[test]
fn bots_are_tracked_independently() {
    let driver = driver();
    let mut host = SimHost::new();
    let mut grinder = SimBot::new(Role::Grinding);
    let mut rester = SimBot::new(Role::Resting);

    driver.tick_bot(&mut host, &mut grinder);
    driver.tick_bot(&mut host, &mut rester);

    driver.on_save_completed(&host, &grinder);
    driver.on_save_completed(&host, &rester);

    // Only the grinder loots something.
    grinder.fields.money += 1_000;
    assert!(driver.should_save(&host, &grinder));
    assert!(!driver.should_save(&host, &rester));

    let window = driver.tier_window();
    assert_eq!(window.full, 1);
    assert_eq!(window.minimal, 1);
    assert_eq!(driver.record_count(), 2);
}
