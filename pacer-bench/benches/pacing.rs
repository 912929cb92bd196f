//! PACER benchmark suite.
//!
//! CI-enforced performance targets:
//!   role_classification ............. < 5ns
//!   snapshot_capture_and_compare .... < 5μs
//!   save_decision_unchanged ......... < 10μs
//!   tick_full_tier .................. < 5μs
//!   tick_sweep_1000_mixed_bots ...... < 5ms

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use pacer_core::config::PacerConfig;
use pacer_core::snapshot::SaveSnapshot;
use pacer_core::tier::classify;
use pacer_core::types::{DurableFields, QuestProgress, QuestStatus, Role};
use pacer_host::driver::BotDriver;
use pacer_host::sim::{SimBot, SimHost};

fn make_fields(seed: u32) -> DurableFields {
    DurableFields {
        level: 40 + seed % 20,
        xp: seed.wrapping_mul(977),
        money: u64::from(seed) * 31,
        zone_id: seed % 100,
        equipped_item_ids: (0..16).map(|i| seed.wrapping_add(i * 13)).collect(),
        active_quests: (0..20)
            .map(|i| QuestProgress {
                quest_id: seed.wrapping_add(i * 7),
                status: if i % 3 == 0 {
                    QuestStatus::Complete
                } else {
                    QuestStatus::Incomplete
                },
            })
            .collect(),
    }
}

/// Benchmark: role → tier classification (target: < 5ns).
fn bench_classification(c: &mut Criterion) {
    c.bench_function("role_classification", |b| {
        b.iter(|| {
            for role in Role::ALL {
                black_box(classify(black_box(role)));
            }
        });
    });
}

/// Benchmark: snapshot capture + equality compare (target: < 5μs).
fn bench_snapshot(c: &mut Criterion) {
    let fields = make_fields(42);
    let stored = SaveSnapshot::capture(&fields);

    c.bench_function("snapshot_capture_and_compare", |b| {
        b.iter(|| {
            let fresh = SaveSnapshot::capture(black_box(&fields));
            black_box(fresh == stored);
        });
    });
}

/// Benchmark: a full save decision against an unchanged bot (target: < 10μs).
fn bench_save_decision(c: &mut Criterion) {
    let driver = BotDriver::new(&PacerConfig::default());
    let host = SimHost::new();
    let bot = SimBot::new(Role::Grinding);
    driver.on_save_completed(&host, &bot);

    c.bench_function("save_decision_unchanged", |b| {
        b.iter(|| {
            black_box(driver.should_save(black_box(&host), black_box(&bot)));
        });
    });
}

/// Benchmark: one full-tier tick through the driver (target: < 5μs).
fn bench_tick_full(c: &mut Criterion) {
    let driver = BotDriver::new(&PacerConfig::default());
    let mut host = SimHost::new();
    let mut bot = SimBot::new(Role::Grinding);

    c.bench_function("tick_full_tier", |b| {
        b.iter(|| {
            black_box(driver.tick_bot(&mut host, &mut bot));
            host.clear_phases();
        });
    });
}

/// Benchmark: ticking 1 000 bots across mixed tiers (target: < 5ms).
fn bench_tick_sweep(c: &mut Criterion) {
    let driver = BotDriver::new(&PacerConfig::default());
    let mut host = SimHost::new();

    let roles = [
        Role::Grinding,
        Role::Questing,
        Role::Traveling,
        Role::CityLife,
        Role::Idle,
        Role::Resting,
    ];
    let mut bots: Vec<SimBot> = (0..1000)
        .map(|i| {
            let mut bot = SimBot::new(roles[i % roles.len()]);
            bot.fields = make_fields(u32::try_from(i).unwrap_or(0));
            bot
        })
        .collect();

    c.bench_function("tick_sweep_1000_mixed_bots", |b| {
        b.iter(|| {
            for bot in &mut bots {
                black_box(driver.tick_bot(&mut host, bot));
            }
            host.clear_phases();
        });
    });
}

criterion_group!(
    benches,
    bench_classification,
    bench_snapshot,
    bench_save_decision,
    bench_tick_full,
    bench_tick_sweep,
);
criterion_main!(benches);
