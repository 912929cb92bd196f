//! Configuration for the PACER pacing system.
//!
//! Maps directly to `pacer.toml`. Only the `[intervals]` table affects core
//! behavior; `[telemetry]` tunes diagnostics.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::tier::Tier;

/// Top-level PACER configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PacerConfig {
    /// Save countdown intervals per budget tier.
    #[serde(default)]
    pub intervals: IntervalConfig,
    /// Observability-only settings.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl PacerConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `PacerError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::PacerError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// The save interval table: `Tier → countdown duration`, in milliseconds.
///
/// Read-mostly; the save controller keeps the live copy behind an `RwLock`
/// and replacements take effect at the next tier transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalConfig {
    /// Countdown when the tier is `Full`.
    #[serde(default = "default_full_interval")]
    pub full_interval_ms: u64,
    /// Countdown when the tier is `Reduced`.
    #[serde(default = "default_reduced_interval")]
    pub reduced_interval_ms: u64,
    /// Countdown when the tier is `Minimal`.
    #[serde(default = "default_minimal_interval")]
    pub minimal_interval_ms: u64,
}

impl IntervalConfig {
    /// The countdown duration for `tier`.
    #[must_use]
    pub fn interval_for(&self, tier: Tier) -> Duration {
        let ms = match tier {
            Tier::Full => self.full_interval_ms,
            Tier::Reduced => self.reduced_interval_ms,
            Tier::Minimal => self.minimal_interval_ms,
        };
        Duration::from_millis(ms)
    }
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self {
            full_interval_ms: 300_000,
            reduced_interval_ms: 900_000,
            minimal_interval_ms: 1_800_000,
        }
    }
}

/// Diagnostics tuning. Nothing here changes scheduling or save semantics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Budget fed to the tick monitor, in milliseconds per bot tick.
    #[serde(default = "default_tick_budget")]
    pub tick_budget_ms: f64,
    /// Log a debug line when an unmapped role name is classified.
    #[serde(default = "default_true")]
    pub log_unknown_roles: bool,
    /// Log a debug line when a tick exceeds the budget.
    #[serde(default = "default_true")]
    pub log_slow_ticks: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            tick_budget_ms: 1.0,
            log_unknown_roles: true,
            log_slow_ticks: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_tick_budget() -> f64 { 1.0 }
fn default_full_interval() -> u64 { 300_000 }
fn default_reduced_interval() -> u64 { 900_000 }
fn default_minimal_interval() -> u64 { 1_800_000 }
