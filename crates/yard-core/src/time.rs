//! Simulated time and run configuration.
//!
//! # Design
//!
//! Time is a monotonically increasing millisecond counter, `SimTime`.  All
//! durations computed by the time model are converted to whole milliseconds
//! (truncated) before they are added to the clock, so event arithmetic is
//! exact integer arithmetic and comparisons are O(1).

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::equipment::{EquipmentKind, KinematicProfile};
use crate::{YardError, YardResult};

// ── SimTime ──────────────────────────────────────────────────────────────────

/// An absolute simulated timestamp in milliseconds since run start.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);

    /// Convert fractional seconds to milliseconds, rounding toward zero.
    /// Negative and non-finite inputs map to zero.
    #[inline]
    pub fn from_secs_f64(secs: f64) -> SimTime {
        if !secs.is_finite() || secs <= 0.0 {
            return SimTime::ZERO;
        }
        SimTime((secs * 1000.0) as u64)
    }

    #[inline]
    pub fn as_millis(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Return the timestamp `ms` milliseconds after `self`.
    #[inline]
    pub fn offset(self, ms: u64) -> SimTime {
        SimTime(self.0.saturating_add(ms))
    }

    /// Milliseconds elapsed from `earlier` to `self` (zero if `earlier` is later).
    #[inline]
    pub fn since(self, earlier: SimTime) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<SimTime> for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, rhs: SimTime) -> SimTime {
        SimTime(self.0.saturating_add(rhs.0))
    }
}

impl std::ops::Add<u64> for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, rhs: u64) -> SimTime {
        self.offset(rhs)
    }
}

impl std::ops::Sub for SimTime {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: SimTime) -> u64 {
        self.since(rhs)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}s", self.0 / 1000, self.0 % 1000)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

fn default_time_step() -> u64 {
    1_000
}

fn default_backoff() -> u64 {
    5_000
}

fn default_true() -> bool {
    true
}

/// Top-level simulation configuration, usually read from a JSON file by the
/// command-line front end.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimConfig {
    /// Simulated duration bound in milliseconds.  The loop stops once the
    /// clock reaches it.
    pub duration_ms: u64,

    /// Stop after this many processed events.  `None` means unbounded.
    #[serde(default)]
    pub max_events: Option<u64>,

    /// Spacing between generated tasks' timestamps.
    #[serde(default = "default_time_step")]
    pub time_step_ms: u64,

    /// Master RNG seed.  The same seed always produces identical runs.
    #[serde(default)]
    pub seed: u64,

    #[serde(default)]
    pub map_file: Option<PathBuf>,

    #[serde(default)]
    pub entity_file: Option<PathBuf>,

    #[serde(default)]
    pub task_file: Option<PathBuf>,

    /// Where the event log is written after the run, if anywhere.
    #[serde(default)]
    pub event_log_file: Option<PathBuf>,

    /// Reserve route segments through the occupancy engine before each move.
    #[serde(default)]
    pub reserve_paths: bool,

    /// Back-off duration of the WAIT instruction injected after a
    /// reservation conflict; also the default duration of WAIT instructions.
    #[serde(default = "default_backoff")]
    pub backoff_ms: u64,

    /// Ask the decision module for work for every idle entity when a fresh
    /// run starts.
    #[serde(default = "default_true")]
    pub auto_dispatch: bool,

    /// Number of instructions to synthesise with the random task generator.
    #[serde(default)]
    pub generated_tasks: usize,

    /// Per-kind kinematic profile overrides.
    #[serde(default)]
    pub profiles: BTreeMap<EquipmentKind, KinematicProfile>,

    /// Free-form parameter bag for pluggable strategies.
    #[serde(default)]
    pub parameters: BTreeMap<String, serde_json::Value>,
}

impl SimConfig {
    /// A configuration bounded only by `duration_ms`, everything else default.
    pub fn with_duration(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            max_events:      None,
            time_step_ms:    default_time_step(),
            seed:            0,
            map_file:        None,
            entity_file:     None,
            task_file:       None,
            event_log_file:  None,
            reserve_paths:   false,
            backoff_ms:      default_backoff(),
            auto_dispatch:   true,
            generated_tasks: 0,
            profiles:        BTreeMap::new(),
            parameters:      BTreeMap::new(),
        }
    }

    /// The timestamp at which the run ends.
    #[inline]
    pub fn end_time(&self) -> SimTime {
        SimTime(self.duration_ms)
    }

    /// Read a configuration from a JSON file.
    ///
    /// Relative file paths inside the configuration are resolved against the
    /// configuration file's directory.
    pub fn from_json_path(path: &Path) -> YardResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut config: SimConfig = serde_json::from_str(&text).map_err(|source| {
            YardError::Json { path: path.to_path_buf(), source }
        })?;
        if let Some(base) = path.parent() {
            for file in [
                &mut config.map_file,
                &mut config.entity_file,
                &mut config.task_file,
                &mut config.event_log_file,
            ]
            .into_iter()
            .flatten()
            {
                if file.is_relative() {
                    *file = base.join(&*file);
                }
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine cannot run.
    pub fn validate(&self) -> YardResult<()> {
        if self.time_step_ms == 0 {
            return Err(YardError::Config("timeStepMs must be positive".into()));
        }
        if self.max_events == Some(0) {
            return Err(YardError::Config("maxEvents must be positive when set".into()));
        }
        if self.reserve_paths && self.backoff_ms == 0 {
            return Err(YardError::Config("backoffMs must be positive when reservePaths is set".into()));
        }
        for (kind, profile) in &self.profiles {
            if !profile.is_valid() {
                return Err(YardError::Config(format!("invalid {kind} kinematic profile")));
            }
        }
        Ok(())
    }

    /// Look up a numeric entry of the free-form parameter bag.
    pub fn parameter_f64(&self, key: &str) -> Option<f64> {
        self.parameters.get(key).and_then(serde_json::Value::as_f64)
    }
}
