//! Operation-duration constants.

use serde::{Deserialize, Serialize};

use yard_core::{SimConfig, YardError, YardResult};

/// Constants of [`KinematicTimeModel`](crate::KinematicTimeModel).
///
/// Read from the `"timing"` entry of `SimConfig::parameters`; every field is
/// optional there and falls back to the values below.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimingConfig {
    /// Fixed part of a quay-crane lift, seconds.
    pub qc_base_secs:          f64,
    /// Hoist speed used for the up-and-down part of a quay-crane lift, m/s.
    pub qc_hoist_speed:        f64,
    /// Lift height when the instruction has no `liftHeight`, metres.
    pub default_lift_height_m: f64,
    /// Fixed part of a yard-crane lift, seconds.
    pub yc_base_secs:          f64,
    /// Extra seconds per tier of the stack position.
    pub yc_secs_per_tier:      f64,
    /// Tier when the instruction has no `targetTier`.
    pub default_target_tier:   f64,
    /// How long a truck is occupied by a handover, seconds.  The instruction
    /// parameter `occupationTime` overrides it.
    pub it_occupation_secs:    f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            qc_base_secs:          60.0,
            qc_hoist_speed:        1.5,
            default_lift_height_m: 25.0,
            yc_base_secs:          45.0,
            yc_secs_per_tier:      15.0,
            default_target_tier:   2.0,
            it_occupation_secs:    30.0,
        }
    }
}

impl TimingConfig {
    /// The `"timing"` section of `config.parameters`, or the defaults.
    pub fn from_sim_config(config: &SimConfig) -> YardResult<Self> {
        let Some(value) = config.parameters.get("timing") else {
            return Ok(Self::default());
        };
        let timing: TimingConfig = serde_json::from_value(value.clone())
            .map_err(|e| YardError::Config(format!("invalid timing parameters: {e}")))?;
        if timing.qc_hoist_speed <= 0.0 || !timing.qc_hoist_speed.is_finite() {
            return Err(YardError::Config("timing.qcHoistSpeed must be positive".into()));
        }
        Ok(timing)
    }
}
