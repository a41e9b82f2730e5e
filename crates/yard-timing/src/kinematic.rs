//! Default time model: trapezoidal kinematics and per-kind operation times.

use yard_core::{EquipmentKind, KinematicProfile, SimTime};
use yard_fleet::{Entity, Instruction};

use crate::{OperationKind, TimeModel, TimingConfig};

/// Seconds to cover `distance_m` with `profile`, starting and ending at rest.
///
/// A profile with any non-positive component is degenerate and moves at
/// `max(v, 1.0)` m/s throughout.
pub fn movement_secs(profile: &KinematicProfile, distance_m: f64) -> f64 {
    if !distance_m.is_finite() || distance_m <= 0.0 {
        return 0.0;
    }
    let KinematicProfile { max_speed: v, acceleration: a, deceleration: d } = *profile;
    if a <= 0.0 || d <= 0.0 || v <= 0.0 {
        return distance_m / v.max(1.0);
    }

    let acc_dist  = v * v / (2.0 * a);
    let dec_dist  = v * v / (2.0 * d);
    let full_dist = acc_dist + dec_dist;

    if distance_m <= full_dist {
        // Triangular: peak speed never reaches v.
        let peak = (2.0 * a * d * distance_m / (a + d)).sqrt();
        peak / a + peak / d
    } else {
        v / a + (distance_m - full_dist) / v + v / d
    }
}

/// [`TimeModel`] driven by each entity's [`KinematicProfile`] and a
/// [`TimingConfig`].
#[derive(Clone, Debug, Default)]
pub struct KinematicTimeModel {
    pub config: TimingConfig,
}

impl KinematicTimeModel {
    pub fn new(config: TimingConfig) -> Self {
        Self { config }
    }

    fn lift_secs(&self, kind: EquipmentKind, instruction: Option<&Instruction>) -> f64 {
        let param = |key: &str| instruction.and_then(|i| i.param_f64(key));
        match kind {
            EquipmentKind::Qc => {
                let height = param("liftHeight").unwrap_or(self.config.default_lift_height_m);
                self.config.qc_base_secs + 2.0 * height.max(0.0) / self.config.qc_hoist_speed
            }
            EquipmentKind::Yc => {
                let tier = param("targetTier").unwrap_or(self.config.default_target_tier);
                self.config.yc_base_secs + tier.max(0.0) * self.config.yc_secs_per_tier
            }
            // Trucks do not lift; they are occupied for the handover.
            EquipmentKind::It => self.occupation_secs(instruction),
        }
    }

    fn occupation_secs(&self, instruction: Option<&Instruction>) -> f64 {
        instruction
            .and_then(|i| i.param_f64("occupationTime"))
            .unwrap_or(self.config.it_occupation_secs)
    }
}

impl TimeModel for KinematicTimeModel {
    fn movement_time(&self, entity: &Entity, distance_m: f64) -> SimTime {
        SimTime::from_secs_f64(movement_secs(&entity.profile, distance_m))
    }

    fn execution_time(&self, entity: &Entity, op: OperationKind, instruction: Option<&Instruction>) -> SimTime {
        let secs = match op {
            OperationKind::Lift       => self.lift_secs(entity.kind, instruction),
            OperationKind::Occupation => self.occupation_secs(instruction),
        };
        tracing::trace!(entity = %entity.id, %op, secs, "execution time");
        SimTime::from_secs_f64(secs)
    }
}
