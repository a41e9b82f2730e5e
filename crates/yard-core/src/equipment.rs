//! Equipment kinds and their kinematic profiles.
//!
//! Per-kind behaviour is a lookup keyed by [`EquipmentKind`] rather than a
//! trait object per entity: quay cranes are slow and heavy, yard cranes sit in
//! the middle, internal trucks are fast and light.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The three kinds of equipment the yard simulates.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[derive(Serialize, Deserialize)]
pub enum EquipmentKind {
    /// Quay crane.
    #[serde(rename = "QC")]
    Qc,
    /// Yard crane.
    #[serde(rename = "YC")]
    Yc,
    /// Internal truck.
    #[serde(rename = "IT")]
    It,
}

impl EquipmentKind {
    pub const ALL: [EquipmentKind; 3] = [EquipmentKind::Qc, EquipmentKind::Yc, EquipmentKind::It];

    /// `true` for quay and yard cranes.
    #[inline]
    pub fn is_crane(self) -> bool {
        matches!(self, EquipmentKind::Qc | EquipmentKind::Yc)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EquipmentKind::Qc => "QC",
            EquipmentKind::Yc => "YC",
            EquipmentKind::It => "IT",
        }
    }
}

impl fmt::Display for EquipmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maximum speed (m/s), acceleration and deceleration (m/s²).
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KinematicProfile {
    pub max_speed:    f64,
    pub acceleration: f64,
    pub deceleration: f64,
}

impl KinematicProfile {
    pub const fn new(max_speed: f64, acceleration: f64, deceleration: f64) -> Self {
        Self { max_speed, acceleration, deceleration }
    }

    /// Built-in defaults for each kind.
    pub const fn default_for(kind: EquipmentKind) -> Self {
        match kind {
            EquipmentKind::Qc => Self::new(0.75, 0.3, 0.3),
            EquipmentKind::Yc => Self::new(2.0, 0.4, 0.5),
            EquipmentKind::It => Self::new(6.0, 0.8, 1.2),
        }
    }

    /// All components finite and non-negative.  Zero values are allowed; the
    /// time model treats them as a degenerate profile.
    pub fn is_valid(&self) -> bool {
        [self.max_speed, self.acceleration, self.deceleration]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }
}
