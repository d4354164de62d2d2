//! Inclusive operating windows for each measured quantity.

use serde::{Deserialize, Serialize};

/// Closed interval `[min, max]`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

/// Current and temperature windows for one phase.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseLimits {
    pub current: Range,
    pub temperature: Range,
}

/// Every bound is optional when deserializing; missing ones keep their
/// default value.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "LimitsOverlay")]
pub struct Limits {
    /// Applies in both phases.
    pub voltage: Range,
    pub charging: PhaseLimits,
    pub discharging: PhaseLimits,
    pub soc: Range,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            voltage: Range::new(2.50, 4.20),
            charging: PhaseLimits {
                current: Range::new(0.00, 20.00),
                temperature: Range::new(0.00, 45.00),
            },
            discharging: PhaseLimits {
                current: Range::new(0.00, 120.00),
                temperature: Range::new(-20.00, 60.00),
            },
            soc: Range::new(0.20, 0.80),
        }
    }
}

#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RangeOverlay {
    min: Option<f64>,
    max: Option<f64>,
}

impl RangeOverlay {
    fn over(self, base: Range) -> Range {
        Range::new(self.min.unwrap_or(base.min), self.max.unwrap_or(base.max))
    }
}

#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PhaseOverlay {
    current: RangeOverlay,
    temperature: RangeOverlay,
}

impl PhaseOverlay {
    fn over(self, base: PhaseLimits) -> PhaseLimits {
        PhaseLimits {
            current: self.current.over(base.current),
            temperature: self.temperature.over(base.temperature),
        }
    }
}

#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LimitsOverlay {
    voltage: RangeOverlay,
    charging: PhaseOverlay,
    discharging: PhaseOverlay,
    soc: RangeOverlay,
}

impl From<LimitsOverlay> for Limits {
    fn from(overlay: LimitsOverlay) -> Self {
        let base = Limits::default();
        Self {
            voltage: overlay.voltage.over(base.voltage),
            charging: overlay.charging.over(base.charging),
            discharging: overlay.discharging.over(base.discharging),
            soc: overlay.soc.over(base.soc),
        }
    }
}
