//! Sample classification: SOC integration, range checks, escalation and
//! idle-normalized transitions.
//!
//! Every sample produces exactly one applied trigger. If the machine is not
//! idle, it is first returned to `Idle`, so anomaly-to-anomaly moves always
//! pass through the hub state.

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::config::BmsConfig;
use crate::error::TransitionError;
use crate::limits::Range;
use crate::mode::{Mode, Trigger};
use crate::sample::Sample;
use crate::state_machine::{StateMachine, Transition};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Charging,
    Discharging,
}

impl Phase {
    /// Trigger used when every reading is in range.
    fn normal_trigger(self) -> Trigger {
        match self {
            Phase::Charging => Trigger::StartCharging,
            Phase::Discharging => Trigger::StartDischarging,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    Voltage,
    Current,
    Temperature,
    Soc,
}

/// Result of one range predicate.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RangeCheck {
    pub quantity: Quantity,
    pub value: f64,
    pub range: Range,
    pub inside: bool,
}

impl RangeCheck {
    fn evaluate(quantity: Quantity, value: f64, range: Range) -> Self {
        Self {
            quantity,
            value,
            range,
            inside: range.contains(value),
        }
    }

    /// Warning trigger for this check failing on its own.
    fn warning_trigger(&self) -> Trigger {
        let high = self.value > self.range.max;
        match self.quantity {
            Quantity::Voltage if high => Trigger::VoltageHighWarning,
            Quantity::Voltage => Trigger::VoltageLowWarning,
            // No low-current warning exists in the table.
            Quantity::Current => Trigger::CurrentHighWarning,
            Quantity::Temperature if self.value < self.range.min => Trigger::TemperatureLowWarning,
            Quantity::Temperature => Trigger::TemperatureHighWarning,
            Quantity::Soc if self.value < self.range.min => Trigger::SocLowWarning,
            Quantity::Soc => Trigger::SocHighWarning,
        }
    }
}

/// Pick the trigger for a set of checks evaluated in voltage, current,
/// temperature, SOC order.
///
/// No failures: the phase's normal trigger. One failure: that quantity's
/// warning. Two or more: `StartFault`.
pub fn escalate(checks: &[RangeCheck], phase: Phase) -> Trigger {
    let mut failed = checks.iter().filter(|c| !c.inside);
    match (failed.next(), failed.next()) {
        (None, _) => phase.normal_trigger(),
        (Some(only), None) => only.warning_trigger(),
        (Some(_), Some(_)) => Trigger::StartFault,
    }
}

/// Everything observable about one classified sample.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationOutcome {
    pub sample: Sample,
    pub phase: Phase,
    /// SOC after integrating this sample.
    pub soc: f64,
    pub checks: [RangeCheck; 4],
    pub anomaly_count: usize,
    pub trigger: Trigger,
    /// Step back to `Idle` taken before `trigger`, if the machine was not idle.
    pub idle_return: Option<Transition>,
    pub transition: Transition,
    pub mode: Mode,
}

impl ClassificationOutcome {
    /// `<mode>--------<sample line>`, the per-sample trace line.
    pub fn step_line(&self) -> String {
        format!("{}--------{}", self.mode, self.sample.to_line())
    }
}

/// Per-pack classification state. One session owns one state machine.
#[derive(Debug)]
pub struct ClassifierSession {
    machine: StateMachine,
    config: BmsConfig,
    soc: f64,
    samples_seen: u64,
    aborted: bool,
}

impl ClassifierSession {
    pub fn new(config: BmsConfig) -> Self {
        Self {
            soc: config.soc.initial,
            machine: StateMachine::new(),
            config,
            samples_seen: 0,
            aborted: false,
        }
    }

    pub fn soc(&self) -> f64 {
        self.soc
    }

    pub fn previous_mode(&self) -> Mode {
        self.machine.current()
    }

    /// Classify one sample and apply the chosen trigger.
    ///
    /// A `TransitionError` aborts the session; every later call returns
    /// `TransitionError::SessionAborted`.
    pub fn classify(
        &mut self,
        sample: &Sample,
        phase: Phase,
    ) -> Result<ClassificationOutcome, TransitionError> {
        if self.aborted {
            return Err(TransitionError::SessionAborted);
        }

        self.integrate(sample, phase);
        let checks = self.range_checks(sample, phase);
        let anomaly_count = checks.iter().filter(|c| !c.inside).count();
        let trigger = escalate(&checks, phase);
        self.samples_seen += 1;

        let (idle_return, transition) = match self.apply(trigger) {
            Ok(applied) => applied,
            Err(e) => {
                self.aborted = true;
                error!(index = sample.index, error = %e, "session aborted");
                return Err(e);
            }
        };

        match transition.to {
            Mode::Fault => error!(index = sample.index, anomaly_count, "fault entered"),
            mode if mode.is_warning() => warn!(index = sample.index, %mode, "out-of-range reading"),
            _ => {}
        }

        Ok(ClassificationOutcome {
            sample: sample.clone(),
            phase,
            soc: self.soc,
            checks,
            anomaly_count,
            trigger,
            idle_return,
            transition,
            mode: transition.to,
        })
    }

    fn integrate(&mut self, sample: &Sample, phase: Phase) {
        let delta = self.config.soc.delta(sample.current, sample.capacity);
        self.soc = match phase {
            Phase::Charging => self.soc + delta,
            Phase::Discharging => (self.soc - delta).max(self.config.soc.floor),
        };
    }

    fn range_checks(&self, sample: &Sample, phase: Phase) -> [RangeCheck; 4] {
        let limits = &self.config.limits;
        let window = match phase {
            Phase::Charging => &limits.charging,
            Phase::Discharging => &limits.discharging,
        };

        let mut soc = RangeCheck::evaluate(Quantity::Soc, self.soc, limits.soc);
        // SOC has not been measured before the first sample.
        if self.samples_seen == 0 {
            soc.inside = true;
        }

        [
            RangeCheck::evaluate(Quantity::Voltage, sample.voltage, limits.voltage),
            RangeCheck::evaluate(Quantity::Current, sample.current, window.current),
            RangeCheck::evaluate(Quantity::Temperature, sample.temperature, window.temperature),
            soc,
        ]
    }

    fn apply(
        &mut self,
        trigger: Trigger,
    ) -> Result<(Option<Transition>, Transition), TransitionError> {
        let idle_return = match self.machine.current().idle_return_trigger() {
            Some(back) => Some(self.machine.fire_traced(back)?),
            None => None,
        };
        let transition = self.machine.fire_traced(trigger)?;
        Ok((idle_return, transition))
    }
}
