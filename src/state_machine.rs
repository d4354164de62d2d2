//! Supervisory state machine: a fixed transition table and a single `fire`
//! entry point.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TransitionError;
use crate::mode::{Mode, Trigger};

/// One applied transition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: Mode,
    pub trigger: Trigger,
    pub to: Mode,
}

// (source, trigger, destination)
const TRANSITIONS: [(Mode, Trigger, Mode); 45] = [
    (Mode::Idle, Trigger::StartCharging, Mode::Charging),
    (Mode::Idle, Trigger::StartDischarging, Mode::Discharging),
    (Mode::Idle, Trigger::VoltageHighWarning, Mode::OverVoltage),
    (Mode::Idle, Trigger::VoltageLowWarning, Mode::UnderVoltage),
    (Mode::Idle, Trigger::TemperatureHighWarning, Mode::OverTemperature),
    (Mode::Idle, Trigger::TemperatureLowWarning, Mode::UnderTemperature),
    (Mode::Idle, Trigger::CurrentHighWarning, Mode::OverCurrent),
    (Mode::Idle, Trigger::SocLowWarning, Mode::SocLow),
    (Mode::Idle, Trigger::SocHighWarning, Mode::SocHigh),
    (Mode::Idle, Trigger::StartFault, Mode::Fault),
    (Mode::Charging, Trigger::ChargeComplete, Mode::Idle),
    (Mode::Charging, Trigger::VoltageHighWarning, Mode::OverVoltage),
    (Mode::Charging, Trigger::TemperatureHighWarning, Mode::OverTemperature),
    (Mode::Charging, Trigger::CurrentHighWarning, Mode::OverCurrent),
    (Mode::Charging, Trigger::ChargingFault, Mode::Fault),
    (Mode::Discharging, Trigger::DischargingComplete, Mode::Idle),
    (Mode::Discharging, Trigger::VoltageHighWarning, Mode::OverVoltage),
    (Mode::Discharging, Trigger::VoltageLowWarning, Mode::UnderVoltage),
    (Mode::Discharging, Trigger::TemperatureHighWarning, Mode::OverTemperature),
    (Mode::Discharging, Trigger::CurrentHighWarning, Mode::OverCurrent),
    (Mode::Discharging, Trigger::DischargingFault, Mode::Fault),
    (Mode::OverVoltage, Trigger::VoltageSafe, Mode::Idle),
    (Mode::OverVoltage, Trigger::StartDischarging, Mode::Discharging),
    (Mode::OverVoltage, Trigger::VoltagePersistentHigh, Mode::Fault),
    (Mode::UnderVoltage, Trigger::VoltageSafe, Mode::Idle),
    (Mode::UnderVoltage, Trigger::StartCharging, Mode::Charging),
    (Mode::UnderVoltage, Trigger::VoltagePersistentLow, Mode::Fault),
    (Mode::OverCurrent, Trigger::CurrentSafe, Mode::Idle),
    (Mode::OverCurrent, Trigger::ResumeCharging, Mode::Charging),
    (Mode::OverCurrent, Trigger::ResumeDischarging, Mode::Discharging),
    (Mode::OverCurrent, Trigger::CurrentPersistentHigh, Mode::Fault),
    (Mode::OverTemperature, Trigger::TemperatureSafe, Mode::Idle),
    (Mode::OverTemperature, Trigger::ResumeCharging, Mode::Charging),
    (Mode::OverTemperature, Trigger::ResumeDischarging, Mode::Discharging),
    (Mode::OverTemperature, Trigger::TemperaturePersistentHigh, Mode::Fault),
    (Mode::UnderTemperature, Trigger::TemperatureSafe, Mode::Idle),
    (Mode::UnderTemperature, Trigger::ResumeCharging, Mode::Charging),
    (Mode::UnderTemperature, Trigger::TemperaturePersistentLow, Mode::Fault),
    (Mode::SocLow, Trigger::SocSafe, Mode::Idle),
    (Mode::SocLow, Trigger::StartCharging, Mode::Charging),
    (Mode::SocLow, Trigger::SocLowPersistent, Mode::Fault),
    (Mode::SocHigh, Trigger::SocSafe, Mode::Idle),
    (Mode::SocHigh, Trigger::StartDischarging, Mode::Discharging),
    (Mode::SocHigh, Trigger::SocHighPersistent, Mode::Fault),
    (Mode::Fault, Trigger::ResetFault, Mode::Idle),
];

/// Immutable (mode, trigger) -> destination mapping.
#[derive(Debug, Clone)]
pub struct TransitionTable {
    edges: HashMap<(Mode, Trigger), Mode>,
}

impl TransitionTable {
    pub fn standard() -> Self {
        Self {
            edges: TRANSITIONS
                .iter()
                .map(|&(from, trigger, to)| ((from, trigger), to))
                .collect(),
        }
    }

    pub fn destination(&self, from: Mode, trigger: Trigger) -> Option<Mode> {
        self.edges.get(&(from, trigger)).copied()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// All transitions in table order.
    pub fn iter(&self) -> impl Iterator<Item = Transition> + '_ {
        TRANSITIONS
            .iter()
            .map(|&(from, trigger, to)| Transition { from, trigger, to })
    }
}

/// Holds the current mode. The mode only changes through `fire`.
#[derive(Debug, Clone)]
pub struct StateMachine {
    table: TransitionTable,
    state: Mode,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            table: TransitionTable::standard(),
            state: Mode::Idle,
        }
    }

    pub fn current(&self) -> Mode {
        self.state
    }

    /// Apply `trigger` to the current mode. On failure the mode is unchanged.
    pub fn fire(&mut self, trigger: Trigger) -> Result<Mode, TransitionError> {
        self.fire_traced(trigger).map(|t| t.to)
    }

    /// Like `fire`, but returns the full transition record.
    pub fn fire_traced(&mut self, trigger: Trigger) -> Result<Transition, TransitionError> {
        let from = self.state;
        let to = self
            .table
            .destination(from, trigger)
            .ok_or(TransitionError::NoSuchTransition {
                state: from,
                trigger,
            })?;
        self.state = to;
        debug!(%from, ?trigger, %to, "transition");
        Ok(Transition { from, trigger, to })
    }

    /// Triggers accepted from `mode`, in table order.
    pub fn transitions_from(&self, mode: Mode) -> Vec<(Trigger, Mode)> {
        self.table
            .iter()
            .filter(|t| t.from == mode)
            .map(|t| (t.trigger, t.to))
            .collect()
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}
