//! Operating modes and the triggers that move between them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Operating regime of the pack. Exactly one is active at a time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Idle,
    Charging,
    Discharging,
    OverTemperature,
    UnderTemperature,
    UnderVoltage,
    OverVoltage,
    OverCurrent,
    SocLow,
    SocHigh,
    Fault,
}

impl Mode {
    pub const ALL: [Mode; 11] = [
        Mode::Idle,
        Mode::Charging,
        Mode::Discharging,
        Mode::OverTemperature,
        Mode::UnderTemperature,
        Mode::UnderVoltage,
        Mode::OverVoltage,
        Mode::OverCurrent,
        Mode::SocLow,
        Mode::SocHigh,
        Mode::Fault,
    ];

    /// Trigger that returns this mode to `Idle`; `None` for `Idle` itself.
    pub fn idle_return_trigger(self) -> Option<Trigger> {
        match self {
            Mode::Idle => None,
            Mode::Charging => Some(Trigger::ChargeComplete),
            Mode::Discharging => Some(Trigger::DischargingComplete),
            Mode::OverVoltage | Mode::UnderVoltage => Some(Trigger::VoltageSafe),
            Mode::OverCurrent => Some(Trigger::CurrentSafe),
            Mode::OverTemperature | Mode::UnderTemperature => Some(Trigger::TemperatureSafe),
            Mode::SocLow | Mode::SocHigh => Some(Trigger::SocSafe),
            Mode::Fault => Some(Trigger::ResetFault),
        }
    }

    /// True for the single-condition warning modes.
    pub fn is_warning(self) -> bool {
        !matches!(
            self,
            Mode::Idle | Mode::Charging | Mode::Discharging | Mode::Fault
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Idle => "idle",
            Mode::Charging => "charging",
            Mode::Discharging => "discharging",
            Mode::OverTemperature => "overtemperature",
            Mode::UnderTemperature => "undertemperature",
            Mode::UnderVoltage => "undervoltage",
            Mode::OverVoltage => "overvoltage",
            Mode::OverCurrent => "overcurrent",
            Mode::SocLow => "SOC Low",
            Mode::SocHigh => "SOC High",
            Mode::Fault => "fault",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Event fed to the state machine. Triggers carry no state of their own.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    StartCharging,
    StartDischarging,
    ResumeCharging,
    ResumeDischarging,
    ChargeComplete,
    DischargingComplete,
    ChargingFault,
    DischargingFault,
    VoltageHighWarning,
    VoltageLowWarning,
    VoltageSafe,
    VoltagePersistentHigh,
    VoltagePersistentLow,
    CurrentHighWarning,
    CurrentSafe,
    CurrentPersistentHigh,
    TemperatureHighWarning,
    TemperatureLowWarning,
    TemperatureSafe,
    TemperaturePersistentHigh,
    TemperaturePersistentLow,
    SocLowWarning,
    SocHighWarning,
    SocSafe,
    SocLowPersistent,
    SocHighPersistent,
    StartFault,
    ResetFault,
}

impl Trigger {
    pub const ALL: [Trigger; 28] = [
        Trigger::StartCharging,
        Trigger::StartDischarging,
        Trigger::ResumeCharging,
        Trigger::ResumeDischarging,
        Trigger::ChargeComplete,
        Trigger::DischargingComplete,
        Trigger::ChargingFault,
        Trigger::DischargingFault,
        Trigger::VoltageHighWarning,
        Trigger::VoltageLowWarning,
        Trigger::VoltageSafe,
        Trigger::VoltagePersistentHigh,
        Trigger::VoltagePersistentLow,
        Trigger::CurrentHighWarning,
        Trigger::CurrentSafe,
        Trigger::CurrentPersistentHigh,
        Trigger::TemperatureHighWarning,
        Trigger::TemperatureLowWarning,
        Trigger::TemperatureSafe,
        Trigger::TemperaturePersistentHigh,
        Trigger::TemperaturePersistentLow,
        Trigger::SocLowWarning,
        Trigger::SocHighWarning,
        Trigger::SocSafe,
        Trigger::SocLowPersistent,
        Trigger::SocHighPersistent,
        Trigger::StartFault,
        Trigger::ResetFault,
    ];
}
