//! Session driver: feeds an ordered sample sequence through one
//! `ClassifierSession` and reports each step to an observer.

use serde::{Deserialize, Serialize};
use tracing::{info, info_span};

use crate::classifier::{ClassificationOutcome, ClassifierSession, Phase};
use crate::config::BmsConfig;
use crate::error::Result;
use crate::mode::Mode;
use crate::sample::Sample;

/// Decides the phase of the sample at `position` (0-based) in a run of `total`.
pub trait PhasePolicy {
    fn phase(&self, position: usize, total: usize) -> Phase;
}

/// First half (inclusive of the midpoint) charges, the rest discharges.
#[derive(Copy, Clone, Debug, Default)]
pub struct HalfSplit;

impl PhasePolicy for HalfSplit {
    fn phase(&self, position: usize, total: usize) -> Phase {
        if position * 2 <= total {
            Phase::Charging
        } else {
            Phase::Discharging
        }
    }
}

/// Every sample in the same phase.
#[derive(Copy, Clone, Debug)]
pub struct FixedPhase(pub Phase);

impl PhasePolicy for FixedPhase {
    fn phase(&self, _position: usize, _total: usize) -> Phase {
        self.0
    }
}

/// Receives each outcome before the next sample is classified.
pub trait SessionObserver {
    fn on_step(&mut self, outcome: &ClassificationOutcome);
}

/// Emits `mode` and the sample line as an `info` event per step.
#[derive(Copy, Clone, Debug, Default)]
pub struct TracingObserver;

impl SessionObserver for TracingObserver {
    fn on_step(&mut self, outcome: &ClassificationOutcome) {
        info!(
            mode = %outcome.mode,
            soc = outcome.soc,
            sample = %outcome.sample.to_line(),
            "classified"
        );
    }
}

/// Keeps every outcome in memory.
#[derive(Clone, Debug, Default)]
pub struct RecordingObserver {
    pub outcomes: Vec<ClassificationOutcome>,
}

impl SessionObserver for RecordingObserver {
    fn on_step(&mut self, outcome: &ClassificationOutcome) {
        self.outcomes.push(outcome.clone());
    }
}

impl<F: FnMut(&ClassificationOutcome)> SessionObserver for F {
    fn on_step(&mut self, outcome: &ClassificationOutcome) {
        self(outcome)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub index: u64,
    pub phase: Phase,
    pub mode: Mode,
    pub soc: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub steps: Vec<Step>,
    pub final_mode: Mode,
    pub final_soc: f64,
    /// Samples that ended in `Fault`.
    pub faults: usize,
    /// Samples that ended in a single-condition warning mode.
    pub warnings: usize,
}

/// Classify `samples` in order. Stops at the first transition error.
pub fn run_session<P, O>(
    samples: &[Sample],
    policy: &P,
    config: &BmsConfig,
    observer: &mut O,
) -> Result<SessionReport>
where
    P: PhasePolicy + ?Sized,
    O: SessionObserver + ?Sized,
{
    let span = info_span!("session", samples = samples.len());
    let _enter = span.enter();

    let mut session = ClassifierSession::new(config.clone());
    let mut steps = Vec::with_capacity(samples.len());
    let total = samples.len();

    for (position, sample) in samples.iter().enumerate() {
        let phase = policy.phase(position, total);
        let outcome = session.classify(sample, phase)?;
        observer.on_step(&outcome);
        steps.push(Step {
            index: sample.index,
            phase,
            mode: outcome.mode,
            soc: outcome.soc,
        });
    }

    let faults = steps.iter().filter(|s| s.mode == Mode::Fault).count();
    let warnings = steps.iter().filter(|s| s.mode.is_warning()).count();
    info!(
        final_mode = %session.previous_mode(),
        faults,
        warnings,
        "session complete"
    );

    Ok(SessionReport {
        steps,
        final_mode: session.previous_mode(),
        final_soc: session.soc(),
        faults,
        warnings,
    })
}
