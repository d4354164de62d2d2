//! BMS - Battery Management System supervisory controller (Rust)
//!
//! Requirement Traceability:
//!   - REQ_FUNC_001: Fixed mode/trigger transition table, strict source-state check
//!   - REQ_FUNC_002: Coulomb-counting state-of-charge integration
//!   - REQ_FUNC_003: Phase-dependent range checks (voltage, current, temperature, SOC)
//!   - REQ_FUNC_004: Escalation (one anomaly => warning, two or more => fault)
//!   - REQ_FUNC_005: Idle-normalization before every new trigger
//!
//! ```
//! use bms::{BmsConfig, ClassifierSession, Mode, Phase, Sample};
//!
//! let mut session = ClassifierSession::new(BmsConfig::default());
//! let out = session
//!     .classify(&Sample::new(0, 3.60, 10.00, 25.00, 10.00), Phase::Charging)
//!     .unwrap();
//! assert_eq!(out.mode, Mode::Charging);
//! ```

pub mod classifier;
pub mod config;
pub mod error;
pub mod limits;
pub mod mode;
pub mod sample;
pub mod session;
pub mod state_machine;

pub use classifier::{
    escalate, ClassificationOutcome, ClassifierSession, Phase, Quantity, RangeCheck,
};
pub use config::BmsConfig;
pub use error::{BmsError, ConfigError, Result, SampleParseError, TransitionError};
pub use limits::{Limits, PhaseLimits, Range};
pub use mode::{Mode, Trigger};
pub use sample::{parse_samples, Sample};
pub use session::{
    run_session, FixedPhase, HalfSplit, PhasePolicy, RecordingObserver, SessionObserver,
    SessionReport, Step, TracingObserver,
};
pub use state_machine::{StateMachine, Transition, TransitionTable};
