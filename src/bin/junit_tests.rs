use std::env;
use std::fs::File;
use std::io::{self, Write};

use bms::{
    BmsConfig, ClassifierSession, Mode, Phase, Sample, StateMachine, TransitionError, Trigger,
};

// OSQAR-CODE-TRACE (test tags)
//
// TEST: TEST_TABLE_001 TEST_HUB_001 TEST_SOC_001 TEST_SCENARIO_001 TEST_SCENARIO_002 TEST_SCENARIO_003 TEST_ESCALATION_001 TEST_FIRST_SAMPLE_001 TEST_REPORT_001

#[derive(Debug)]
struct TestResult {
    name: &'static str,
    passed: bool,
    message: String,
}

fn pass(name: &'static str) -> TestResult {
    TestResult { name, passed: true, message: String::new() }
}

fn fail(name: &'static str, message: impl Into<String>) -> TestResult {
    TestResult { name, passed: false, message: message.into() }
}

/// Session that has consumed one in-range warm-up sample.
fn nominal_session(initial_soc: f64, phase: Phase) -> Result<ClassifierSession, TransitionError> {
    let mut config = BmsConfig::default();
    config.soc.initial = initial_soc;
    let mut session = ClassifierSession::new(config);
    session.classify(&Sample::new(0, 3.60, 0.00, 25.00, 10.00), phase)?;
    Ok(session)
}

fn test_table_strictness() -> TestResult {
    // TEST_TABLE_001
    let mut sm = StateMachine::new();

    if sm.current() != Mode::Idle {
        return fail("test_table_strictness", "Initial mode must be IDLE");
    }

    match sm.fire(Trigger::ResetFault) {
        Err(TransitionError::NoSuchTransition {
            state: Mode::Idle,
            trigger: Trigger::ResetFault,
        }) => {}
        other => {
            return fail("test_table_strictness", format!("ResetFault from idle => {other:?}"))
        }
    }

    if sm.current() != Mode::Idle {
        return fail("test_table_strictness", "Rejected trigger must not change mode");
    }

    if sm.fire(Trigger::StartFault) != Ok(Mode::Fault) {
        return fail("test_table_strictness", "StartFault must enter FAULT from idle");
    }

    let exits = sm.transitions_from(Mode::Fault);
    if exits != vec![(Trigger::ResetFault, Mode::Idle)] {
        return fail(
            "test_table_strictness",
            format!("FAULT exits {exits:?}, expected only ResetFault"),
        );
    }

    pass("test_table_strictness")
}

fn test_idle_hub() -> TestResult {
    // TEST_HUB_001
    let machine = StateMachine::new();
    for mode in Mode::ALL {
        let Some(back) = mode.idle_return_trigger() else { continue };
        let to_idle = machine
            .transitions_from(mode)
            .into_iter()
            .filter(|(_, to)| *to == Mode::Idle)
            .collect::<Vec<_>>();
        if to_idle != vec![(back, Mode::Idle)] {
            return fail("test_idle_hub", format!("{mode}: idle exits {to_idle:?}"));
        }
    }

    pass("test_idle_hub")
}

fn test_soc_accumulation() -> TestResult {
    // TEST_SOC_001
    let mut session = ClassifierSession::new(BmsConfig::default());
    let n = 12;
    for i in 0..n {
        let sample = Sample::new(i, 3.60, 6.00, 25.00, 10.00);
        if let Err(e) = session.classify(&sample, Phase::Charging) {
            return fail("test_soc_accumulation", e.to_string());
        }
    }

    let expected = n as f64 * 6.0 / (36.0 * 10.0);
    if (session.soc() - expected).abs() > 1e-9 {
        return fail(
            "test_soc_accumulation",
            format!("SOC {} after {n} samples, expected {expected}", session.soc()),
        );
    }

    pass("test_soc_accumulation")
}

fn test_scenarios() -> TestResult {
    // TEST_SCENARIO_001 + TEST_SCENARIO_002 + TEST_SCENARIO_003
    let mut session = ClassifierSession::new(BmsConfig::default());
    match session.classify(&Sample::new(0, 3.60, 10.00, 25.00, 10.00), Phase::Charging) {
        Ok(out) if out.trigger == Trigger::StartCharging && out.mode == Mode::Charging => {}
        other => return fail("test_scenarios", format!("Scenario 1 => {other:?}")),
    }

    let mut session = match nominal_session(0.5, Phase::Charging) {
        Ok(session) => session,
        Err(e) => return fail("test_scenarios", format!("Warm-up sample => {e}")),
    };
    match session.classify(&Sample::new(1, 4.50, 0.00, 25.00, 10.00), Phase::Charging) {
        Ok(out)
            if out.idle_return.map(|t| t.trigger) == Some(Trigger::ChargeComplete)
                && out.trigger == Trigger::VoltageHighWarning
                && out.mode == Mode::OverVoltage => {}
        other => return fail("test_scenarios", format!("Scenario 2 => {other:?}")),
    }

    match session.classify(&Sample::new(2, 3.60, 0.00, 25.00, 10.00), Phase::Charging) {
        Ok(out)
            if out.idle_return.map(|t| t.trigger) == Some(Trigger::VoltageSafe)
                && out.trigger == Trigger::StartCharging
                && out.mode == Mode::Charging => {}
        other => return fail("test_scenarios", format!("Scenario 3 => {other:?}")),
    }

    pass("test_scenarios")
}

fn test_escalation() -> TestResult {
    // TEST_ESCALATION_001
    let leads = [
        Sample::new(1, 3.60, 10.00, 25.00, 10.00),
        Sample::new(1, 2.00, 10.00, 25.00, 10.00),
        Sample::new(1, 3.60, 10.00, 70.00, 10.00),
    ];

    for lead in leads {
        let mut session = match nominal_session(0.5, Phase::Discharging) {
            Ok(session) => session,
            Err(e) => return fail("test_escalation", format!("Warm-up sample => {e}")),
        };
        if let Err(e) = session.classify(&lead, Phase::Discharging) {
            return fail("test_escalation", e.to_string());
        }
        let prev = session.previous_mode();
        let faulty = Sample::new(2, 5.00, 10.00, -30.00, 10.00);
        match session.classify(&faulty, Phase::Discharging) {
            Ok(out) if out.trigger == Trigger::StartFault && out.mode == Mode::Fault => {}
            other => return fail("test_escalation", format!("From {prev} => {other:?}")),
        }
    }

    pass("test_escalation")
}

fn test_first_sample_exemption() -> TestResult {
    // TEST_FIRST_SAMPLE_001
    let mut session = ClassifierSession::new(BmsConfig::default());
    match session.classify(&Sample::new(0, 3.60, 0.00, 25.00, 10.00), Phase::Charging) {
        Ok(out) if out.soc == 0.0 && out.anomaly_count == 0 && out.mode == Mode::Charging => {}
        other => return fail("test_first_sample_exemption", format!("{other:?}")),
    }

    match session.classify(&Sample::new(1, 3.60, 0.00, 25.00, 10.00), Phase::Charging) {
        Ok(out) if out.mode == Mode::SocLow => {}
        other => {
            return fail("test_first_sample_exemption", format!("Second sample => {other:?}"))
        }
    }

    pass("test_first_sample_exemption")
}

fn write_junit(mut w: impl Write, suite: &str, results: &[TestResult]) -> io::Result<()> {
    let failures = results.iter().filter(|r| !r.passed).count();

    writeln!(w, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
    writeln!(
        w,
        "<testsuite name=\"{}\" tests=\"{}\" failures=\"{}\" \
         errors=\"0\" skipped=\"0\" time=\"0\">",
        suite,
        results.len(),
        failures
    )?;

    for r in results {
        writeln!(
            w,
            "  <testcase classname=\"{}\" name=\"{}\" time=\"0\">",
            suite,
            r.name
        )?;
        if !r.passed {
            let msg = if r.message.is_empty() { "failed" } else { r.message.as_str() };
            writeln!(w, "    <failure message=\"{}\"/>", xml_escape(msg))?;
        }
        writeln!(w, "  </testcase>")?;
    }

    writeln!(w, "</testsuite>")?;
    Ok(())
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let out = args.get(1).map(|s| s.as_str()).unwrap_or("test_results.xml");

    let results = vec![
        test_table_strictness(),
        test_idle_hub(),
        test_soc_accumulation(),
        test_scenarios(),
        test_escalation(),
        test_first_sample_exemption(),
    ];

    // TEST_REPORT_001
    let mut file = File::create(out)?;
    write_junit(&mut file, "bms_rust", &results)?;

    for r in &results {
        if !r.passed {
            eprintln!("FAIL: {}: {}", r.name, r.message);
            std::process::exit(1);
        }
    }

    println!("PASS: {} tests", results.len());
    Ok(())
}
