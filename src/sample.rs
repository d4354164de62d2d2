//! Sensor sample records and their line format.
//!
//! One sample per line, five whitespace-separated fields:
//! `index voltage current temperature capacity`.

use serde::{Deserialize, Serialize};

use crate::error::SampleParseError;

/// One sensor reading. Volts, amps, degrees Celsius, amp-hours.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub index: u64,
    pub voltage: f64,
    pub current: f64,
    pub temperature: f64,
    pub capacity: f64,
    /// Input text the sample was parsed from, trimmed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    raw: Option<String>,
}

impl Sample {
    pub fn new(index: u64, voltage: f64, current: f64, temperature: f64, capacity: f64) -> Self {
        Self {
            index,
            voltage,
            current,
            temperature,
            capacity,
            raw: None,
        }
    }

    /// Parse one non-blank line. `line` is the 1-based line number used in errors.
    pub fn parse_line(text: &str, line: usize) -> Result<Self, SampleParseError> {
        let fields: Vec<&str> = text.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(SampleParseError::FieldCount {
                line,
                found: fields.len(),
            });
        }

        let index = fields[0]
            .parse::<u64>()
            .map_err(|_| invalid(line, "index", fields[0]))?;
        let voltage = parse_f64(fields[1], line, "voltage")?;
        let current = parse_f64(fields[2], line, "current")?;
        let temperature = parse_f64(fields[3], line, "temperature")?;
        let capacity = parse_f64(fields[4], line, "capacity")?;

        if capacity <= 0.0 {
            return Err(SampleParseError::NonPositiveCapacity { line, capacity });
        }

        Ok(Self {
            raw: Some(text.trim().to_string()),
            ..Self::new(index, voltage, current, temperature, capacity)
        })
    }

    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// The input line as read, or the fields at full precision for samples
    /// built in code.
    pub fn to_line(&self) -> String {
        match &self.raw {
            Some(raw) => raw.clone(),
            None => format!(
                "{} {} {} {} {}",
                self.index, self.voltage, self.current, self.temperature, self.capacity
            ),
        }
    }
}

impl std::str::FromStr for Sample {
    type Err = SampleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sample::parse_line(s, 1)
    }
}

/// Parse a whole sample stream, skipping blank lines.
pub fn parse_samples(input: &str) -> Result<Vec<Sample>, SampleParseError> {
    input
        .lines()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(i, text)| Sample::parse_line(text, i + 1))
        .collect()
}

fn parse_f64(raw: &str, line: usize, field: &'static str) -> Result<f64, SampleParseError> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(invalid(line, field, raw)),
    }
}

fn invalid(line: usize, field: &'static str, raw: &str) -> SampleParseError {
    SampleParseError::InvalidField {
        line,
        field,
        value: raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_five_fields() {
        let s: Sample = "0 3.60 10.00 25.00 10.00".parse().unwrap();
        assert_eq!((s.index, s.voltage, s.current), (0, 3.6, 10.0));
        assert_eq!((s.temperature, s.capacity), (25.0, 10.0));
        assert_eq!(s.raw(), Some("0 3.60 10.00 25.00 10.00"));
    }

    #[test]
    fn line_keeps_input_precision() {
        let s = Sample::parse_line("  0 4.204 10.0 25.0 10.0 ", 1).unwrap();
        assert_eq!(s.to_line(), "0 4.204 10.0 25.0 10.0");
        assert_eq!(Sample::new(3, 4.204, 10.0, 25.5, 10.0).to_line(), "3 4.204 10 25.5 10");
    }

    #[test]
    fn rejects_wrong_field_count() {
        let err = Sample::parse_line("1 3.6 10.0 25.0", 7).unwrap_err();
        assert_eq!(err, SampleParseError::FieldCount { line: 7, found: 4 });
    }

    #[test]
    fn rejects_non_numeric_and_non_finite() {
        let err = Sample::parse_line("1 3.6 ten 25.0 10.0", 2).unwrap_err();
        assert!(matches!(
            err,
            SampleParseError::InvalidField { line: 2, field: "current", .. }
        ));
        let err = Sample::parse_line("1 NaN 1.0 25.0 10.0", 3).unwrap_err();
        assert!(matches!(err, SampleParseError::InvalidField { field: "voltage", .. }));
    }

    #[test]
    fn rejects_zero_capacity() {
        let err = Sample::parse_line("1 3.6 1.0 25.0 0", 1).unwrap_err();
        assert!(matches!(err, SampleParseError::NonPositiveCapacity { .. }));
    }

    #[test]
    fn stream_skips_blank_lines_and_reports_line_numbers() {
        let input = "0 3.60 10.00 25.00 10.00\n\n1 4.00 5.00 20.00 10.00\n2 bad\n";
        let err = parse_samples(input).unwrap_err();
        assert_eq!(err, SampleParseError::FieldCount { line: 4, found: 2 });

        let ok = parse_samples("0 3.60 10.00 25.00 10.00\n\n1 4.00 5.00 20.00 10.00\n").unwrap();
        assert_eq!(ok.len(), 2);
        assert_eq!(ok[1].index, 1);
    }
}
