use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::assessment::Assessment;

/// Keys every assessment object must carry, checked in this order.
pub const TEMPLATE_KEYS: [&str; 7] = ["Q1", "Q2", "Q3", "Q4", "Q5", "Q6", "severity"];

pub const MAX_SEVERITY: i64 = 6;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error("field '{0}' is empty or null")]
    EmptyField(&'static str),

    #[error("field '{0}' must be a string")]
    NotAString(&'static str),

    #[error("severity {0} is not an integer")]
    SeverityNotInteger(String),

    #[error("severity {0} is outside 0-6")]
    SeverityOutOfRange(i64),
}

/// Pure acceptance gate for one extracted object: returns the typed assessment
/// when the object matches the template, or the first reason it does not.
///
/// PASS conditions:
/// - every template key is present and neither null nor the empty string
/// - Q1..Q6 are strings ("N/A" is a valid answer)
/// - severity coerces to an integer in 0..=6
///
/// Keys outside the template are ignored and dropped.
pub fn validate_assessment(raw: &Map<String, Value>) -> Result<Assessment, ValidationError> {
    for key in TEMPLATE_KEYS {
        match raw.get(key) {
            None => return Err(ValidationError::MissingField(key)),
            Some(Value::Null) => return Err(ValidationError::EmptyField(key)),
            Some(Value::String(s)) if s.is_empty() => return Err(ValidationError::EmptyField(key)),
            Some(_) => {}
        }
    }

    let reasoning = |key: &'static str| -> Result<String, ValidationError> {
        raw.get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(ValidationError::NotAString(key))
    };

    let severity_value = &raw["severity"];
    let severity = coerce_severity(severity_value)
        .ok_or_else(|| ValidationError::SeverityNotInteger(severity_value.to_string()))?;
    if !(0..=MAX_SEVERITY).contains(&severity) {
        return Err(ValidationError::SeverityOutOfRange(severity));
    }

    Ok(Assessment {
        q1: reasoning("Q1")?,
        q2: reasoning("Q2")?,
        q3: reasoning("Q3")?,
        q4: reasoning("Q4")?,
        q5: reasoning("Q5")?,
        q6: reasoning("Q6")?,
        severity: severity as u8,
    })
}

/// Lenient integer coercion for the severity field.
///
/// Models answer with `3`, `"3"`, `" 3 "` or `3.0` interchangeably. Integral JSON
/// numbers and integer strings are accepted, finite floats truncate toward zero,
/// booleans count as 0/1. Anything else (including `"3.5"`) is rejected.
pub fn coerce_severity(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}
