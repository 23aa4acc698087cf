//! Cells and formulas.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The formula held by a cell together with its last computed outcome.
///
/// `value` and `error` are mutually exclusive; both are absent until the
/// engine has evaluated the formula.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpreadsheetFormula {
    /// The formula text, `=` prefixed for expressions.
    #[serde(default)]
    pub text: String,

    /// The computed value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    /// The error code produced by evaluation, such as `#DIV/0!`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SpreadsheetFormula {
    /// Creates an unevaluated formula.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            value: None,
            error: None,
        }
    }

    /// Returns `true` if the formula has been evaluated.
    pub fn is_evaluated(&self) -> bool {
        self.value.is_some() || self.error.is_some()
    }

    /// Returns a copy with value and error removed.
    pub fn cleared(&self) -> Self {
        Self::new(self.text.clone())
    }
}

/// A single stored cell.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpreadsheetCell {
    /// The cell formula.
    #[serde(default)]
    pub formula: SpreadsheetFormula,
}

impl SpreadsheetCell {
    /// Creates a cell holding the given formula text.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            formula: SpreadsheetFormula::new(text),
        }
    }

    /// Returns a copy with the computed outcome removed.
    pub fn cleared(&self) -> Self {
        Self {
            formula: self.formula.cleared(),
        }
    }
}

/// Converts a number to JSON, writing integral values as integers.
///
/// `3.0` becomes `3` so clients comparing against integer literals see the
/// value they typed.
pub fn number_value(number: f64) -> Value {
    if number.is_finite() && number.fract() == 0.0 && number.abs() < 9.0e15 {
        Value::from(number as i64)
    } else {
        serde_json::Number::from_f64(number)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}
