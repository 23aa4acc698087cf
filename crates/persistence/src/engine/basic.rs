//! The built-in formula engine.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

use serde_json::Value;
use thiserror::Error;

use super::expression::{BinaryOp, Expr, parse_expression};
use super::{EngineEvaluation, SpreadsheetEngine};
use crate::error::{StoreError, StoreResult};
use crate::model::{SpreadsheetCell, SpreadsheetDelta, SpreadsheetFormula, number_value};
use crate::reference::{CellRange, CellReference};
use crate::store::StoreRepository;

const FUNCTIONS: &[&str] = &["ABS", "AVERAGE", "CONCAT", "COUNT", "IF", "MAX", "MIN", "SUM"];

/// A value produced while evaluating a formula.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
}

impl Scalar {
    fn to_number(&self) -> Result<f64, CellError> {
        match self {
            Scalar::Empty => Ok(0.0),
            Scalar::Number(n) => Ok(*n),
            Scalar::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Scalar::Text(text) => text.trim().parse().map_err(|_| CellError::Value),
        }
    }

    fn to_text(&self) -> String {
        match self {
            Scalar::Empty => String::new(),
            Scalar::Number(n) => number_value(*n).to_string(),
            Scalar::Text(text) => text.clone(),
            Scalar::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        }
    }

    fn to_boolean(&self) -> Result<bool, CellError> {
        match self {
            Scalar::Empty => Ok(false),
            Scalar::Number(n) => Ok(*n != 0.0),
            Scalar::Boolean(b) => Ok(*b),
            Scalar::Text(text) if text.eq_ignore_ascii_case("TRUE") => Ok(true),
            Scalar::Text(text) if text.eq_ignore_ascii_case("FALSE") => Ok(false),
            Scalar::Text(_) => Err(CellError::Value),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Scalar::Empty => Value::Null,
            Scalar::Number(n) => number_value(*n),
            Scalar::Text(text) => Value::String(text.clone()),
            Scalar::Boolean(b) => Value::Bool(*b),
        }
    }

    fn from_json(value: &Value) -> Self {
        match value {
            Value::Bool(b) => Scalar::Boolean(*b),
            Value::Number(n) => n.as_f64().map(Scalar::Number).unwrap_or(Scalar::Empty),
            Value::String(text) => Scalar::Text(text.clone()),
            _ => Scalar::Empty,
        }
    }

    /// Numbers sort before text, text before booleans.
    fn compare(&self, other: &Scalar) -> Ordering {
        fn rank(scalar: &Scalar) -> u8 {
            match scalar {
                Scalar::Empty | Scalar::Number(_) => 0,
                Scalar::Text(_) => 1,
                Scalar::Boolean(_) => 2,
            }
        }

        match (self, other) {
            (Scalar::Text(a), Scalar::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            (Scalar::Boolean(a), Scalar::Boolean(b)) => a.cmp(b),
            (a, b) if rank(a) == 0 && rank(b) == 0 => {
                let a = a.to_number().unwrap_or(0.0);
                let b = b.to_number().unwrap_or(0.0);
                a.partial_cmp(&b).unwrap_or(Ordering::Equal)
            }
            (a, b) => rank(a).cmp(&rank(b)),
        }
    }
}

/// An error value stored in a cell instead of a computed value.
#[allow(missing_docs)]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellError {
    #[error("#DIV/0!")]
    DivideByZero,
    #[error("#REF!")]
    Reference,
    #[error("#NAME?")]
    Name,
    #[error("#VALUE!")]
    Value,
    #[error("#CYCLE!")]
    Cycle,
    #[error("#ERROR!")]
    Syntax,
}

impl CellError {
    fn parse(code: &str) -> Self {
        match code {
            "#DIV/0!" => CellError::DivideByZero,
            "#REF!" => CellError::Reference,
            "#NAME?" => CellError::Name,
            "#VALUE!" => CellError::Value,
            "#CYCLE!" => CellError::Cycle,
            _ => CellError::Syntax,
        }
    }
}

/// Evaluates the formulas of one repository, writing results back.
///
/// Inputs are evaluated before the cells that read them, driven by an
/// explicit work stack, so the call stack stays flat however long a chain
/// of references grows. Reading a cell that is still waiting on its own
/// inputs means the two are part of a cycle.
struct Evaluator<'a> {
    repository: &'a StoreRepository,
    force: bool,
    pending: HashSet<CellReference>,
    computed: HashSet<CellReference>,
}

impl<'a> Evaluator<'a> {
    fn new(repository: &'a StoreRepository, force: bool) -> Self {
        Self {
            repository,
            force,
            pending: HashSet::new(),
            computed: HashSet::new(),
        }
    }

    /// Evaluates `root` along with whatever it depends on.
    fn value(&mut self, root: CellReference) -> Result<Scalar, CellError> {
        let mut stack = vec![(root, false)];

        while let Some((reference, inputs_ready)) = stack.pop() {
            if inputs_ready {
                self.compute(reference);
                continue;
            }
            if self.pending.contains(&reference) {
                continue;
            }
            let Some(stored) = self.stale(&reference) else {
                continue;
            };

            self.pending.insert(reference);
            stack.push((reference, true));
            for dependency in self.dependencies(&stored.formula.text).into_iter().rev() {
                if !self.pending.contains(&dependency) && self.stale(&dependency).is_some() {
                    stack.push((dependency, false));
                }
            }
        }

        self.cell_value(root)
    }

    /// Returns the stored cell when its value has to be (re)computed.
    fn stale(&self, reference: &CellReference) -> Option<SpreadsheetCell> {
        let stored = self.repository.cells.get(reference)?;
        let reuse = !self.force || self.computed.contains(reference);
        (!(reuse && stored.formula.is_evaluated())).then_some(stored)
    }

    /// Reads a cell that [`Evaluator::value`] has already settled.
    fn cell_value(&self, reference: CellReference) -> Result<Scalar, CellError> {
        if self.stale(&reference).is_some() {
            return Err(CellError::Cycle);
        }
        let Some(stored) = self.repository.cells.get(&reference) else {
            return Ok(Scalar::Empty);
        };

        match &stored.formula.error {
            Some(code) => Err(CellError::parse(code)),
            None => Ok(stored
                .formula
                .value
                .as_ref()
                .map(Scalar::from_json)
                .unwrap_or(Scalar::Empty)),
        }
    }

    fn compute(&mut self, reference: CellReference) {
        let Some(stored) = self.repository.cells.get(&reference) else {
            return;
        };

        let outcome = self.evaluate_text(&stored.formula.text);
        let formula = match &outcome {
            Ok(value) => SpreadsheetFormula {
                text: stored.formula.text.clone(),
                value: Some(value.to_json()),
                error: None,
            },
            Err(error) => SpreadsheetFormula {
                text: stored.formula.text.clone(),
                value: None,
                error: Some(error.to_string()),
            },
        };
        self.repository
            .cells
            .save(reference, SpreadsheetCell { formula });
        self.computed.insert(reference);
        self.pending.remove(&reference);
    }

    /// Every stored cell a formula could read. Unparseable formulas read nothing.
    fn dependencies(&self, text: &str) -> Vec<CellReference> {
        let mut found = Vec::new();
        if let Some(Ok(expr)) = text.strip_prefix('=').map(parse_expression) {
            self.collect(&expr, &mut found);
        }
        found
    }

    fn collect(&self, expr: &Expr, found: &mut Vec<CellReference>) {
        match expr {
            Expr::Cell(cell) => found.push(*cell),
            Expr::Range(range) => found.extend(self.stored_within(*range)),
            Expr::Label(label) => {
                if let Ok(range) = self.repository.labels.resolve_range(label) {
                    found.extend(self.stored_within(range));
                }
            }
            Expr::Negate(inner) => self.collect(inner, found),
            Expr::Binary { left, right, .. } => {
                self.collect(left, found);
                self.collect(right, found);
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    self.collect(arg, found);
                }
            }
            Expr::Number(_) | Expr::Text(_) | Expr::Boolean(_) | Expr::Name(_) => {}
        }
    }

    fn stored_within(&self, range: CellRange) -> Vec<CellReference> {
        self.repository
            .cells
            .filter(|cell| range.contains(cell))
            .into_iter()
            .map(|(reference, _)| reference)
            .collect()
    }

    fn evaluate_text(&mut self, text: &str) -> Result<Scalar, CellError> {
        if let Some(expression) = text.strip_prefix('=') {
            let expr = parse_expression(expression).map_err(|error| {
                tracing::debug!(formula = %text, %error, "Formula parse failed");
                CellError::Syntax
            })?;
            return self.evaluate(&expr);
        }

        let trimmed = text.trim();
        if trimmed.is_empty() {
            Ok(Scalar::Empty)
        } else if let Ok(number) = trimmed.parse::<f64>() {
            Ok(Scalar::Number(number))
        } else if trimmed.eq_ignore_ascii_case("TRUE") {
            Ok(Scalar::Boolean(true))
        } else if trimmed.eq_ignore_ascii_case("FALSE") {
            Ok(Scalar::Boolean(false))
        } else {
            Ok(Scalar::Text(text.to_string()))
        }
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Scalar, CellError> {
        match expr {
            Expr::Number(n) => Ok(Scalar::Number(*n)),
            Expr::Text(text) => Ok(Scalar::Text(text.clone())),
            Expr::Boolean(b) => Ok(Scalar::Boolean(*b)),
            Expr::Cell(cell) => self.cell_value(*cell),
            Expr::Label(label) => {
                let cell = self
                    .repository
                    .labels
                    .resolve_cell(label)
                    .map_err(label_error)?;
                self.cell_value(cell)
            }
            Expr::Range(_) => Err(CellError::Value),
            Expr::Name(_) => Err(CellError::Name),
            Expr::Negate(inner) => Ok(Scalar::Number(-self.evaluate(inner)?.to_number()?)),
            Expr::Binary { op, left, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                binary(*op, &left, &right)
            }
            Expr::Call { name, args } => self.call(name, args),
        }
    }

    /// Expands an argument: ranges and range labels yield every stored cell
    /// they cover, anything else yields its single value.
    fn expand(&mut self, arg: &Expr) -> Result<Vec<(Scalar, bool)>, CellError> {
        let range = match arg {
            Expr::Range(range) => Some(*range),
            Expr::Label(label) => {
                let range = self
                    .repository
                    .labels
                    .resolve_range(label)
                    .map_err(label_error)?;
                (!range.is_single()).then_some(range)
            }
            _ => None,
        };

        match range {
            Some(range) => {
                let cells = self.stored_within(range);
                let mut values = Vec::with_capacity(cells.len());
                for reference in cells {
                    values.push((self.cell_value(reference)?, true));
                }
                Ok(values)
            }
            None => Ok(vec![(self.evaluate(arg)?, false)]),
        }
    }

    fn numbers(&mut self, args: &[Expr]) -> Result<Vec<f64>, CellError> {
        let mut numbers = Vec::new();
        for arg in args {
            for (value, from_range) in self.expand(arg)? {
                match value {
                    Scalar::Number(n) => numbers.push(n),
                    _ if from_range => {}
                    other => numbers.push(other.to_number()?),
                }
            }
        }
        Ok(numbers)
    }

    fn call(&mut self, name: &str, args: &[Expr]) -> Result<Scalar, CellError> {
        match name {
            "SUM" => Ok(Scalar::Number(self.numbers(args)?.iter().sum())),
            "AVERAGE" => {
                let numbers = self.numbers(args)?;
                if numbers.is_empty() {
                    return Err(CellError::DivideByZero);
                }
                Ok(Scalar::Number(
                    numbers.iter().sum::<f64>() / numbers.len() as f64,
                ))
            }
            "MIN" => Ok(Scalar::Number(
                self.numbers(args)?.into_iter().reduce(f64::min).unwrap_or(0.0),
            )),
            "MAX" => Ok(Scalar::Number(
                self.numbers(args)?.into_iter().reduce(f64::max).unwrap_or(0.0),
            )),
            "COUNT" => {
                let mut count = 0usize;
                for arg in args {
                    count += self
                        .expand(arg)?
                        .iter()
                        .filter(|(value, _)| matches!(value, Scalar::Number(_)))
                        .count();
                }
                Ok(Scalar::Number(count as f64))
            }
            "ABS" => match args {
                [arg] => Ok(Scalar::Number(self.evaluate(arg)?.to_number()?.abs())),
                _ => Err(CellError::Value),
            },
            "IF" => match args {
                [condition, then] => {
                    if self.evaluate(condition)?.to_boolean()? {
                        self.evaluate(then)
                    } else {
                        Ok(Scalar::Boolean(false))
                    }
                }
                [condition, then, otherwise] => {
                    if self.evaluate(condition)?.to_boolean()? {
                        self.evaluate(then)
                    } else {
                        self.evaluate(otherwise)
                    }
                }
                _ => Err(CellError::Value),
            },
            "CONCAT" => {
                let mut text = String::new();
                for arg in args {
                    for (value, _) in self.expand(arg)? {
                        text.push_str(&value.to_text());
                    }
                }
                Ok(Scalar::Text(text))
            }
            _ => Err(CellError::Name),
        }
    }
}

/// Unknown labels are names; anything else is a broken reference.
fn label_error(error: StoreError) -> CellError {
    if error.is_missing_entry() {
        CellError::Name
    } else {
        CellError::Reference
    }
}

fn binary(op: BinaryOp, left: &Scalar, right: &Scalar) -> Result<Scalar, CellError> {
    let number = |n: f64| {
        if n.is_finite() {
            Ok(Scalar::Number(n))
        } else {
            Err(CellError::Value)
        }
    };

    match op {
        BinaryOp::Add => number(left.to_number()? + right.to_number()?),
        BinaryOp::Subtract => number(left.to_number()? - right.to_number()?),
        BinaryOp::Multiply => number(left.to_number()? * right.to_number()?),
        BinaryOp::Divide => {
            let divisor = right.to_number()?;
            if divisor == 0.0 {
                return Err(CellError::DivideByZero);
            }
            number(left.to_number()? / divisor)
        }
        BinaryOp::Power => number(left.to_number()?.powf(right.to_number()?)),
        BinaryOp::Concat => Ok(Scalar::Text(left.to_text() + &right.to_text())),
        BinaryOp::Equal => Ok(Scalar::Boolean(left.compare(right) == Ordering::Equal)),
        BinaryOp::NotEqual => Ok(Scalar::Boolean(left.compare(right) != Ordering::Equal)),
        BinaryOp::Less => Ok(Scalar::Boolean(left.compare(right) == Ordering::Less)),
        BinaryOp::LessEqual => Ok(Scalar::Boolean(left.compare(right) != Ordering::Greater)),
        BinaryOp::Greater => Ok(Scalar::Boolean(left.compare(right) == Ordering::Greater)),
        BinaryOp::GreaterEqual => Ok(Scalar::Boolean(left.compare(right) != Ordering::Less)),
    }
}

/// The built-in [`SpreadsheetEngine`].
///
/// Saving cells drops every cached value in the spreadsheet; values are
/// recomputed lazily the next time cells are loaded.
#[derive(Clone, Copy, Debug, Default)]
pub struct BasicEngine;

impl BasicEngine {
    /// Creates the engine.
    pub fn new() -> Self {
        Self
    }

    fn invalidate(repository: &StoreRepository) {
        repository.cells.update_all(|_, cell| {
            cell.formula.value = None;
            cell.formula.error = None;
        });
    }

    fn cells_within(repository: &StoreRepository, ranges: &[CellRange]) -> BTreeSet<CellReference> {
        repository
            .cells
            .filter(|cell| ranges.iter().any(|range| range.contains(cell)))
            .into_iter()
            .map(|(reference, _)| reference)
            .collect()
    }
}

impl SpreadsheetEngine for BasicEngine {
    fn save_cells(
        &self,
        delta: &SpreadsheetDelta,
        repository: &StoreRepository,
    ) -> StoreResult<SpreadsheetDelta> {
        repository.labels.save_all(&delta.labels)?;
        for label in &delta.deleted_labels {
            repository.labels.delete(label);
        }
        for (reference, cell) in &delta.cells {
            repository.cells.save(*reference, cell.cleared());
        }
        for reference in &delta.deleted_cells {
            repository.cells.delete(reference);
        }
        Self::invalidate(repository);

        let mut evaluator = Evaluator::new(repository, false);
        let mut saved = SpreadsheetDelta {
            labels: delta.labels.clone(),
            deleted_cells: delta.deleted_cells.clone(),
            deleted_labels: delta.deleted_labels.clone(),
            ..Default::default()
        };
        for reference in delta.cells.keys() {
            // The outcome is written back into the store either way.
            let _ = evaluator.value(*reference);
            saved
                .cells
                .insert(*reference, repository.cells.load(reference)?);
        }

        tracing::debug!(
            cells = saved.cells.len(),
            deleted = saved.deleted_cells.len(),
            "Saved cells"
        );
        Ok(saved)
    }

    fn load_cells(
        &self,
        ranges: &[CellRange],
        evaluation: EngineEvaluation,
        repository: &StoreRepository,
    ) -> StoreResult<SpreadsheetDelta> {
        let references = Self::cells_within(repository, ranges);
        let mut loaded = SpreadsheetDelta::new();

        match evaluation {
            EngineEvaluation::SkipEvaluate => {}
            EngineEvaluation::ClearValueErrorSkipEvaluate => {
                for reference in &references {
                    if let Some(cell) = repository.cells.get(reference) {
                        repository.cells.save(*reference, cell.cleared());
                    }
                }
            }
            EngineEvaluation::ComputeIfNecessary | EngineEvaluation::ForceRecompute => {
                let force = evaluation == EngineEvaluation::ForceRecompute;
                let mut evaluator = Evaluator::new(repository, force);
                for reference in &references {
                    let _ = evaluator.value(*reference);
                }
            }
        }

        for reference in references {
            if let Some(cell) = repository.cells.get(&reference) {
                loaded.cells.insert(reference, cell);
            }
        }
        loaded.labels = repository.labels.mappings_within(ranges);
        Ok(loaded)
    }

    fn delete_cells(
        &self,
        ranges: &[CellRange],
        repository: &StoreRepository,
    ) -> StoreResult<SpreadsheetDelta> {
        let deleted = repository
            .cells
            .delete_where(|cell| ranges.iter().any(|range| range.contains(cell)));
        Self::invalidate(repository);

        Ok(SpreadsheetDelta {
            deleted_cells: deleted.into_iter().collect(),
            ..Default::default()
        })
    }

    fn functions(&self) -> &'static [&'static str] {
        FUNCTIONS
    }
}
