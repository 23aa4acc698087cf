//! Formula evaluation.
//!
//! The [`SpreadsheetEngine`] trait is the seam the HTTP layer talks to for
//! every cell operation; [`BasicEngine`] is the built-in implementation.

mod basic;
mod expression;

use std::fmt;

pub use basic::{BasicEngine, CellError, Scalar};
pub use expression::{BinaryOp, Expr, MAX_DEPTH, ParseError, parse_expression};

use crate::error::StoreResult;
use crate::model::SpreadsheetDelta;
use crate::reference::CellRange;
use crate::store::StoreRepository;

/// How much evaluation a cell load performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EngineEvaluation {
    /// Recompute every loaded formula, ignoring cached values.
    ForceRecompute,
    /// Reuse cached values, computing only formulas without one.
    ComputeIfNecessary,
    /// Return formulas as stored.
    SkipEvaluate,
    /// Drop cached values and errors, then return formulas unevaluated.
    ClearValueErrorSkipEvaluate,
}

impl EngineEvaluation {
    /// Every evaluation mode.
    pub const ALL: [EngineEvaluation; 4] = [
        EngineEvaluation::ForceRecompute,
        EngineEvaluation::ComputeIfNecessary,
        EngineEvaluation::SkipEvaluate,
        EngineEvaluation::ClearValueErrorSkipEvaluate,
    ];

    /// The link relation naming this mode in URLs.
    pub fn relation(&self) -> &'static str {
        match self {
            EngineEvaluation::ForceRecompute => "force-recompute",
            EngineEvaluation::ComputeIfNecessary => "compute-if-necessary",
            EngineEvaluation::SkipEvaluate => "skip-evaluate",
            EngineEvaluation::ClearValueErrorSkipEvaluate => "clear-value-error-skip-evaluate",
        }
    }

    /// Looks up a mode by its link relation.
    pub fn from_relation(relation: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.relation() == relation)
    }
}

impl fmt::Display for EngineEvaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.relation())
    }
}

/// Cell operations against one spreadsheet's stores.
///
/// Implementations receive the repository on every call so a single engine
/// can serve every spreadsheet.
pub trait SpreadsheetEngine: Send + Sync + fmt::Debug {
    /// Saves the cells and labels in `delta`, deleting `deletedCells` and
    /// `deletedLabels`, and returns the saved cells evaluated.
    fn save_cells(
        &self,
        delta: &SpreadsheetDelta,
        repository: &StoreRepository,
    ) -> StoreResult<SpreadsheetDelta>;

    /// Loads the stored cells within `ranges` together with labels pointing
    /// into them.
    fn load_cells(
        &self,
        ranges: &[CellRange],
        evaluation: EngineEvaluation,
        repository: &StoreRepository,
    ) -> StoreResult<SpreadsheetDelta>;

    /// Deletes the stored cells within `ranges`.
    fn delete_cells(
        &self,
        ranges: &[CellRange],
        repository: &StoreRepository,
    ) -> StoreResult<SpreadsheetDelta>;

    /// Names of the functions formulas may call.
    fn functions(&self) -> &'static [&'static str];
}
