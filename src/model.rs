/// Core data types for the scenario comparison service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no logic, no I/O, and no external dependencies — only types.

use crate::period::MonthStamp;

// ---------------------------------------------------------------------------
// Unit labels
// ---------------------------------------------------------------------------

/// Unit label for monthly flow rates, in cubic feet per second.
pub const UNITS_CFS: &str = "CFS";

/// Unit label for monthly volume records, in thousand acre-feet.
pub const UNITS_TAF: &str = "TAF";

/// Unit label written onto a series after its monthly rates have been
/// rewritten as accumulated volumes.
pub const UNITS_TAF_PER_YEAR: &str = "TAF per year";

// ---------------------------------------------------------------------------
// Series type
// ---------------------------------------------------------------------------

/// One monthly time series read from a scenario store.
///
/// `times` and `values` are parallel arrays in ascending time order, one
/// entry per calendar month. The pair must stay the same length through
/// every transformation (trimming, unit rewrites, slicing).
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySeries {
    /// Month stamps, see `period::MonthStamp`.
    pub times: Vec<MonthStamp>,
    /// One value per month, unit given by `units`.
    pub values: Vec<f64>,
    /// Unit label as stored, e.g. "CFS" or "TAF".
    pub units: String,
    /// Short name of the scenario store file this was read from
    /// (path and extension stripped).
    pub scenario: String,
    /// Display name of the dataset, e.g. "S_SHSTA/STORAGE".
    pub name: String,
}

impl MonthlySeries {
    /// Number of monthly points in the series.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// A fetch request was incomplete — raised by the readiness check before any
/// store I/O happens. Carries a message naming the first unmet condition.
#[derive(Debug, Clone, PartialEq)]
pub struct PreconditionError(pub String);

impl std::fmt::Display for PreconditionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PreconditionError {}

/// Errors that can arise while opening or decoding a scenario store file.
///
/// These never propagate past the fetch boundary: they are logged, swallowed,
/// and surface to callers as a missing series.
#[derive(Debug)]
pub enum StoreError {
    /// The store file could not be read.
    Io(std::io::Error),
    /// The store file was read but its contents could not be decoded.
    Decode(String),
    /// The store holds no records at all, so structural name parts cannot
    /// be inferred.
    EmptyCatalog(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "I/O error: {}", e),
            StoreError::Decode(msg) => write!(f, "Decode error: {}", msg),
            StoreError::EmptyCatalog(file) => {
                write!(f, "No records in store: {}", file)
            }
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}
