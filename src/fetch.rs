/// Reads one dataset from one scenario store file.
///
/// A dataset name specification is either:
/// - a literal record path, marked by a leading `*` and read verbatim, or
/// - one or more `VARIABLE/CATEGORY[/VERSION]` sub-terms joined by `+`,
///   read individually and summed pointwise into a single series.
///
/// Sub-terms that do not name a VERSION inherit the structural STUDY and
/// VERSION parts discovered from an arbitrary existing record in the store.
/// A `(-1)` suffix on the first sub-term requests a one-month time shift.
///
/// Failures never propagate: store problems are logged and swallowed, and a
/// dataset that resolves to no data produces a diagnostic message instead
/// of an error. Callers get back an optional series plus the diagnostics.

use std::path::Path;

use crate::features;
use crate::locations::LITERAL_MARKER;
use crate::logging::{self, DataSource};
use crate::model::MonthlySeries;
use crate::period::DateWindow;
use crate::store::{RecordPath, ScenarioFile};

/// Suffix marking a one-month time shift on the first sub-term.
const SHIFT_MARKER: &str = "(-1)";

// ---------------------------------------------------------------------------
// Fetch result
// ---------------------------------------------------------------------------

/// Outcome of a single dataset read.
#[derive(Debug, Default)]
pub struct FetchResult {
    /// The trimmed series, or `None` when the read failed or found no data.
    pub series: Option<MonthlySeries>,
    /// User-facing messages produced along the way (missing datasets,
    /// feature-gate explanations). Empty on a clean read.
    pub diagnostics: Vec<String>,
}

impl FetchResult {
    fn missing(message: String) -> FetchResult {
        FetchResult { series: None, diagnostics: vec![message] }
    }
}

// ---------------------------------------------------------------------------
// Fetch
// ---------------------------------------------------------------------------

/// Reads `dataset_name` from `store_file`, trimmed to `window`.
pub fn fetch_one_series(
    store_file: &Path,
    dataset_name: &str,
    window: &DateWindow,
) -> FetchResult {
    let store = match ScenarioFile::open(store_file) {
        Ok(store) => store,
        Err(e) => {
            logging::log_store_failure(store_file, "open", &e);
            return FetchResult::default();
        }
    };

    let literal = dataset_name.strip_prefix(LITERAL_MARKER);
    let do_shift = literal.is_none() && first_term(dataset_name).ends_with(SHIFT_MARKER);

    let mut result = match literal {
        Some(path) => read_literal(&store, path),
        None => read_summed(&store, dataset_name),
    };

    if let Some(series) = result.series.as_mut() {
        trim_to_window(series, window);

        if do_shift && !series.is_empty() {
            // The shift marker is meant to move interior points one month
            // earlier, but its only observable effect has always been
            // dropping the trailing record; stamps stay in place. Open
            // question whether a true shift was intended - kept as-is.
            series.times.pop();
            series.values.pop();
        }
    }

    result
}

fn first_term(dataset_name: &str) -> &str {
    dataset_name.split('+').next().unwrap_or(dataset_name)
}

/// Literal mode: the remainder of the name is a full record path.
fn read_literal(store: &ScenarioFile, path: &str) -> FetchResult {
    match store.get(path) {
        Some(series) if !series.is_empty() => {
            FetchResult { series: Some(series), diagnostics: Vec::new() }
        }
        _ => {
            let message = features::missing_dataset_message(path, store.path());
            logging::warn(DataSource::Store, store.path().to_str(), &message);
            FetchResult::missing(message)
        }
    }
}

/// Summed mode: split on `+`, inherit structural parts, read the first
/// sub-term and add the rest pointwise.
fn read_summed(store: &ScenarioFile, dataset_name: &str) -> FetchResult {
    let (study, default_version) = match structural_parts(store) {
        Some(parts) => parts,
        None => {
            logging::warn(
                DataSource::Store,
                store.path().to_str(),
                "store has no records to infer structural name parts from",
            );
            return FetchResult::default();
        }
    };

    let mut terms: Vec<&str> = dataset_name.split('+').collect();
    if let Some(stripped) = terms[0].strip_suffix(SHIFT_MARKER) {
        terms[0] = stripped;
    }

    // Primary sub-term: an empty read here is the missing-data case that
    // feeds the feature-gate diagnosis.
    let first_path = match term_path(terms[0], &study, &default_version) {
        Some(path) => path,
        None => {
            let message = features::missing_dataset_message(terms[0], store.path());
            logging::warn(DataSource::Store, store.path().to_str(), &message);
            return FetchResult::missing(message);
        }
    };
    let mut series = match store.get(&first_path) {
        Some(series) if !series.is_empty() => series,
        _ => {
            let message = features::missing_dataset_message(terms[0], store.path());
            logging::warn(DataSource::Store, store.path().to_str(), &message);
            return FetchResult::missing(message);
        }
    };

    // Remaining sub-terms add into the running result by array position.
    // There is no time-axis reconciliation; a shorter term simply stops
    // contributing where it ends.
    let mut diagnostics = Vec::new();
    for term in &terms[1..] {
        let addend = term_path(term, &study, &default_version)
            .and_then(|path| store.get(&path));
        match addend {
            Some(addend) => {
                for (value, add) in series.values.iter_mut().zip(addend.values.iter()) {
                    *value += add;
                }
            }
            None => {
                let message =
                    format!("Could not find {} in {}", term, store.path().display());
                logging::warn(DataSource::Store, store.path().to_str(), &message);
                diagnostics.push(message);
            }
        }
    }

    FetchResult { series: Some(series), diagnostics }
}

/// Discovers the structural STUDY and VERSION parts from an arbitrary
/// existing record, assumed constant throughout the store.
fn structural_parts(store: &ScenarioFile) -> Option<(String, String)> {
    let first = store.first_pathname()?;
    let parsed = RecordPath::parse(first)?;
    Some((parsed.study, parsed.version))
}

/// Builds the six-part lookup path for one sub-term. A two-part term
/// inherits the default VERSION; a three-part term supplies its own.
fn term_path(term: &str, study: &str, default_version: &str) -> Option<String> {
    let parts: Vec<&str> = term.split('/').collect();
    if parts.len() < 2 || parts[0].is_empty() || parts[1].is_empty() {
        return None;
    }
    let version = if parts.len() == 2 { default_version } else { parts[parts.len() - 1] };
    Some(format!("/{}/{}/{}//1MON/{}/", study, parts[0], parts[1], version))
}

/// Compacts a series in place to the first index at or after the window
/// start through the last index at or before the window end.
fn trim_to_window(series: &mut MonthlySeries, window: &DateWindow) {
    let first = series
        .times
        .iter()
        .position(|&t| t >= window.start)
        .unwrap_or(series.len());
    let last = series.times.iter().rposition(|&t| t <= window.end);

    match last {
        Some(last) if first <= last => {
            series.times.drain(..first);
            series.times.truncate(last - first + 1);
            series.values.drain(..first);
            series.values.truncate(last - first + 1);
        }
        _ => {
            series.times.clear();
            series.values.clear();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
