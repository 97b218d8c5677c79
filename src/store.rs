/// Scenario store access.
///
/// One scenario run is stored as one JSON file holding every monthly record
/// the model produced, keyed by a six-part record path:
///
/// ```text
/// /STUDY/VARIABLE/CATEGORY/START/1MON/VERSION/
/// ```
///
/// STUDY and VERSION are structural qualifiers constant across a store;
/// callers usually name only VARIABLE/CATEGORY and let the fetch layer
/// inherit the structural parts from an existing record. Monthly values are
/// stored as one continuous block per path, so lookups match on every part
/// except START.
///
/// Stores are opened fresh for every read. There is no handle pooling and
/// no caching; a slow file blocks the caller for the full operation.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::logging::{self, DataSource};
use crate::model::{MonthlySeries, StoreError};
use crate::period;

// ---------------------------------------------------------------------------
// On-disk format
// ---------------------------------------------------------------------------

/// Top-level store file contents.
#[derive(Debug, Deserialize)]
struct StoreContents {
    /// Record path → record. A BTreeMap keeps catalog order stable, so
    /// structural-part inference always inspects the same record.
    records: BTreeMap<String, RawRecord>,
}

/// One stored record: a regular monthly block.
#[derive(Debug, Deserialize)]
struct RawRecord {
    /// Unit label, e.g. "CFS" or "TAF".
    units: String,
    /// First month of the block, "YYYY-MM".
    start: String,
    /// One value per month from `start`.
    values: Vec<f64>,
}

// ---------------------------------------------------------------------------
// Record paths
// ---------------------------------------------------------------------------

/// A parsed six-part record path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPath {
    pub study: String,
    pub variable: String,
    pub category: String,
    pub start: String,
    pub interval: String,
    pub version: String,
}

impl RecordPath {
    /// Parses `/STUDY/VARIABLE/CATEGORY/START/1MON/VERSION/`. Returns `None`
    /// for anything that does not have exactly six parts.
    pub fn parse(path: &str) -> Option<RecordPath> {
        let parts: Vec<&str> = path.split('/').collect();
        // Leading and trailing slash produce empty first/last elements.
        if parts.len() != 8 || !parts[0].is_empty() || !parts[7].is_empty() {
            return None;
        }
        Some(RecordPath {
            study: parts[1].to_string(),
            variable: parts[2].to_string(),
            category: parts[3].to_string(),
            start: parts[4].to_string(),
            interval: parts[5].to_string(),
            version: parts[6].to_string(),
        })
    }

    /// Dataset name as displayed: VARIABLE/CATEGORY.
    pub fn dataset_name(&self) -> String {
        format!("{}/{}", self.variable, self.category)
    }

    /// Lookup equality: every part except START. A store keeps one
    /// continuous block per dataset, so the block's own start date is not
    /// part of the caller's key.
    pub fn matches(&self, other: &RecordPath) -> bool {
        self.study == other.study
            && self.variable == other.variable
            && self.category == other.category
            && self.interval == other.interval
            && self.version == other.version
    }
}

// ---------------------------------------------------------------------------
// Store handle
// ---------------------------------------------------------------------------

/// An open scenario store file.
#[derive(Debug)]
pub struct ScenarioFile {
    path: PathBuf,
    contents: StoreContents,
}

impl ScenarioFile {
    /// Opens and decodes a store file.
    pub fn open(path: &Path) -> Result<ScenarioFile, StoreError> {
        let text = fs::read_to_string(path)?;
        let contents: StoreContents = serde_json::from_str(&text)
            .map_err(|e| StoreError::Decode(format!("{}: {}", path.display(), e)))?;
        Ok(ScenarioFile { path: path.to_path_buf(), contents })
    }

    /// All record paths in the store, in catalog order.
    pub fn pathnames(&self) -> Vec<&str> {
        self.contents.records.keys().map(String::as_str).collect()
    }

    /// An arbitrary existing record path, used to discover the structural
    /// STUDY and VERSION parts of this store.
    pub fn first_pathname(&self) -> Option<&str> {
        self.contents.records.keys().next().map(String::as_str)
    }

    pub fn record_count(&self) -> usize {
        self.contents.records.len()
    }

    /// Short name of this store: path and extension stripped.
    pub fn short_name(&self) -> String {
        short_name(&self.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads one record by path, matching on every part except START.
    ///
    /// Returns `None` when no record matches or the matching record cannot
    /// be decoded (bad start month); decode problems are logged, not raised.
    pub fn get(&self, path: &str) -> Option<MonthlySeries> {
        let wanted = RecordPath::parse(path)?;
        for (key, raw) in &self.contents.records {
            let candidate = match RecordPath::parse(key) {
                Some(p) => p,
                None => continue,
            };
            if !candidate.matches(&wanted) {
                continue;
            }
            return match decode_record(&candidate, raw, &self.short_name()) {
                Some(series) => Some(series),
                None => {
                    logging::warn(
                        DataSource::Store,
                        self.path.to_str(),
                        &format!("record {} has an undecodable start month '{}'", key, raw.start),
                    );
                    None
                }
            };
        }
        None
    }
}

/// Short (path-stripped, extension-stripped) name of a store file.
pub fn short_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn decode_record(path: &RecordPath, raw: &RawRecord, scenario: &str) -> Option<MonthlySeries> {
    let (year, month) = parse_start_month(&raw.start)?;
    let first = period::stamp(year, month);
    let times = (0..raw.values.len() as i32).map(|i| first + i).collect();
    Some(MonthlySeries {
        times,
        values: raw.values.clone(),
        units: raw.units.clone(),
        scenario: scenario.to_string(),
        name: path.dataset_name(),
    })
}

fn parse_start_month(s: &str) -> Option<(i32, u32)> {
    let (y, m) = s.split_once('-')?;
    let year: i32 = y.parse().ok()?;
    let month: u32 = m.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    Some((year, month))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
