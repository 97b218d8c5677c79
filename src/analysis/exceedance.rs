/// Probability-of-exceedance slices.
///
/// For every scenario, fourteen independently sorted slices are built from
/// its monthly series, laid out `[slice][scenario]`:
///
/// - slice 0 — the full series, unsliced. This slot filters nothing and so
///   duplicates the input series; kept as-is (flagged as a likely oversight,
///   pending product clarification).
/// - slices 1..=12 — the points falling in that calendar month.
/// - slice 13 — annual totals from the accumulator, one point per water
///   year, dated November 1 of the water year.
///
/// Values in every slice are sorted ascending; exceedance rank/percentile is
/// computed by the consumer from position and slice length. Times are left
/// as collected and are not reordered with the values.

use crate::analysis::annual::AnnualTable;
use crate::model::MonthlySeries;
use crate::period::{self, DateWindow};

/// Number of slices per scenario.
pub const SLICE_COUNT: usize = 14;

/// Slice index of the full, unsliced series.
pub const SLICE_ALL: usize = 0;

/// Slice index of the annual totals.
pub const SLICE_ANNUAL: usize = 13;

// ---------------------------------------------------------------------------
// Raw series
// ---------------------------------------------------------------------------

/// Builds the exceedance slices for each scenario.
///
/// Returns `SLICE_COUNT` rows, each holding one sorted series per scenario.
/// An empty input produces an empty result.
pub fn exceedance_series(
    series: &[MonthlySeries],
    annual: &AnnualTable,
    window: &DateWindow,
) -> Vec<Vec<MonthlySeries>> {
    if series.is_empty() {
        return Vec::new();
    }

    let mut results = Vec::with_capacity(SLICE_COUNT);
    for slice in 0..SLICE_COUNT {
        let mut row = Vec::with_capacity(series.len());
        for (i, scenario) in series.iter().enumerate() {
            let mut built = match slice {
                SLICE_ALL => scenario.clone(),
                SLICE_ANNUAL => annual_slice(scenario, annual, i, window, None),
                month => month_slice(scenario, month as u32),
            };
            sort_values(&mut built);
            row.push(built);
        }
        results.push(row);
    }
    results
}

// ---------------------------------------------------------------------------
// Difference series
// ---------------------------------------------------------------------------

/// Builds exceedance slices of scenario-minus-base differences.
///
/// Covers scenarios `1..` only, subtracting the base's value at the same
/// array position. Scenario and base arrays may differ in length; every
/// subtraction loop is bounded by the shorter of the two, so trailing
/// unmatched points are dropped rather than failing.
pub fn exceedance_series_difference(
    series: &[MonthlySeries],
    annual: &AnnualTable,
    window: &DateWindow,
) -> Vec<Vec<MonthlySeries>> {
    if series.is_empty() {
        return Vec::new();
    }
    let base = &series[0];

    let mut results = Vec::with_capacity(SLICE_COUNT);
    for slice in 0..SLICE_COUNT {
        let mut row = Vec::with_capacity(series.len().saturating_sub(1));
        for (i, scenario) in series.iter().enumerate().skip(1) {
            let mut built = match slice {
                SLICE_ALL => difference_all_slice(scenario, base),
                SLICE_ANNUAL => annual_slice(scenario, annual, i, window, Some(0)),
                month => difference_month_slice(scenario, base, month as u32),
            };
            sort_values(&mut built);
            row.push(built);
        }
        results.push(row);
    }
    results
}

// ---------------------------------------------------------------------------
// Slice builders
// ---------------------------------------------------------------------------

/// Points of one calendar month, in original order.
fn month_slice(scenario: &MonthlySeries, month: u32) -> MonthlySeries {
    let mut times = Vec::new();
    let mut values = Vec::new();
    for (j, &t) in scenario.times.iter().enumerate() {
        if period::month_of(t) == month {
            times.push(t);
            values.push(scenario.values[j]);
        }
    }
    with_points(scenario, times, values)
}

/// Annual totals reconstructed from the accumulator: one point per water
/// year, dated November 1 of the water year. When `subtract_dataset` is
/// set, the slice holds the difference against that dataset's totals.
fn annual_slice(
    scenario: &MonthlySeries,
    annual: &AnnualTable,
    dataset: usize,
    window: &DateWindow,
    subtract_dataset: Option<usize>,
) -> MonthlySeries {
    let mut times = Vec::with_capacity(window.water_years());
    let mut values = Vec::with_capacity(window.water_years());
    for j in 0..window.water_years() {
        let wy = window.start_wy + j as i32;
        let mut value = annual.get(dataset, wy);
        if let Some(base) = subtract_dataset {
            value -= annual.get(base, wy);
        }
        times.push(period::stamp(wy, 11));
        values.push(value);
    }
    with_points(scenario, times, values)
}

/// The full-series difference: a clone of the scenario with the base
/// subtracted positionally, bounded by the shorter array.
fn difference_all_slice(scenario: &MonthlySeries, base: &MonthlySeries) -> MonthlySeries {
    let n = scenario.len().min(base.len());
    let mut diff = scenario.clone();
    diff.times.truncate(n);
    diff.values.truncate(n);
    for (j, value) in diff.values.iter_mut().enumerate() {
        *value -= base.values[j];
    }
    diff
}

/// One calendar month of positional differences; points past the end of the
/// base array are dropped.
fn difference_month_slice(
    scenario: &MonthlySeries,
    base: &MonthlySeries,
    month: u32,
) -> MonthlySeries {
    let mut times = Vec::new();
    let mut values = Vec::new();
    for (j, &t) in scenario.times.iter().enumerate() {
        if period::month_of(t) == month && j < base.values.len() {
            times.push(t);
            values.push(scenario.values[j] - base.values[j]);
        }
    }
    with_points(scenario, times, values)
}

fn with_points(template: &MonthlySeries, times: Vec<i32>, values: Vec<f64>) -> MonthlySeries {
    MonthlySeries {
        times,
        values,
        units: template.units.clone(),
        scenario: template.scenario.clone(),
        name: template.name.clone(),
    }
}

fn sort_values(series: &mut MonthlySeries) {
    series.values.sort_by(f64::total_cmp);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
