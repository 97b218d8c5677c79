/// Unit conversion and per-water-year accumulation.
///
/// Monthly flow rates (CFS) and monthly volumes (TAF) are related through a
/// fixed per-day factor pair and the true number of days in each calendar
/// month:
///
/// ```text
/// volume_taf = rate_cfs * days_in_month * CFS_TO_TAF_PER_DAY
/// rate_cfs   = volume_taf * TAF_PER_DAY_TO_CFS / days_in_month
/// ```
///
/// The factors are reciprocal, so converting a value one way and back
/// reproduces it to floating tolerance.
///
/// Accumulation walks every point of every series whose unit label matches
/// the expected pre-conversion unit exactly, summing the converted monthly
/// value into a (dataset, water year) cell. Series in any other unit are
/// left untouched and their annual totals stay zero.

use crate::model::{MonthlySeries, UNITS_CFS, UNITS_TAF, UNITS_TAF_PER_YEAR};
use crate::period::{self, DateWindow};

// ---------------------------------------------------------------------------
// Conversion factors
// ---------------------------------------------------------------------------

/// Thousand acre-feet accumulated per day by a flow of one CFS.
pub const CFS_TO_TAF_PER_DAY: f64 = 0.001983471;

/// Flow in CFS that accumulates one TAF per day.
pub const TAF_PER_DAY_TO_CFS: f64 = 504.166667;

/// Volume in TAF accumulated over one calendar month at a constant rate.
pub fn monthly_volume_taf(rate_cfs: f64, year: i32, month: u32) -> f64 {
    rate_cfs * period::days_in_month(year, month) * CFS_TO_TAF_PER_DAY
}

/// Constant rate in CFS that accumulates a month's volume.
pub fn monthly_rate_cfs(volume_taf: f64, year: i32, month: u32) -> f64 {
    let days = period::days_in_month(year, month);
    if days == 0.0 { 0.0 } else { volume_taf * TAF_PER_DAY_TO_CFS / days }
}

// ---------------------------------------------------------------------------
// Annual table
// ---------------------------------------------------------------------------

/// Per-(dataset, water year) running totals over a display window.
///
/// Rows are datasets in fetch order (primaries first, then secondaries);
/// columns are water years `start_wy..=end_wy`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnualTable {
    start_wy: i32,
    end_wy: i32,
    totals: Vec<Vec<f64>>,
}

impl AnnualTable {
    /// A zero-filled table covering the window's water years.
    pub fn zeroed(window: &DateWindow, datasets: usize) -> AnnualTable {
        AnnualTable {
            start_wy: window.start_wy,
            end_wy: window.end_wy,
            totals: vec![vec![0.0; window.water_years()]; datasets],
        }
    }

    pub fn start_wy(&self) -> i32 {
        self.start_wy
    }

    pub fn datasets(&self) -> usize {
        self.totals.len()
    }

    /// Water years per dataset, `end_wy - start_wy + 1`.
    pub fn years(&self) -> usize {
        self.totals.first().map_or(0, Vec::len)
    }

    /// Total for a dataset and water year; zero outside the table bounds.
    pub fn get(&self, dataset: usize, wy: i32) -> f64 {
        let col = wy - self.start_wy;
        if col < 0 {
            return 0.0;
        }
        self.totals
            .get(dataset)
            .and_then(|row| row.get(col as usize))
            .copied()
            .unwrap_or(0.0)
    }

    /// One dataset's totals in water-year order.
    pub fn row(&self, dataset: usize) -> &[f64] {
        &self.totals[dataset]
    }

    fn add(&mut self, dataset: usize, wy: i32, amount: f64) {
        let col = wy - self.start_wy;
        if col < 0 {
            return;
        }
        if let Some(cell) = self
            .totals
            .get_mut(dataset)
            .and_then(|row| row.get_mut(col as usize))
        {
            *cell += amount;
        }
    }
}

/// Accumulation output: totals for every dataset, plus scenario-minus-base
/// differences over the primary datasets when more than one exists.
#[derive(Debug)]
pub struct AnnualResult {
    pub totals: AnnualTable,
    pub differences: Option<AnnualTable>,
}

// ---------------------------------------------------------------------------
// Accumulation
// ---------------------------------------------------------------------------

/// Accumulates annual volumes (TAF) for rate (CFS) series, and rewrites the
/// monthly values in place as volumes unless the display flag keeps native
/// rate units.
pub fn accumulate_volume_for_rate(
    primary: &mut [MonthlySeries],
    secondary: Option<&mut [MonthlySeries]>,
    window: &DateWindow,
    display_rate_units: bool,
) -> AnnualResult {
    convert_and_accumulate(
        primary,
        secondary,
        window,
        UNITS_CFS,
        monthly_volume_taf,
        !display_rate_units,
        UNITS_TAF_PER_YEAR,
    )
}

/// Accumulates annual rates (CFS) for volume (TAF) series, and rewrites the
/// monthly values in place as rates when the display flag requests rate
/// units.
pub fn accumulate_rate_for_volume(
    primary: &mut [MonthlySeries],
    secondary: Option<&mut [MonthlySeries]>,
    window: &DateWindow,
    display_rate_units: bool,
) -> AnnualResult {
    convert_and_accumulate(
        primary,
        secondary,
        window,
        UNITS_TAF,
        monthly_rate_cfs,
        display_rate_units,
        UNITS_CFS,
    )
}

/// Shared body for both directions: swap the expected label, the conversion
/// form, and the rewrite condition.
fn convert_and_accumulate(
    primary: &mut [MonthlySeries],
    secondary: Option<&mut [MonthlySeries]>,
    window: &DateWindow,
    expected_units: &str,
    convert: fn(f64, i32, u32) -> f64,
    rewrite: bool,
    rewritten_label: &str,
) -> AnnualResult {
    let secondary_count = secondary.as_ref().map_or(0, |s| s.len());
    let mut totals = AnnualTable::zeroed(window, primary.len() + secondary_count);

    for (i, series) in primary.iter_mut().enumerate() {
        accumulate_series(series, i, &mut totals, expected_units, convert, rewrite, rewritten_label);
    }
    if let Some(secondary) = secondary {
        let offset = primary.len();
        for (i, series) in secondary.iter_mut().enumerate() {
            accumulate_series(
                series,
                offset + i,
                &mut totals,
                expected_units,
                convert,
                rewrite,
                rewritten_label,
            );
        }
    }

    // Differences are a primary-series concept: scenario minus base per
    // water year, only meaningful when there is a scenario besides the base.
    let differences = if primary.len() > 1 {
        let mut diff = AnnualTable::zeroed(window, primary.len() - 1);
        for i in 0..primary.len() - 1 {
            for col in 0..diff.years() {
                let wy = window.start_wy + col as i32;
                diff.totals[i][col] = totals.get(i + 1, wy) - totals.get(0, wy);
            }
        }
        Some(diff)
    } else {
        None
    };

    AnnualResult { totals, differences }
}

fn accumulate_series(
    series: &mut MonthlySeries,
    dataset: usize,
    totals: &mut AnnualTable,
    expected_units: &str,
    convert: fn(f64, i32, u32) -> f64,
    rewrite: bool,
    rewritten_label: &str,
) {
    if series.units != expected_units {
        return;
    }
    for j in 0..series.values.len() {
        let t = series.times[j];
        let converted = convert(series.values[j], period::year_of(t), period::month_of(t));
        totals.add(dataset, period::water_year(t), converted);
        if rewrite {
            series.values[j] = converted;
        }
    }
    if rewrite {
        series.units = rewritten_label.to_string();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::stamp;

    fn cfs_series(scenario: &str, start_year: i32, start_month: u32, values: Vec<f64>) -> MonthlySeries {
        let first = stamp(start_year, start_month);
        MonthlySeries {
            times: (0..values.len() as i32).map(|i| first + i).collect(),
            values,
            units: UNITS_CFS.to_string(),
            scenario: scenario.to_string(),
            name: "C_SACFEA/FLOW-CHANNEL".to_string(),
        }
    }

    fn one_year_window() -> DateWindow {
        DateWindow::parse("Oct1921-Sep1922").unwrap()
    }

    #[test]
    fn test_rate_volume_round_trip() {
        for (year, month) in [(1921, 10), (1922, 2), (1924, 2), (1921, 12)] {
            for value in [0.0, 1.0, 123.456, 50_000.0] {
                let taf = monthly_volume_taf(value, year, month);
                let back = monthly_rate_cfs(taf, year, month);
                assert!(
                    (back - value).abs() < 1e-6 * value.abs().max(1.0),
                    "round trip failed for {} at {}-{}: got {}",
                    value,
                    year,
                    month,
                    back
                );
            }
        }
    }

    #[test]
    fn test_monthly_volume_uses_true_month_length() {
        // October has 31 days, September 30: same rate, different volume.
        let oct = monthly_volume_taf(100.0, 1921, 10);
        let sep = monthly_volume_taf(100.0, 1921, 9);
        assert!((oct - 100.0 * 31.0 * CFS_TO_TAF_PER_DAY).abs() < 1e-12);
        assert!((sep - 100.0 * 30.0 * CFS_TO_TAF_PER_DAY).abs() < 1e-12);
        assert!(oct > sep);
    }

    #[test]
    fn test_accumulation_splits_on_water_year_boundary() {
        // Sep 1922 belongs to WY1922; Oct 1922 opens WY1923.
        let window = DateWindow::parse("Oct1921-Sep1923").unwrap();
        let mut primary = vec![cfs_series("base", 1922, 9, vec![100.0, 100.0])];
        let result = accumulate_volume_for_rate(&mut primary, None, &window, true);

        let sep = monthly_volume_taf(100.0, 1922, 9);
        let oct = monthly_volume_taf(100.0, 1922, 10);
        assert!((result.totals.get(0, 1922) - sep).abs() < 1e-9);
        assert!((result.totals.get(0, 1923) - oct).abs() < 1e-9);

        // Keeping native units must leave the series untouched.
        assert_eq!(primary[0].units, UNITS_CFS);
        assert_eq!(primary[0].values, vec![100.0, 100.0]);
    }

    #[test]
    fn test_rewrite_when_display_flag_requests_volumes() {
        let mut primary = vec![cfs_series("base", 1921, 10, vec![100.0, 200.0])];
        accumulate_volume_for_rate(&mut primary, None, &one_year_window(), false);

        assert_eq!(primary[0].units, UNITS_TAF_PER_YEAR);
        assert!((primary[0].values[0] - monthly_volume_taf(100.0, 1921, 10)).abs() < 1e-9);
        assert!((primary[0].values[1] - monthly_volume_taf(200.0, 1921, 11)).abs() < 1e-9);
    }

    #[test]
    fn test_mismatched_units_accumulate_nothing_and_rewrite_nothing() {
        let mut series = cfs_series("base", 1921, 10, vec![100.0]);
        series.units = UNITS_TAF.to_string();
        let mut primary = vec![series];
        let result = accumulate_volume_for_rate(&mut primary, None, &one_year_window(), false);

        assert_eq!(result.totals.get(0, 1922), 0.0);
        assert_eq!(primary[0].units, UNITS_TAF);
        assert_eq!(primary[0].values, vec![100.0]);
    }

    #[test]
    fn test_volume_to_rate_direction_is_symmetric() {
        let taf = monthly_volume_taf(100.0, 1921, 10);
        let mut series = cfs_series("base", 1921, 10, vec![taf]);
        series.units = UNITS_TAF.to_string();
        let mut primary = vec![series];
        let result =
            accumulate_rate_for_volume(&mut primary, None, &one_year_window(), true);

        assert!((result.totals.get(0, 1922) - 100.0).abs() < 1e-6);
        assert_eq!(primary[0].units, UNITS_CFS);
        assert!((primary[0].values[0] - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_differences_computed_only_with_multiple_primaries() {
        let window = one_year_window();
        let mut single = vec![cfs_series("base", 1921, 10, vec![100.0])];
        let result = accumulate_volume_for_rate(&mut single, None, &window, true);
        assert!(result.differences.is_none());

        let mut multiple = vec![
            cfs_series("base", 1921, 10, vec![100.0]),
            cfs_series("alt1", 1921, 10, vec![150.0]),
        ];
        let result = accumulate_volume_for_rate(&mut multiple, None, &window, true);
        let diff = result.differences.expect("two primaries produce a difference table");
        assert_eq!(diff.datasets(), 1);
        let expected = monthly_volume_taf(50.0, 1921, 10);
        assert!((diff.get(0, 1922) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_secondary_series_index_after_primaries() {
        let window = one_year_window();
        let mut primary = vec![
            cfs_series("base", 1921, 10, vec![100.0]),
            cfs_series("alt1", 1921, 10, vec![100.0]),
        ];
        let mut secondary = vec![cfs_series("base", 1921, 10, vec![40.0])];
        let result = accumulate_volume_for_rate(
            &mut primary,
            Some(&mut secondary),
            &window,
            true,
        );

        assert_eq!(result.totals.datasets(), 3);
        let expected = monthly_volume_taf(40.0, 1921, 10);
        assert!((result.totals.get(2, 1922) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_points_before_window_start_are_ignored() {
        // A point in WY1921 lies before an Oct1921-Sep1922 window's first
        // water year; it must not panic or leak into the table.
        let mut primary = vec![cfs_series("base", 1921, 9, vec![100.0, 100.0])];
        let result = accumulate_volume_for_rate(&mut primary, None, &one_year_window(), true);
        assert!((result.totals.get(0, 1922) - monthly_volume_taf(100.0, 1921, 10)).abs() < 1e-9);
        assert_eq!(result.totals.get(0, 1921), 0.0);
    }

    #[test]
    fn test_table_get_out_of_range_is_zero() {
        let table = AnnualTable::zeroed(&one_year_window(), 1);
        assert_eq!(table.get(0, 1900), 0.0);
        assert_eq!(table.get(0, 2100), 0.0);
        assert_eq!(table.get(5, 1922), 0.0);
        assert_eq!(table.years(), 1);
    }
}
