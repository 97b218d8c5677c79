//! End-to-end scenario comparison over a full 82-year record.
//!
//! Builds three scenario stores on disk (base "A" plus "B" and "C"), each
//! with one point per month from Oct 1921 through Sep 2003, and drives the
//! whole pipeline: fetch, difference, annualization, exceedance.

use std::path::PathBuf;

use calscen_service::analysis::exceedance::{SLICE_ALL, SLICE_ANNUAL, SLICE_COUNT};
use calscen_service::locations::LocationLabels;
use calscen_service::model::MonthlySeries;
use calscen_service::scenarios::{RequestBuilder, ScenarioSet};
use serde_json::json;

const MONTHS: usize = 984; // 82 years * 12
const WATER_YEARS: i32 = 82;

/// Deterministic but non-monotonic monthly flow for the base scenario.
fn base_value(i: usize) -> f64 {
    1000.0 + ((i * 37) % 500) as f64
}

fn write_store(dir: &PathBuf, name: &str, offset: f64) -> PathBuf {
    let values: Vec<f64> = (0..MONTHS).map(|i| base_value(i) + offset).collect();
    let body = json!({
        "records": {
            "/CALSCEN/C_SACFEA/FLOW-CHANNEL/01OCT1921/1MON/2020D09E/": {
                "units": "CFS",
                "start": "1921-10",
                "values": values
            }
        }
    });
    let path = dir.join(name);
    std::fs::write(&path, body.to_string()).unwrap();
    path
}

/// Each test gets its own directory so parallel test threads never read a
/// store another thread is mid-write on.
fn build_set(tag: &str) -> ScenarioSet {
    let dir = std::env::temp_dir().join(format!("calscen_pipeline_{}", tag));
    std::fs::create_dir_all(&dir).unwrap();
    let a = write_store(&dir, "A.json", 0.0);
    let b = write_store(&dir, "B.json", 10.0);
    let c = write_store(&dir, "C.json", -5.0);

    let request = RequestBuilder::new()
        .date_range("Oct1921-Sep2003")
        .base(&a)
        .scenarios([&a, &b, &c])
        .location(LocationLabels {
            primary_name: "C_SACFEA/FLOW-CHANNEL".to_string(),
            y_label: "CFS".to_string(),
            title: "Sacramento below Feather".to_string(),
            ..LocationLabels::default()
        })
        .display_rate_units(true)
        .build()
        .expect("request is complete");
    ScenarioSet::new(request)
}

fn fetch_primary(set: &mut ScenarioSet) -> Vec<MonthlySeries> {
    let fetched = set.primary_series();
    assert_eq!(fetched.len(), 3);
    fetched
        .into_iter()
        .map(|s| s.expect("every store exists and holds the dataset"))
        .collect()
}

#[test]
fn test_fetch_gives_base_first_with_full_window() {
    let mut set = build_set("fetch");
    let primary = fetch_primary(&mut set);

    assert_eq!(primary[0].scenario, "A", "base must be ordered first");
    assert_eq!(primary[1].scenario, "B");
    assert_eq!(primary[2].scenario, "C");
    for series in &primary {
        assert_eq!(series.len(), MONTHS, "each scenario spans the full window");
        assert_eq!(series.units, "CFS");
    }
    assert_eq!(set.original_units(), "CFS");
    assert!(set.messages().is_empty(), "clean fetch leaves no diagnostics");
}

#[test]
fn test_difference_series_against_base() {
    let mut set = build_set("diff");
    let primary = fetch_primary(&mut set);

    let differences = set.difference_series(&primary);
    assert_eq!(differences.len(), 2, "one difference per non-base scenario");
    for diff in &differences {
        assert_eq!(diff.len(), MONTHS);
    }
    assert!(differences[0].values.iter().all(|v| (v - 10.0).abs() < 1e-9));
    assert!(differences[1].values.iter().all(|v| (v + 5.0).abs() < 1e-9));
}

#[test]
fn test_annualization_covers_every_water_year() {
    let mut set = build_set("annual");
    let mut primary = fetch_primary(&mut set);
    set.calc_volume_for_rate(&mut primary, None);

    // display_rate_units is set, so monthly values stay native CFS.
    assert_eq!(primary[0].units, "CFS");

    for dataset in 0..3 {
        for wy in 1922..(1922 + WATER_YEARS) {
            assert!(
                set.annual_volume(dataset, wy) > 0.0,
                "dataset {} water year {} should have accumulated",
                dataset,
                wy
            );
        }
    }

    // B runs 10 CFS above A every month, so every annual difference is
    // positive; C runs below, so every difference is negative.
    for wy in 1922..(1922 + WATER_YEARS) {
        assert!(set.annual_volume_diff(0, wy) > 0.0);
        assert!(set.annual_volume_diff(1, wy) < 0.0);
    }
}

#[test]
fn test_exceedance_slices_over_full_record() {
    let mut set = build_set("exceedance");
    let mut primary = fetch_primary(&mut set);
    set.calc_volume_for_rate(&mut primary, None);

    let exceedance = set.exceedance_series(&primary);
    assert_eq!(exceedance.len(), SLICE_COUNT);
    for row in &exceedance {
        assert_eq!(row.len(), 3);
    }

    // Month slice 1 holds the 82 January values, sorted ascending.
    let january = &exceedance[1][0];
    assert_eq!(january.len(), WATER_YEARS as usize);
    assert!(january.values.windows(2).all(|w| w[0] <= w[1]));

    // The aggregate slice duplicates the unsliced series.
    let all = &exceedance[SLICE_ALL][0];
    assert_eq!(all.len(), MONTHS);

    // The annual slice holds one point per water year, dated November.
    let annual = &exceedance[SLICE_ANNUAL][0];
    assert_eq!(annual.len(), WATER_YEARS as usize);
    for slice_row in &exceedance {
        for series in slice_row {
            assert!(
                series.values.windows(2).all(|w| w[0] <= w[1]),
                "every slice is sorted ascending"
            );
        }
    }
}

#[test]
fn test_exceedance_differences_over_full_record() {
    let mut set = build_set("exceedance_diff");
    let mut primary = fetch_primary(&mut set);
    set.calc_volume_for_rate(&mut primary, None);

    let exceedance = set.exceedance_series_difference(&primary);
    assert_eq!(exceedance.len(), SLICE_COUNT);
    for row in &exceedance {
        assert_eq!(row.len(), 2, "difference rows exclude the base");
    }

    // B minus A is +10 at every month of every slice below the annual one.
    for slice in 0..SLICE_ANNUAL {
        for value in &exceedance[slice][0].values {
            assert!((value - 10.0).abs() < 1e-9);
        }
    }
    // Annual totals difference: 10 CFS converted across a year is positive.
    assert!(exceedance[SLICE_ANNUAL][0].values.iter().all(|v| *v > 0.0));
}
