/// Scenario-minus-base difference series.

use crate::model::MonthlySeries;

/// Computes the difference between each scenario and the base.
///
/// The base is `series[0]`. The result has one entry fewer than the input:
/// entry `i` is a copy of scenario `i + 1` with each value replaced by
/// `scenario[i + 1][j] - base[j]`.
///
/// Precondition (unchecked): the base and every scenario have identical
/// length and time alignment. Mismatched inputs are not reconciled here;
/// feeding a scenario longer than the base is a caller error.
pub fn difference_series(series: &[MonthlySeries]) -> Vec<MonthlySeries> {
    if series.is_empty() {
        return Vec::new();
    }
    let mut results = Vec::with_capacity(series.len() - 1);
    for scenario in &series[1..] {
        let mut diff = scenario.clone();
        for (j, value) in diff.values.iter_mut().enumerate() {
            *value -= series[0].values[j];
        }
        results.push(diff);
    }
    results
}
