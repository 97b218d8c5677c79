/// Scenario-set orchestration: one immutable fetch request driving every
/// read and calculation for a comparison display.
///
/// A request is built once through `RequestBuilder` and validated before
/// any store I/O; a half-configured request cannot be fetched. The
/// `ScenarioSet` then owns the request plus the derived state a display
/// needs across calls: the original units of the primary series, the annual
/// accumulation tables, and the user-facing message collector.
///
/// Fetches are synchronous and sequential — one store open per scenario per
/// dataset, no pooling, no timeout. The set is a single-consumer object and
/// is not meant to be shared across threads.

use std::path::{Path, PathBuf};

use crate::analysis::annual::{self, AnnualTable};
use crate::analysis::{diff, exceedance};
use crate::fetch;
use crate::locations::LocationLabels;
use crate::model::{MonthlySeries, PreconditionError};
use crate::period::DateWindow;
use crate::store;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Everything a fetch needs, fixed at build time.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub window: DateWindow,
    /// Base scenario store file; always ordered first in results and used
    /// as the subtrahend for every difference.
    pub base: PathBuf,
    /// Scenario store files in display order. May include the base; it is
    /// fetched once regardless.
    pub scenarios: Vec<PathBuf>,
    /// Resolved dataset names and labels for the current location.
    pub location: LocationLabels,
    /// When true, flow series keep their native rate units (CFS) on
    /// screen; when false, monthly rates are rewritten as volumes.
    pub display_rate_units: bool,
}

/// Step-by-step construction of a `FetchRequest`.
#[derive(Debug, Default)]
pub struct RequestBuilder {
    window: Option<DateWindow>,
    base: Option<PathBuf>,
    scenarios: Vec<PathBuf>,
    location: LocationLabels,
    display_rate_units: bool,
}

impl RequestBuilder {
    pub fn new() -> RequestBuilder {
        RequestBuilder::default()
    }

    /// Sets the display window from a "mmmyyyy-mmmyyyy" range string.
    /// Malformed input leaves the window unset; the readiness check will
    /// then refuse to build, which disables reads until corrected.
    pub fn date_range(mut self, range: &str) -> RequestBuilder {
        self.window = DateWindow::parse(range);
        self
    }

    /// Sets the display window directly.
    pub fn window(mut self, window: DateWindow) -> RequestBuilder {
        self.window = Some(window);
        self
    }

    pub fn base(mut self, base: impl Into<PathBuf>) -> RequestBuilder {
        self.base = Some(base.into());
        self
    }

    pub fn scenario(mut self, scenario: impl Into<PathBuf>) -> RequestBuilder {
        self.scenarios.push(scenario.into());
        self
    }

    pub fn scenarios<I, P>(mut self, scenarios: I) -> RequestBuilder
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.scenarios.extend(scenarios.into_iter().map(Into::into));
        self
    }

    pub fn location(mut self, location: LocationLabels) -> RequestBuilder {
        self.location = location;
        self
    }

    pub fn display_rate_units(mut self, display_rate_units: bool) -> RequestBuilder {
        self.display_rate_units = display_rate_units;
        self
    }

    /// Names the first unmet precondition, or `None` when the request is
    /// complete. Runs before any I/O.
    pub fn check_readiness(&self) -> Option<String> {
        if self.window.is_none() {
            Some("Date range is not set.".to_string())
        } else if self.base.is_none() {
            Some("Base scenario is not set.".to_string())
        } else if self.location.primary_name.is_empty() {
            Some("Primary dataset name is not set.".to_string())
        } else {
            None
        }
    }

    /// Builds the immutable request, failing with the readiness message
    /// when a precondition is unmet.
    pub fn build(self) -> Result<FetchRequest, PreconditionError> {
        let window = self
            .window
            .ok_or_else(|| PreconditionError("Date range is not set.".to_string()))?;
        let base = self
            .base
            .ok_or_else(|| PreconditionError("Base scenario is not set.".to_string()))?;
        if self.location.primary_name.is_empty() {
            return Err(PreconditionError("Primary dataset name is not set.".to_string()));
        }
        Ok(FetchRequest {
            window,
            base,
            scenarios: self.scenarios,
            location: self.location,
            display_rate_units: self.display_rate_units,
        })
    }
}

// ---------------------------------------------------------------------------
// Scenario set
// ---------------------------------------------------------------------------

/// Fetch and calculation surface for one comparison display.
pub struct ScenarioSet {
    request: FetchRequest,
    original_units: String,
    annual_volumes: Option<AnnualTable>,
    annual_volumes_diff: Option<AnnualTable>,
    annual_rates: Option<AnnualTable>,
    annual_rates_diff: Option<AnnualTable>,
    messages: Vec<String>,
}

impl ScenarioSet {
    pub fn new(request: FetchRequest) -> ScenarioSet {
        ScenarioSet {
            request,
            original_units: String::new(),
            annual_volumes: None,
            annual_volumes_diff: None,
            annual_rates: None,
            annual_rates_diff: None,
            messages: Vec::new(),
        }
    }

    pub fn request(&self) -> &FetchRequest {
        &self.request
    }

    /// Short name of the base scenario file, path and extension stripped.
    pub fn base_short_name(&self) -> String {
        store::short_name(&self.request.base)
    }

    /// Units of the primary series as read from the store, captured by the
    /// last `primary_series` call before any rewrite.
    pub fn original_units(&self) -> &str {
        &self.original_units
    }

    // -- Fetching ----------------------------------------------------------

    /// Reads the primary dataset for every scenario: base first, exactly
    /// once, then the remaining scenarios in list order with any base
    /// occurrence skipped. A slot is `None` when that scenario's read
    /// failed or found no data.
    pub fn primary_series(&mut self) -> Vec<Option<MonthlySeries>> {
        let name = self.request.location.primary_name.clone();
        let results = self.fetch_for_each(&name);
        self.original_units = results
            .first()
            .and_then(|base| base.as_ref())
            .map(|series| series.units.clone())
            .unwrap_or_default();
        results
    }

    /// Reads the secondary (control) dataset for every scenario, or `None`
    /// when the location has no secondary series.
    pub fn secondary_series(&mut self) -> Option<Vec<Option<MonthlySeries>>> {
        let name = self.request.location.secondary_name.clone();
        if name.is_empty() || name == "null" {
            return None;
        }
        Some(self.fetch_for_each(&name))
    }

    fn fetch_for_each(&mut self, dataset_name: &str) -> Vec<Option<MonthlySeries>> {
        let ordered = self.ordered_scenarios();
        let mut results = Vec::with_capacity(ordered.len());
        for path in ordered {
            let outcome = fetch::fetch_one_series(&path, dataset_name, &self.request.window);
            self.messages.extend(outcome.diagnostics);
            results.push(outcome.series);
        }
        results
    }

    /// Base first, then every non-base scenario in its original order.
    fn ordered_scenarios(&self) -> Vec<PathBuf> {
        let mut ordered = vec![self.request.base.clone()];
        ordered.extend(
            self.request
                .scenarios
                .iter()
                .filter(|s| **s != self.request.base)
                .cloned(),
        );
        ordered
    }

    // -- Calculations ------------------------------------------------------

    /// Scenario-minus-base monthly differences; see `analysis::diff`.
    pub fn difference_series(&self, series: &[MonthlySeries]) -> Vec<MonthlySeries> {
        diff::difference_series(series)
    }

    /// Accumulates annual volumes for rate series and, unless rate display
    /// was requested, rewrites the monthly values as volumes in place.
    pub fn calc_volume_for_rate(
        &mut self,
        primary: &mut [MonthlySeries],
        secondary: Option<&mut [MonthlySeries]>,
    ) {
        let result = annual::accumulate_volume_for_rate(
            primary,
            secondary,
            &self.request.window,
            self.request.display_rate_units,
        );
        self.annual_volumes = Some(result.totals);
        self.annual_volumes_diff = result.differences;
    }

    /// Accumulates annual rates for volume series and, when rate display
    /// was requested, rewrites the monthly values as rates in place.
    pub fn calc_rate_for_volume(
        &mut self,
        primary: &mut [MonthlySeries],
        secondary: Option<&mut [MonthlySeries]>,
    ) {
        let result = annual::accumulate_rate_for_volume(
            primary,
            secondary,
            &self.request.window,
            self.request.display_rate_units,
        );
        self.annual_rates = Some(result.totals);
        self.annual_rates_diff = result.differences;
    }

    /// Annual volume total for a dataset and water year; zero until
    /// `calc_volume_for_rate` has run.
    pub fn annual_volume(&self, dataset: usize, wy: i32) -> f64 {
        self.annual_volumes.as_ref().map_or(0.0, |t| t.get(dataset, wy))
    }

    /// Annual volume difference (scenario minus base) for a non-base
    /// dataset index and water year.
    pub fn annual_volume_diff(&self, dataset: usize, wy: i32) -> f64 {
        self.annual_volumes_diff.as_ref().map_or(0.0, |t| t.get(dataset, wy))
    }

    /// Annual rate total for a dataset and water year; zero until
    /// `calc_rate_for_volume` has run.
    pub fn annual_rate(&self, dataset: usize, wy: i32) -> f64 {
        self.annual_rates.as_ref().map_or(0.0, |t| t.get(dataset, wy))
    }

    /// Annual rate difference for a non-base dataset index and water year.
    pub fn annual_rate_diff(&self, dataset: usize, wy: i32) -> f64 {
        self.annual_rates_diff.as_ref().map_or(0.0, |t| t.get(dataset, wy))
    }

    /// Exceedance slices over raw series; the annual slice reads the
    /// volume accumulator (zeros when accumulation has not run).
    pub fn exceedance_series(&self, series: &[MonthlySeries]) -> Vec<Vec<MonthlySeries>> {
        exceedance::exceedance_series(series, &self.annual_table(), &self.request.window)
    }

    /// Exceedance slices of scenario-minus-base differences.
    pub fn exceedance_series_difference(
        &self,
        series: &[MonthlySeries],
    ) -> Vec<Vec<MonthlySeries>> {
        exceedance::exceedance_series_difference(
            series,
            &self.annual_table(),
            &self.request.window,
        )
    }

    fn annual_table(&self) -> AnnualTable {
        self.annual_volumes
            .clone()
            .unwrap_or_else(|| AnnualTable::zeroed(&self.request.window, 0))
    }

    // -- Messages ----------------------------------------------------------

    /// User-facing diagnostics collected since the last clear.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn add_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn clear_messages(&mut self) {
        self.messages.clear();
    }
}

/// Short name of any scenario store path; re-exported convenience for
/// presentation code labeling series.
pub fn scenario_short_name(path: &Path) -> String {
    store::short_name(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
