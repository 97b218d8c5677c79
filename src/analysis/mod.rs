/// Derived-series calculations for the scenario comparison service.
///
/// Everything here is pure: inputs are fetched series plus the display
/// window, outputs are freshly built series and tables. Nothing is cached;
/// callers recompute whenever the window, units flag, or location changes.
///
/// Submodules:
/// - `diff` — scenario-minus-base difference series.
/// - `annual` — unit conversion and per-water-year accumulation.
/// - `exceedance` — sorted distributions per month, year, and overall.

pub mod annual;
pub mod diff;
pub mod exceedance;
