//! Scenario comparison engine for monthly water-planning model results.
//!
//! Given an ordered list of scenario store files with a distinguished base,
//! this crate resolves a location code to dataset names, reads the monthly
//! series for every scenario, and derives the series a comparison chart
//! needs: scenario-minus-base differences, unit-converted and annualized
//! totals per water year, and sorted probability-of-exceedance
//! distributions.
//!
//! Typical usage:
//!
//! ```no_run
//! use calscen_service::locations::{LinkTable, LocationResolver};
//! use calscen_service::scenarios::{RequestBuilder, ScenarioSet};
//!
//! let resolver = LocationResolver::new(LinkTable::default(), LinkTable::default());
//! let request = RequestBuilder::new()
//!     .date_range("Oct1921-Sep2003")
//!     .base("Scenarios/Base_DV.json")
//!     .scenario("Scenarios/Alt1_DV.json")
//!     .location(resolver.resolve("C_SACFEA"))
//!     .build()?;
//! let mut set = ScenarioSet::new(request);
//! let mut primary: Vec<_> = set.primary_series().into_iter().flatten().collect();
//! set.calc_volume_for_rate(&mut primary, None);
//! let exceedance = set.exceedance_series(&primary);
//! # Ok::<(), calscen_service::model::PreconditionError>(())
//! ```
//!
//! Everything is recomputed on demand; nothing is cached between calls and
//! nothing is persisted. Chart rendering and widget wiring live outside
//! this crate.

pub mod analysis;
pub mod config;
pub mod features;
pub mod fetch;
pub mod locations;
pub mod logging;
pub mod model;
pub mod period;
pub mod scenarios;
pub mod store;
pub mod verify;
