/// Event organization helpers for the earthquake monitor.
///
/// Submodules:
/// - `proximity`: splits a fetched batch into "near the region" and
///   "globally significant" lists.
/// - `descriptions`: human-readable labels and the place search filter.

pub mod descriptions;
pub mod proximity;
