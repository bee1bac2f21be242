/// Aggregate figures for the analytics page.
///
/// The backend already serves averages and a grade distribution; this
/// module turns them into what the page shows and computes the same
/// aggregates locally for the simulated backend.
///
/// Submodules:
/// - `summary`: overall quality score, averages, pH-based distribution.

pub mod summary;
