/// Data sources for the dashboard.
///
/// `api` talks to the backend's read-only JSON endpoints. The same
/// `WaterApi` trait is implemented by the simulated backend in `dev_mode`.

pub mod api;

pub use api::{HttpApi, WaterApi};
