//! Alert classification and timestamp handling.
//!
//! - `thresholds`: the parameter limits that raise alerts, and the
//!   category buckets the analytics bar chart counts.
//! - `timestamps`: timestamp parsing and "how long ago" formatting, with
//!   an injected clock.

pub mod thresholds;
pub mod timestamps;
