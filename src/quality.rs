//! Water quality scoring.
//!
//! The single scorer every view uses to turn a reading into a 0–100 score
//! and a Good/Fair/Poor grade. Four parameters each contribute 25, 15 or 5
//! points depending on which band they fall in.

use crate::model::Reading;

/// Points for a value inside the ideal band.
const BAND_IDEAL: u8 = 25;
/// Points for a value inside the tolerable band.
const BAND_TOLERABLE: u8 = 15;
/// Points for anything else, including a missing value.
const BAND_FAILING: u8 = 5;

pub const GOOD_MIN_SCORE: u8 = 80;
pub const FAIR_MIN_SCORE: u8 = 60;

/// Three-tier grade derived from a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Grade {
    Poor,
    Fair,
    Good,
}

impl Grade {
    pub fn from_score(score: u8) -> Grade {
        if score >= GOOD_MIN_SCORE {
            Grade::Good
        } else if score >= FAIR_MIN_SCORE {
            Grade::Fair
        } else {
            Grade::Poor
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Grade::Good => "Good",
            Grade::Fair => "Fair",
            Grade::Poor => "Poor",
        }
    }

    /// Marker / badge color.
    pub fn color(self) -> &'static str {
        match self {
            Grade::Good => "#198754",
            Grade::Fair => "#ffc107",
            Grade::Poor => "#dc3545",
        }
    }

    /// Lowercase key used by the quality filter and CSS-style classes.
    pub fn key(self) -> &'static str {
        match self {
            Grade::Good => "good",
            Grade::Fair => "fair",
            Grade::Poor => "poor",
        }
    }

    pub fn from_key(key: &str) -> Option<Grade> {
        match key {
            "good" => Some(Grade::Good),
            "fair" => Some(Grade::Fair),
            "poor" => Some(Grade::Poor),
            _ => None,
        }
    }
}

/// Color for a site whose grade is not known yet.
pub const UNKNOWN_COLOR: &str = "#6c757d";

/// Result of scoring one reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityAssessment {
    /// Always within `20..=100`.
    pub score: u8,
    pub grade: Grade,
}

/// Scores four raw readings. A missing (or NaN) value falls into the
/// failing band of its parameter.
pub fn assess_quality(
    ph: Option<f64>,
    temperature: Option<f64>,
    dissolved_oxygen: Option<f64>,
    turbidity: Option<f64>,
) -> QualityAssessment {
    let score = ph_points(ph)
        + temperature_points(temperature)
        + oxygen_points(dissolved_oxygen)
        + turbidity_points(turbidity);

    QualityAssessment {
        score,
        grade: Grade::from_score(score),
    }
}

/// Scores a full reading; conductivity and TDS do not take part.
pub fn assess_reading(reading: &Reading) -> QualityAssessment {
    assess_quality(
        reading.ph,
        reading.temperature,
        reading.dissolved_oxygen,
        reading.turbidity,
    )
}

fn ph_points(value: Option<f64>) -> u8 {
    match value {
        Some(v) if (6.5..=8.5).contains(&v) => BAND_IDEAL,
        Some(v) if (6.0..=9.0).contains(&v) => BAND_TOLERABLE,
        _ => BAND_FAILING,
    }
}

fn temperature_points(value: Option<f64>) -> u8 {
    match value {
        Some(v) if (20.0..=30.0).contains(&v) => BAND_IDEAL,
        Some(v) if (15.0..=35.0).contains(&v) => BAND_TOLERABLE,
        _ => BAND_FAILING,
    }
}

fn oxygen_points(value: Option<f64>) -> u8 {
    match value {
        Some(v) if v >= 6.0 => BAND_IDEAL,
        Some(v) if v >= 4.0 => BAND_TOLERABLE,
        _ => BAND_FAILING,
    }
}

fn turbidity_points(value: Option<f64>) -> u8 {
    match value {
        Some(v) if v <= 10.0 => BAND_IDEAL,
        Some(v) if v <= 25.0 => BAND_TOLERABLE,
        _ => BAND_FAILING,
    }
}
