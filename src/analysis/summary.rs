/// Summary statistics over readings and the analytics endpoint.

use crate::model::{AnalyticsSummary, QualityDistribution, Reading};
use crate::quality::Grade;

/// Points a Good reading contributes to the overall quality score.
const GOOD_WEIGHT: u64 = 100;
/// Points a Fair reading contributes; Poor contributes nothing.
const FAIR_WEIGHT: u64 = 60;

/// Overall quality as a percentage: `(good * 100 + fair * 60) / total`,
/// rounded. `None` when the distribution is empty.
pub fn overall_quality_score(distribution: &QualityDistribution) -> Option<u8> {
    let total = distribution.total();
    if total == 0 {
        return None;
    }
    let weighted = u64::from(distribution.good) * GOOD_WEIGHT + u64::from(distribution.fair) * FAIR_WEIGHT;
    let score = (weighted as f64 / total as f64).round();
    Some(score.clamp(0.0, 100.0) as u8)
}

/// Mean values of the four scored parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Averages {
    pub ph: Option<f64>,
    pub temperature: Option<f64>,
    pub oxygen: Option<f64>,
    pub turbidity: Option<f64>,
}

/// Averages as served by the backend. The backend reports zeros when no
/// reading fell inside its window, so an empty distribution means "no
/// data" rather than a mean of zero.
pub fn summary_averages(summary: &AnalyticsSummary) -> Averages {
    if summary.quality_distribution.total() == 0 {
        return Averages::default();
    }
    Averages {
        ph: Some(summary.avg_ph),
        temperature: Some(summary.avg_temperature),
        oxygen: Some(summary.avg_oxygen),
        turbidity: Some(summary.avg_turbidity),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Averages over a set of readings, rounded the way the backend rounds
/// them (pH and oxygen to 2 places, temperature and turbidity to 1).
pub fn reading_averages<'a>(readings: impl IntoIterator<Item = &'a Reading> + Clone) -> Averages {
    let over = |f: fn(&Reading) -> Option<f64>| readings.clone().into_iter().filter_map(f);
    Averages {
        ph: mean(over(|r| r.ph)).map(|v| round_to(v, 2)),
        temperature: mean(over(|r| r.temperature)).map(|v| round_to(v, 1)),
        oxygen: mean(over(|r| r.dissolved_oxygen)).map(|v| round_to(v, 2)),
        turbidity: mean(over(|r| r.turbidity)).map(|v| round_to(v, 1)),
    }
}

/// The backend's distribution buckets readings by pH alone:
/// outside 6–9 is Poor, outside 6.5–8.5 is Fair, otherwise Good.
pub fn grade_by_ph(ph: f64) -> Grade {
    if !(6.0..=9.0).contains(&ph) {
        Grade::Poor
    } else if !(6.5..=8.5).contains(&ph) {
        Grade::Fair
    } else {
        Grade::Good
    }
}

pub fn ph_distribution<'a>(readings: impl IntoIterator<Item = &'a Reading>) -> QualityDistribution {
    let mut distribution = QualityDistribution::default();
    for ph in readings.into_iter().filter_map(|r| r.ph) {
        match grade_by_ph(ph) {
            Grade::Good => distribution.good += 1,
            Grade::Fair => distribution.fair += 1,
            Grade::Poor => distribution.poor += 1,
        }
    }
    distribution
}
