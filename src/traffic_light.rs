use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::entsoe::forecast::ForecastPoint;

#[derive(Error, Debug)]
pub enum TrafficLightError {
    #[error("demand is zero at {0}, share of renewables is undefined")]
    ZeroDemand(DateTime<Utc>),
    #[error("no historical share values to derive quantile boundaries from")]
    EmptyHistory,
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

/// The constituents of one renewable-share value, returned alongside the
/// share itself so callers can render them without recomputing.
#[derive(Debug, Clone)]
pub struct ShareBreakdown {
    pub timestamp: DateTime<Utc>,
    pub demand_mw: f64,
    pub solar_mw: f64,
    pub wind_onshore_mw: f64,
    pub wind_offshore_mw: Option<f64>,
    pub share: f64,
}

/// One point of the historical share series.
#[derive(Debug, Clone, Copy)]
pub struct SharePoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Share of renewable generation in total demand for a single forecast point.
///
/// The share can exceed 1.0 when wind and solar output together exceed
/// demand. Zero demand makes the quotient undefined and fails the run.
pub fn renewable_share(point: &ForecastPoint) -> Result<ShareBreakdown, TrafficLightError> {
    if point.demand_mw == 0.0 {
        return Err(TrafficLightError::ZeroDemand(point.timestamp));
    }

    let renewables =
        point.solar_mw + point.wind_onshore_mw + point.wind_offshore_mw.unwrap_or(0.0);

    Ok(ShareBreakdown {
        timestamp: point.timestamp,
        demand_mw: point.demand_mw,
        solar_mw: point.solar_mw,
        wind_onshore_mw: point.wind_onshore_mw,
        wind_offshore_mw: point.wind_offshore_mw,
        share: renewables / point.demand_mw,
    })
}

/// Share series over a whole window. Fails on the first zero-demand point
/// rather than letting infinities leak into the quantile math.
pub fn share_series(points: &[ForecastPoint]) -> Result<Vec<SharePoint>, TrafficLightError> {
    points
        .iter()
        .map(|point| {
            renewable_share(point).map(|breakdown| SharePoint {
                timestamp: breakdown.timestamp,
                value: breakdown.share,
            })
        })
        .collect()
}

/// Bucket configuration: N quantile buckets labelled low to high.
///
/// Validated at construction, before anything touches the network, so a bad
/// bucket count or label list never costs an API round-trip.
#[derive(Debug, Clone)]
pub struct TrafficLight {
    no_of_quantiles: usize,
    colors: Vec<String>,
}

impl TrafficLight {
    pub fn new(no_of_quantiles: usize, colors: Vec<String>) -> Result<Self, TrafficLightError> {
        if no_of_quantiles < 1 {
            return Err(TrafficLightError::Configuration(
                "number of quantile buckets must be at least 1".to_string(),
            ));
        }
        if colors.len() != no_of_quantiles {
            return Err(TrafficLightError::Configuration(format!(
                "{} buckets need {} color labels, got {}",
                no_of_quantiles,
                no_of_quantiles,
                colors.len()
            )));
        }
        Ok(Self {
            no_of_quantiles,
            colors,
        })
    }

    /// N-1 bucket edges from the empirical distribution of historical shares.
    ///
    /// Boundary i sits at the truncated integer percentile rank
    /// `trunc(100 * i / N)` with linear interpolation between order
    /// statistics. The truncation reproduces the output of the tool this
    /// replaces; switching to exact fractional ranks would shift every
    /// boundary slightly.
    pub fn boundaries(&self, values: &[f64]) -> Result<Vec<f64>, TrafficLightError> {
        if values.is_empty() {
            return Err(TrafficLightError::EmptyHistory);
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let n = self.no_of_quantiles;
        let boundaries = (1..n)
            .map(|i| {
                let rank = (100.0 / n as f64 * i as f64).trunc();
                percentile_linear(&sorted, rank)
            })
            .collect();

        Ok(boundaries)
    }

    /// Map a live share value to its bucket label.
    ///
    /// First boundary the value does not exceed wins; equality resolves to
    /// the lower bucket. A value above every boundary lands in the last
    /// bucket. The fallback stays even though the scan looks exhaustive:
    /// with float boundaries the scan can come up empty.
    pub fn classify(&self, value: f64, boundaries: &[f64]) -> &str {
        for (i, boundary) in boundaries.iter().enumerate() {
            if value <= *boundary {
                return &self.colors[i];
            }
        }
        &self.colors[self.no_of_quantiles - 1]
    }
}

/// Linear-interpolation percentile over a pre-sorted slice, `rank` in 0..=100.
fn percentile_linear(sorted: &[f64], rank: f64) -> f64 {
    let position = rank / 100.0 * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let fraction = position - lower as f64;

    if lower + 1 < sorted.len() {
        sorted[lower] + fraction * (sorted[lower + 1] - sorted[lower])
    } else {
        sorted[lower]
    }
}
