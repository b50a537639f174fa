pub(crate) mod areas;
pub(crate) mod forecast;

use std::collections::HashMap;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error};

const BASE_URL: &str = "https://web-api.tp.entsoe.eu/api";

/// Upper bound on one API round-trip. This is an interactive tool, a hung
/// request should fail the run instead of blocking it indefinitely.
const REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(30);

/// ENTSO-E production source types (PSR) relevant for the renewable share.
pub const PSR_SOLAR: &str = "B16";
pub const PSR_WIND_OFFSHORE: &str = "B18";
pub const PSR_WIND_ONSHORE: &str = "B19";

#[derive(Error, Debug)]
pub enum EntsoeError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("XML parsing failed: {0}")]
    XmlParsing(#[from] quick_xml::DeError),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Invalid resolution format: {0}")]
    InvalidResolution(String),
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("Missing data point: {0}")]
    MissingData(String),
}

// Main response structure
#[derive(Debug, Deserialize)]
#[serde(rename = "GL_MarketDocument")]
pub struct GlMarketDocument {
    #[serde(rename = "mRID")]
    pub mrid: String,
    #[serde(rename = "revisionNumber")]
    pub revision_number: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    #[serde(rename = "process.processType")]
    pub process_type: String,
    #[serde(rename = "sender_MarketParticipant.mRID")]
    pub sender_mrid: ParticipantId,
    #[serde(rename = "sender_MarketParticipant.marketRole.type")]
    pub sender_role: String,
    #[serde(rename = "receiver_MarketParticipant.mRID")]
    pub receiver_mrid: ParticipantId,
    #[serde(rename = "receiver_MarketParticipant.marketRole.type")]
    pub receiver_role: String,
    #[serde(rename = "createdDateTime")]
    pub created_date_time: String,
    #[serde(rename = "time_Period.timeInterval")]
    pub time_period_interval: TimeInterval,
    #[serde(rename = "TimeSeries")]
    pub time_series: Vec<TimeSeries>,
}

#[derive(Debug, Deserialize)]
pub struct ParticipantId {
    #[serde(rename = "$value")]
    pub value: String,
    #[serde(rename = "@codingScheme")]
    pub coding_scheme: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TimeInterval {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Deserialize)]
pub struct TimeSeries {
    #[serde(rename = "mRID")]
    pub mrid: String,
    #[serde(rename = "businessType")]
    pub business_type: String,
    #[serde(rename = "objectAggregation")]
    pub object_aggregation: String,
    #[serde(rename = "outBiddingZone_Domain.mRID")]
    pub out_bidding_zone: Option<AreaId>,
    #[serde(rename = "inBiddingZone_Domain.mRID")]
    pub in_bidding_zone: Option<AreaId>,
    #[serde(rename = "quantity_Measure_Unit.name")]
    pub quantity_measure_unit: String,
    #[serde(rename = "curveType")]
    pub curve_type: String,
    /// Production source type. Present in wind/solar forecast documents
    /// (one TimeSeries per source), absent in load documents.
    #[serde(rename = "MktPSRType")]
    pub mkt_psr_type: Option<MktPsrType>,
    #[serde(rename = "Period")]
    pub period: Period,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MktPsrType {
    #[serde(rename = "psrType")]
    pub psr_type: String,
}

#[derive(Debug, Deserialize)]
pub struct AreaId {
    #[serde(rename = "$value")]
    pub value: String,
    #[serde(rename = "@codingScheme")]
    pub coding_scheme: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Period {
    #[serde(rename = "timeInterval")]
    pub time_interval: TimeInterval,
    pub resolution: String,
    #[serde(rename = "Point")]
    pub points: Vec<Point>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Point {
    pub position: u32,
    pub quantity: f64,
}

/// Represents a time series point with its actual timestamp
#[derive(Debug, Clone)]
pub struct TimestampedPoint {
    pub timestamp: DateTime<Utc>,
    pub position: u32,
    pub quantity: f64,
}

pub struct EntsoeClient {
    client: Client,
    api_key: String,
}

impl EntsoeClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
        }
    }

    /// Fetch day-ahead total load forecast (A65)
    /// Example: Germany bidding zone "10Y1001A1001A83F"
    pub async fn fetch_day_ahead_total_load_forecast(
        &self,
        out_bidding_zone: &str,
        period_start: &str,
        period_end: &str,
    ) -> Result<GlMarketDocument, EntsoeError> {
        debug!(
            zone = out_bidding_zone,
            period_start, period_end, "fetching load forecast"
        );
        let url = format!(
            "{}?securityToken={}&documentType=A65&processType=A01&outBiddingZone_Domain={}&periodStart={}&periodEnd={}",
            BASE_URL, self.api_key, out_bidding_zone, period_start, period_end
        );

        self.fetch_and_parse(&url).await
    }

    /// Fetch day-ahead wind and solar generation forecast (A69), one
    /// TimeSeries per production source (solar, wind onshore, wind offshore).
    pub async fn fetch_day_ahead_wind_solar_forecast(
        &self,
        in_domain: &str,
        period_start: &str,
        period_end: &str,
    ) -> Result<GlMarketDocument, EntsoeError> {
        debug!(
            zone = in_domain,
            period_start, period_end, "fetching wind/solar forecast"
        );
        let url = format!(
            "{}?securityToken={}&documentType=A69&processType=A01&in_Domain={}&periodStart={}&periodEnd={}",
            BASE_URL, self.api_key, in_domain, period_start, period_end
        );

        self.fetch_and_parse(&url).await
    }

    async fn fetch_and_parse(&self, url: &str) -> Result<GlMarketDocument, EntsoeError> {
        let xml = self
            .client
            .get(url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .text()
            .await?;

        // Acknowledgement documents carry a Reason block instead of data
        if xml.contains("<Reason>") || xml.contains("<code>") {
            return Err(EntsoeError::InvalidResponse(xml));
        }

        let document: GlMarketDocument = quick_xml::de::from_str(&xml).map_err(|e| {
            error!(error = %e, "failed to parse ENTSO-E XML");
            e
        })?;

        Ok(document)
    }
}

/// Format a window for the API's periodStart/periodEnd parameters (YYYYMMDDHHmm).
pub fn format_period(start: DateTime<Utc>, end: DateTime<Utc>) -> (String, String) {
    (
        start.format("%Y%m%d%H%M").to_string(),
        end.format("%Y%m%d%H%M").to_string(),
    )
}

/// Parse ISO 8601 duration format (PT15M, PT30M, PT60M, etc.)
fn parse_resolution(resolution: &str) -> Result<Duration, EntsoeError> {
    // Format: PT[n]M where n is minutes
    if !resolution.starts_with("PT") || !resolution.ends_with("M") {
        return Err(EntsoeError::InvalidResolution(resolution.to_string()));
    }

    let minutes_str = &resolution[2..resolution.len() - 1];
    let minutes: i64 = minutes_str
        .parse()
        .map_err(|_| EntsoeError::InvalidResolution(resolution.to_string()))?;

    Ok(Duration::minutes(minutes))
}

fn parse_timestamp(timestamp: &str) -> Result<DateTime<Utc>, EntsoeError> {
    let normalized = if timestamp.len() == 17 && timestamp.ends_with('Z') {
        let mut s = timestamp.to_string();
        s.insert_str(16, ":00"); // add seconds
        s
    } else {
        timestamp.to_string()
    };

    DateTime::parse_from_rfc3339(&normalized)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| EntsoeError::InvalidTimestamp(timestamp.to_string()))
}

impl Period {
    /// Get all points with their actual timestamps based on resolution
    pub fn timestamped_points(&self) -> Result<Vec<TimestampedPoint>, EntsoeError> {
        let start_time = parse_timestamp(&self.time_interval.start)?;
        let resolution_duration = parse_resolution(&self.resolution)?;

        let timestamped = self
            .points
            .iter()
            .map(|point| {
                // Position starts at 1, so subtract 1 to get offset
                let offset = resolution_duration * (point.position as i32 - 1);
                TimestampedPoint {
                    timestamp: start_time + offset,
                    position: point.position,
                    quantity: point.quantity,
                }
            })
            .collect();

        Ok(timestamped)
    }
}

impl GlMarketDocument {
    /// All timestamped points across all time series, quantities summed per
    /// timestamp. Used for load documents where the series split carries no
    /// meaning for us.
    pub fn all_timestamped_points(&self) -> Result<Vec<TimestampedPoint>, EntsoeError> {
        let mut timestamp_map: HashMap<DateTime<Utc>, f64> = HashMap::new();

        for series in &self.time_series {
            let points = series.period.timestamped_points()?;
            for point in points {
                *timestamp_map.entry(point.timestamp).or_insert(0.0) += point.quantity;
            }
        }

        let mut result: Vec<TimestampedPoint> = timestamp_map
            .into_iter()
            .map(|(timestamp, quantity)| TimestampedPoint {
                timestamp,
                position: 0,
                quantity,
            })
            .collect();

        result.sort_by_key(|p| p.timestamp);

        // Reassign positions based on sorted order
        for (i, point) in result.iter_mut().enumerate() {
            point.position = (i + 1) as u32;
        }

        Ok(result)
    }
}
