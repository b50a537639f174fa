use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::entsoe::{
    EntsoeClient, EntsoeError, GlMarketDocument, PSR_SOLAR, PSR_WIND_OFFSHORE, PSR_WIND_ONSHORE,
};

/// Demand and renewable generation for one forecast time step, aligned by
/// timestamp across the load and wind/solar documents.
///
/// `wind_offshore_mw` is `Some` for every point or `None` for every point of
/// a series: whether a region reports offshore wind at all is decided once
/// per fetched window, not per time step.
#[derive(Debug, Clone)]
pub struct ForecastPoint {
    pub timestamp: DateTime<Utc>,
    pub demand_mw: f64,
    pub solar_mw: f64,
    pub wind_onshore_mw: f64,
    pub wind_offshore_mw: Option<f64>,
}

impl EntsoeClient {
    /// Fetch load and wind/solar forecasts for a window and align them into
    /// one sequence of forecast points.
    pub async fn fetch_forecast_points(
        &self,
        bidding_zone: &str,
        period_start: &str,
        period_end: &str,
    ) -> Result<Vec<ForecastPoint>, EntsoeError> {
        // Fetch both forecasts in parallel
        let (gen_forecast, load_forecast) = tokio::try_join!(
            self.fetch_day_ahead_wind_solar_forecast(bidding_zone, period_start, period_end),
            self.fetch_day_ahead_total_load_forecast(bidding_zone, period_start, period_end)
        )?;

        align_forecasts(&load_forecast, &gen_forecast)
    }
}

/// Join a load document with a wind/solar document on timestamps.
///
/// Every generation timestamp must have a matching demand value and every
/// per-source series must cover it. A gap anywhere fails the whole window:
/// a partially aligned series would silently skew the quantile boundaries.
pub fn align_forecasts(
    load: &GlMarketDocument,
    generation: &GlMarketDocument,
) -> Result<Vec<ForecastPoint>, EntsoeError> {
    let load_by_timestamp: HashMap<DateTime<Utc>, f64> = load
        .all_timestamped_points()?
        .into_iter()
        .map(|p| (p.timestamp, p.quantity))
        .collect();

    let mut solar = HashMap::new();
    let mut wind_onshore = HashMap::new();
    let mut wind_offshore = HashMap::new();
    let mut timestamps = BTreeSet::new();

    // Offshore availability is a property of the region's document, decided
    // here once, never re-checked per point.
    let offshore_reported = generation.time_series.iter().any(|series| {
        series
            .mkt_psr_type
            .as_ref()
            .is_some_and(|psr| psr.psr_type == PSR_WIND_OFFSHORE)
    });

    for series in &generation.time_series {
        let Some(psr) = series.mkt_psr_type.as_ref() else {
            continue;
        };
        let bucket = match psr.psr_type.as_str() {
            PSR_SOLAR => &mut solar,
            PSR_WIND_ONSHORE => &mut wind_onshore,
            PSR_WIND_OFFSHORE => &mut wind_offshore,
            other => {
                debug!(psr_type = other, "skipping unrelated production type");
                continue;
            }
        };

        for point in series.period.timestamped_points()? {
            *bucket.entry(point.timestamp).or_insert(0.0) += point.quantity;
            timestamps.insert(point.timestamp);
        }
    }

    if timestamps.is_empty() {
        return Err(EntsoeError::InvalidResponse(
            "wind/solar document contains no solar or wind series".to_string(),
        ));
    }

    timestamps
        .into_iter()
        .map(|timestamp| {
            let demand_mw = *load_by_timestamp
                .get(&timestamp)
                .ok_or_else(|| EntsoeError::MissingData(format!("no load at {}", timestamp)))?;
            let solar_mw = *solar
                .get(&timestamp)
                .ok_or_else(|| EntsoeError::MissingData(format!("no solar at {}", timestamp)))?;
            let wind_onshore_mw = *wind_onshore.get(&timestamp).ok_or_else(|| {
                EntsoeError::MissingData(format!("no onshore wind at {}", timestamp))
            })?;
            let wind_offshore_mw = if offshore_reported {
                Some(*wind_offshore.get(&timestamp).ok_or_else(|| {
                    EntsoeError::MissingData(format!("no offshore wind at {}", timestamp))
                })?)
            } else {
                None
            };

            Ok(ForecastPoint {
                timestamp,
                demand_mw,
                solar_mw,
                wind_onshore_mw,
                wind_offshore_mw,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(series: &str) -> GlMarketDocument {
        let xml = format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<GL_MarketDocument xmlns="urn:iec62325.351:tc57wg16:451-6:generationloaddocument:3:0">
    <mRID>doc</mRID>
    <revisionNumber>1</revisionNumber>
    <type>A69</type>
    <process.processType>A01</process.processType>
    <sender_MarketParticipant.mRID codingScheme="A01">10X1001A1001A450</sender_MarketParticipant.mRID>
    <sender_MarketParticipant.marketRole.type>A32</sender_MarketParticipant.marketRole.type>
    <receiver_MarketParticipant.mRID codingScheme="A01">10X1001A1001A450</receiver_MarketParticipant.mRID>
    <receiver_MarketParticipant.marketRole.type>A33</receiver_MarketParticipant.marketRole.type>
    <createdDateTime>2023-08-14T19:26:41Z</createdDateTime>
    <time_Period.timeInterval>
        <start>2023-08-15T00:00Z</start>
        <end>2023-08-16T00:00Z</end>
    </time_Period.timeInterval>
    {}
</GL_MarketDocument>"#,
            series
        );
        quick_xml::de::from_str(&xml).unwrap()
    }

    fn series(mrid: &str, psr: Option<&str>, quantities: &[f64]) -> String {
        let psr_block = psr
            .map(|p| format!("<MktPSRType><psrType>{}</psrType></MktPSRType>", p))
            .unwrap_or_default();
        let points: String = quantities
            .iter()
            .enumerate()
            .map(|(i, q)| {
                format!(
                    "<Point><position>{}</position><quantity>{}</quantity></Point>",
                    i + 1,
                    q
                )
            })
            .collect();
        format!(
            r#"<TimeSeries>
        <mRID>{}</mRID>
        <businessType>A04</businessType>
        <objectAggregation>A01</objectAggregation>
        <inBiddingZone_Domain.mRID codingScheme="A01">10Y1001A1001A83F</inBiddingZone_Domain.mRID>
        <quantity_Measure_Unit.name>MAW</quantity_Measure_Unit.name>
        <curveType>A03</curveType>
        {}
        <Period>
            <timeInterval>
                <start>2023-08-15T00:00Z</start>
                <end>2023-08-16T00:00Z</end>
            </timeInterval>
            <resolution>PT60M</resolution>
            {}
        </Period>
    </TimeSeries>"#,
            mrid, psr_block, points
        )
    }

    #[test]
    fn aligns_load_with_per_source_generation() {
        let load = document(&series("1", None, &[50000.0, 48000.0]));
        let generation = document(&format!(
            "{}{}",
            series("1", Some(PSR_SOLAR), &[1000.0, 1200.0]),
            series("2", Some(PSR_WIND_ONSHORE), &[8000.0, 7500.0])
        ));

        let points = align_forecasts(&load, &generation).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].demand_mw, 50000.0);
        assert_eq!(points[0].solar_mw, 1000.0);
        assert_eq!(points[0].wind_onshore_mw, 8000.0);
        assert!(points[0].wind_offshore_mw.is_none());
        assert_eq!(points[1].timestamp.to_rfc3339(), "2023-08-15T01:00:00+00:00");
    }

    #[test]
    fn offshore_is_some_when_region_reports_it() {
        let load = document(&series("1", None, &[50000.0]));
        let generation = document(&format!(
            "{}{}{}",
            series("1", Some(PSR_SOLAR), &[1000.0]),
            series("2", Some(PSR_WIND_ONSHORE), &[8000.0]),
            series("3", Some(PSR_WIND_OFFSHORE), &[3000.0])
        ));

        let points = align_forecasts(&load, &generation).unwrap();
        assert_eq!(points[0].wind_offshore_mw, Some(3000.0));
    }

    #[test]
    fn unrelated_production_types_are_ignored() {
        let load = document(&series("1", None, &[50000.0]));
        // B14 is nuclear, not part of the wind/solar share
        let generation = document(&format!(
            "{}{}{}",
            series("1", Some(PSR_SOLAR), &[1000.0]),
            series("2", Some(PSR_WIND_ONSHORE), &[8000.0]),
            series("3", Some("B14"), &[12000.0])
        ));

        let points = align_forecasts(&load, &generation).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].solar_mw, 1000.0);
        assert_eq!(points[0].wind_onshore_mw, 8000.0);
    }

    #[test]
    fn missing_load_for_generation_timestamp_fails() {
        let load = document(&series("1", None, &[50000.0]));
        let generation = document(&format!(
            "{}{}",
            series("1", Some(PSR_SOLAR), &[1000.0, 1200.0]),
            series("2", Some(PSR_WIND_ONSHORE), &[8000.0, 7500.0])
        ));

        let err = align_forecasts(&load, &generation).unwrap_err();
        assert!(matches!(err, EntsoeError::MissingData(_)));
    }

    #[test]
    fn missing_source_value_fails_when_offshore_reported() {
        let load = document(&series("1", None, &[50000.0, 48000.0]));
        let generation = document(&format!(
            "{}{}{}",
            series("1", Some(PSR_SOLAR), &[1000.0, 1200.0]),
            series("2", Some(PSR_WIND_ONSHORE), &[8000.0, 7500.0]),
            series("3", Some(PSR_WIND_OFFSHORE), &[3000.0])
        ));

        let err = align_forecasts(&load, &generation).unwrap_err();
        assert!(matches!(err, EntsoeError::MissingData(_)));
    }

    #[test]
    fn generation_document_without_wind_or_solar_fails() {
        let load = document(&series("1", None, &[50000.0]));
        let generation = document(&series("1", Some("B14"), &[12000.0]));

        let err = align_forecasts(&load, &generation).unwrap_err();
        assert!(matches!(err, EntsoeError::InvalidResponse(_)));
    }
}
