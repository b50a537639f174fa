//! Presentation layer: text block, JSON object, and the optional HTML chart.
//! Renders from structured results only, the numeric pipeline never prints.

use std::path::Path;

use chrono::{DateTime, Utc};
use plotly::common::Mode;
use plotly::{Plot, Scatter};
use serde_json::{Value, json};

use crate::traffic_light::{ShareBreakdown, SharePoint};

const SEPARATOR: &str = "~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~";

/// Everything one run produces, handed to exactly one of the renderers below.
pub struct TrafficLightReport {
    pub timestamp_now: DateTime<Utc>,
    pub region: String,
    pub history: Vec<SharePoint>,
    pub quantiles: Vec<f64>,
    pub current: ShareBreakdown,
    pub color: String,
}

pub fn render_text(report: &TrafficLightReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("Net Load: {:.2} MW\n", report.current.demand_mw));
    out.push_str(&format!("Solar: {:.2} MW\n", report.current.solar_mw));
    out.push_str(&format!(
        "Wind Onshore: {:.2} MW\n",
        report.current.wind_onshore_mw
    ));
    if let Some(offshore) = report.current.wind_offshore_mw {
        out.push_str(&format!("Wind Offshore: {:.2} MW\n", offshore));
    }

    let quantiles: Vec<String> = report.quantiles.iter().map(|q| format!("{:.4}", q)).collect();
    out.push_str(&format!("Quantiles: [{}]\n", quantiles.join(", ")));
    out.push_str(SEPARATOR);
    out.push('\n');
    out.push_str(&format!("REGION: {}\n", report.region));
    out.push_str(&format!(
        "CURRENT SHARE OF RENEWABLES: {:.2} %\n",
        report.current.share * 100.0
    ));
    out.push_str(&format!("CURRENT TRAFFIC LIGHT: {}\n", report.color));
    out.push_str(SEPARATOR);

    out
}

pub fn render_json(report: &TrafficLightReport) -> Value {
    let history: Vec<Value> = report
        .history
        .iter()
        .map(|point| {
            json!({
                "timestamp": point.timestamp.to_rfc3339(),
                "value": point.value,
            })
        })
        .collect();

    json!({
        "timestamp_now": report.timestamp_now.to_rfc3339(),
        "history": history,
        "quantiles": report.quantiles,
        "region": report.region,
        "current_share_of_renewables": report.current.share,
        "current_calculate_traffic_light_color": report.color,
    })
}

/// Write the share series, the boundary lines and a "now" marker as an
/// interactive Plotly chart.
pub fn write_plot(report: &TrafficLightReport, path: &Path) {
    let timestamps: Vec<String> = report
        .history
        .iter()
        .map(|p| p.timestamp.format("%Y-%m-%d %H:%M").to_string())
        .collect();
    let values: Vec<f64> = report.history.iter().map(|p| p.value).collect();

    let mut plot = Plot::new();
    plot.add_trace(
        Scatter::new(timestamps.clone(), values.clone())
            .name("Share of renewables")
            .mode(Mode::LinesMarkers),
    );

    if let (Some(first), Some(last)) = (timestamps.first(), timestamps.last()) {
        for quantile in &report.quantiles {
            plot.add_trace(
                Scatter::new(vec![first.clone(), last.clone()], vec![*quantile, *quantile])
                    .name(&format!("boundary {:.4}", quantile))
                    .mode(Mode::Lines),
            );
        }
    }

    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if min.is_finite() && max.is_finite() {
        let now = report.timestamp_now.format("%Y-%m-%d %H:%M").to_string();
        plot.add_trace(
            Scatter::new(vec![now.clone(), now], vec![min, max])
                .name("now")
                .mode(Mode::Lines),
        );
    }

    plot.write_html(path);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn report() -> TrafficLightReport {
        let t0 = Utc.with_ymd_and_hms(2023, 8, 15, 12, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2023, 8, 15, 13, 0, 0).unwrap();
        TrafficLightReport {
            timestamp_now: t0,
            region: "DE".to_string(),
            history: vec![
                SharePoint {
                    timestamp: t0,
                    value: 0.25,
                },
                SharePoint {
                    timestamp: t1,
                    value: 0.40,
                },
            ],
            quantiles: vec![0.232, 0.364],
            current: ShareBreakdown {
                timestamp: t0,
                demand_mw: 100.0,
                solar_mw: 10.0,
                wind_onshore_mw: 20.0,
                wind_offshore_mw: None,
                share: 0.30,
            },
            color: "YELLOW".to_string(),
        }
    }

    #[test]
    fn text_report_carries_breakdown_and_status() {
        let text = render_text(&report());
        assert!(text.contains("Net Load: 100.00 MW"));
        assert!(text.contains("Solar: 10.00 MW"));
        assert!(text.contains("Wind Onshore: 20.00 MW"));
        assert!(!text.contains("Wind Offshore"));
        assert!(text.contains("REGION: DE"));
        assert!(text.contains("CURRENT SHARE OF RENEWABLES: 30.00 %"));
        assert!(text.contains("CURRENT TRAFFIC LIGHT: YELLOW"));
    }

    #[test]
    fn text_report_includes_offshore_when_present() {
        let mut report = report();
        report.current.wind_offshore_mw = Some(5.0);
        assert!(render_text(&report).contains("Wind Offshore: 5.00 MW"));
    }

    #[test]
    fn json_report_has_the_documented_fields() {
        let value = render_json(&report());
        assert_eq!(value["timestamp_now"], "2023-08-15T12:00:00+00:00");
        assert_eq!(value["region"], "DE");
        assert_eq!(value["current_share_of_renewables"], 0.30);
        assert_eq!(value["current_calculate_traffic_light_color"], "YELLOW");
        assert_eq!(value["quantiles"].as_array().unwrap().len(), 2);

        let history = value["history"].as_array().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0]["timestamp"], "2023-08-15T12:00:00+00:00");
        assert_eq!(history[0]["value"], 0.25);
    }
}
