mod cli;
mod entsoe;
mod output;
mod traffic_light;

use anyhow::{Result, anyhow};
use chrono::{Duration, NaiveTime, Utc};
use clap::Parser;
use tracing::info;

use crate::cli::{Cli, OutputFormat};
use crate::entsoe::{EntsoeClient, areas, format_period};
use crate::output::TrafficLightReport;
use crate::traffic_light::TrafficLight;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Cli::parse();

    // Configuration is validated before the first network call
    let light = TrafficLight::new(args.quantiles, args.colors.clone())?;
    let zone = areas::get_primary_zone(&args.region).ok_or_else(|| {
        anyhow!(
            "unknown region {:?} (known: {})",
            args.region,
            areas::list_countries().join(", ")
        )
    })?;

    let client = EntsoeClient::new(args.token.clone());
    let now = Utc::now();

    // Live value: the first forecast point of the next quarter hour
    let (period_start, period_end) = format_period(now, now + Duration::minutes(15));
    let current_points = client
        .fetch_forecast_points(zone.code, &period_start, &period_end)
        .await?;
    let current_point = current_points
        .first()
        .ok_or_else(|| anyhow!("no forecast point covers the current time"))?;
    let current = traffic_light::renewable_share(current_point)?;

    // Historical window the boundaries are derived from
    let (start, end) = if args.sliding {
        (
            now - Duration::days(args.days_in_past),
            now + Duration::days(args.days_in_future),
        )
    } else {
        let midnight = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        (midnight, midnight + Duration::days(1))
    };
    let (period_start, period_end) = format_period(start, end);
    let history_points = client
        .fetch_forecast_points(zone.code, &period_start, &period_end)
        .await?;
    let history = traffic_light::share_series(&history_points)?;
    info!(points = history.len(), zone = zone.code, "derived historical share series");

    let values: Vec<f64> = history.iter().map(|p| p.value).collect();
    let quantiles = light.boundaries(&values)?;
    let color = light.classify(current.share, &quantiles).to_string();

    let report = TrafficLightReport {
        timestamp_now: now,
        region: zone.country_code.to_string(),
        history,
        quantiles,
        current,
        color,
    };

    match args.format {
        OutputFormat::Text => println!("{}", output::render_text(&report)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&output::render_json(&report))?
        ),
    }

    if args.plot {
        let path = format!("ampel_{}.html", zone.country_code);
        output::write_plot(&report, std::path::Path::new(&path));
        info!(path = %path, "wrote share plot");
    }

    Ok(())
}
