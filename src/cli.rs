//! Command-line surface. Everything the original hard-coded (region, bucket
//! count, labels, window size) is a flag with the reference values as
//! defaults.

use clap::{Parser, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "ampel",
    version,
    about = "Renewable-share traffic light from ENTSO-E demand and wind/solar forecasts"
)]
pub struct Cli {
    /// ENTSO-E Transparency Platform security token.
    #[arg(long, env = "ENTSOE_API_KEY", hide_env_values = true)]
    pub token: String,

    /// ISO 3166-1 alpha-2 country code of the region.
    #[arg(short, long, default_value = "DE")]
    pub region: String,

    /// Number of traffic-light buckets.
    #[arg(long, default_value_t = 3)]
    pub quantiles: usize,

    /// Bucket labels from lowest to highest share, comma separated. Must
    /// match the bucket count.
    #[arg(long, value_delimiter = ',', default_value = "RED,YELLOW,GREEN")]
    pub colors: Vec<String>,

    /// Derive boundaries from a sliding window around now instead of
    /// today's midnight-to-midnight window.
    #[arg(long)]
    pub sliding: bool,

    /// Days before now covered by the sliding window.
    #[arg(long, default_value_t = 1)]
    pub days_in_past: i64,

    /// Days after now covered by the sliding window.
    #[arg(long, default_value_t = 1)]
    pub days_in_future: i64,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Write an interactive HTML chart of the share series and boundaries.
    #[arg(long)]
    pub plot: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_the_reference_invocation() {
        let cli = Cli::try_parse_from(["ampel", "--token", "t"]).unwrap();
        assert_eq!(cli.region, "DE");
        assert_eq!(cli.quantiles, 3);
        assert_eq!(cli.colors, vec!["RED", "YELLOW", "GREEN"]);
        assert!(!cli.sliding);
        assert_eq!(cli.days_in_past, 1);
        assert_eq!(cli.days_in_future, 1);
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(!cli.plot);
    }

    #[test]
    fn colors_flag_splits_on_commas() {
        let cli = Cli::try_parse_from([
            "ampel", "--token", "t", "--quantiles", "4", "--colors", "RED,ORANGE,YELLOW,GREEN",
        ])
        .unwrap();
        assert_eq!(cli.colors.len(), 4);
        assert_eq!(cli.colors[1], "ORANGE");
    }
}
