//! CLI argument definitions for Estuary.
//!
//! This module contains the command-line interface structure using Clap.
//! The CLI exposes one subcommand per source pipeline and prints the
//! canonical JSON document for the requested entity.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `rate` | Fetch the central-bank base rate history |
//! | `epidemic` | Fetch epidemic counters for a region |
//! | `ticker` | Fetch ticker metadata and price history |
//! | `weather` | Fetch current conditions and forecast |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--timeout-ms` | `10000` | Request timeout in ms |
//!
//! # Examples
//!
//! ```bash
//! # Base rate changes over the trailing year
//! estuary rate
//!
//! # Epidemic counters for Hungary
//! estuary epidemic HU --pretty
//!
//! # One month of MSFT history with the default projection
//! estuary ticker MSFT --period 1mo
//!
//! # Weather by city name
//! estuary weather --city Vienna
//! ```

use clap::{Args, Parser, Subcommand};

/// Estuary - multi-source data aggregation CLI
///
/// Fetch central-bank rates, epidemic counters, ticker prices, and weather
/// conditions as canonical JSON documents.
#[derive(Debug, Parser)]
#[command(
    name = "estuary",
    author,
    version,
    about = "Multi-source data aggregation CLI",
    long_about = "Estuary aggregates four upstream sources into canonical JSON documents:\n\
\n\
  • Central-bank base rate history (HTML table)\n\
  • Epidemic counters per region\n\
  • Ticker metadata and price history\n\
  • Current weather and five-day forecast\n\
\n\
Use 'estuary <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Request timeout budget in milliseconds.
    #[arg(long, global = true, default_value_t = 10_000)]
    pub timeout_ms: u64,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the central-bank base rate change history.
    ///
    /// Returns every rate change inside the requested date range, keyed by
    /// ISO date. Defaults to the trailing 365 days.
    ///
    /// # Examples
    ///
    ///   estuary rate
    ///   estuary rate --from 2020-01-01 --to 2023-12-31 --pretty
    Rate(RateArgs),

    /// Fetch epidemic counters for a region.
    ///
    /// Returns the cumulative case, death, and recovery counters as the
    /// upstream page renders them.
    ///
    /// # Examples
    ///
    ///   estuary epidemic GLOBAL
    ///   estuary epidemic HU --pretty
    Epidemic(EpidemicArgs),

    /// Fetch ticker metadata and price history.
    ///
    /// Returns an info block with the latest quote fields and a history
    /// table projected onto the requested columns.
    ///
    /// # Examples
    ///
    ///   estuary ticker MSFT
    ///   estuary ticker AAPL --period 1mo --columns Close --columns Volume
    Ticker(TickerArgs),

    /// Fetch current weather conditions and the forecast.
    ///
    /// Accepts either a city name or a coordinate pair; the other side is
    /// resolved by geocoding.
    ///
    /// # Examples
    ///
    ///   estuary weather --city Vienna
    ///   estuary weather --lat 48.2 --lon 16.3
    Weather(WeatherArgs),
}

/// Arguments for the `rate` command.
#[derive(Debug, Args)]
pub struct RateArgs {
    /// Inclusive range start as an ISO date (default: one year before the
    /// range end).
    #[arg(long)]
    pub from: Option<String>,

    /// Inclusive range end as an ISO date (default: today).
    #[arg(long)]
    pub to: Option<String>,
}

/// Arguments for the `epidemic` command.
#[derive(Debug, Args)]
pub struct EpidemicArgs {
    /// Region code: GLOBAL or a two-letter country code (e.g., HU, US).
    pub region: String,
}

/// Arguments for the `ticker` command.
#[derive(Debug, Args)]
pub struct TickerArgs {
    /// Ticker symbol (e.g., MSFT, BRK.B, ^GSPC).
    pub symbol: String,

    /// History period.
    ///
    /// Supported periods: 1d, 1wk, 1mo, 6mo, 1y, 5y, max (default: 1wk).
    #[arg(long)]
    pub period: Option<String>,

    /// History column to include; repeat for multiple columns.
    ///
    /// Supported columns: Open, High, Low, Close, Volume, Dividends,
    /// "Stock Splits", "Close%" (default: Close, Volume, Close%).
    #[arg(long = "columns")]
    pub columns: Option<Vec<String>>,
}

/// Arguments for the `weather` command.
#[derive(Debug, Args)]
pub struct WeatherArgs {
    /// City name to geocode.
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    pub city: Option<String>,

    /// Latitude of the place of interest.
    #[arg(long, requires = "lon")]
    pub lat: Option<f64>,

    /// Longitude of the place of interest.
    #[arg(long, requires = "lat")]
    pub lon: Option<f64>,
}
