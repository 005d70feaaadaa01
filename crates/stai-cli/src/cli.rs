//! Command-line arguments

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Most tickers a single comparison accepts
pub const MAX_COMPARE_TICKERS: usize = 10;

/// StAI stock dashboard
#[derive(Parser, Debug)]
#[command(name = "stai")]
#[command(about = "Stock predictions and news sentiment at a glance", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Analytics API base URL; overrides STAI_API_BASE_URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Output format
    #[arg(long, short, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Headline metrics, best prediction and per-ticker table
    Dashboard(TickerArgs),
    /// Prediction, sentiment and price change for one ticker
    Analyze(AnalyzeArgs),
    /// Portfolio metrics and tickers ranked by confidence
    Compare(CompareArgs),
    /// Bullish picks, potential buys and underperformers
    Insights(InsightsArgs),
    /// Aggregate prediction and sentiment JSON files without the API
    Aggregate(AggregateArgs),
    /// Refresh the dashboard on an interval until interrupted
    Watch(WatchArgs),
    /// Tickers the API has models for
    Tickers,
}

#[derive(Args, Debug, Default)]
pub struct TickerArgs {
    /// Ticker symbols; defaults to the configured list
    #[arg(value_delimiter = ',')]
    pub tickers: Vec<String>,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    pub ticker: String,

    /// Days of price history
    #[arg(long, default_value_t = 30)]
    pub range: u32,
}

#[derive(Args, Debug)]
pub struct CompareArgs {
    #[arg(required = true, value_delimiter = ',')]
    pub tickers: Vec<String>,
}

#[derive(Args, Debug)]
pub struct InsightsArgs {
    #[command(flatten)]
    pub tickers: TickerArgs,

    /// Minimum confidence (percent) for a potential buy
    #[arg(long, default_value_t = stai_core::DEFAULT_BUY_THRESHOLD)]
    pub threshold: f64,
}

#[derive(Args, Debug)]
pub struct AggregateArgs {
    /// JSON object mapping ticker to prediction record
    #[arg(long)]
    pub predictions: PathBuf,

    /// JSON object mapping ticker to sentiment record
    #[arg(long)]
    pub sentiments: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub tickers: TickerArgs,

    /// Seconds between refreshes
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,
}
