//! Subcommand execution

use crate::cli::{
    AggregateArgs, AnalyzeArgs, Cli, Commands, CompareArgs, InsightsArgs, MAX_COMPARE_TICKERS,
    OutputFormat, TickerArgs, WatchArgs,
};
use crate::render;
use anyhow::{Context, Result, bail};
use stai_client::{
    ClientConfig, DashboardApi, FetchOptions, SnapshotFetcher, StaiClient, available_tickers,
    validate_tickers,
};
use stai_core::Snapshot;
use stai_utils::Config;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Everything a subcommand needs from the environment
pub struct AppContext {
    pub config: Config,
    pub client_config: ClientConfig,
    pub format: OutputFormat,
}

impl AppContext {
    pub fn new(cli: &Cli) -> Result<Self> {
        let mut config = Config::from_env().context("Failed to load configuration")?;
        if let Some(url) = &cli.base_url {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }

        let client_config =
            ClientConfig::from_app_config(&config).context("Invalid API client configuration")?;

        Ok(Self {
            config,
            client_config,
            format: cli.format,
        })
    }

    /// Requested tickers, or the configured defaults when none were given
    fn tickers(&self, args: &TickerArgs) -> Vec<String> {
        if args.tickers.is_empty() {
            self.config.tickers.clone()
        } else {
            args.tickers.clone()
        }
    }

    fn fetcher(&self, options: FetchOptions) -> Result<SnapshotFetcher<dyn DashboardApi>> {
        let client = StaiClient::new(&self.client_config).context("Failed to create API client")?;
        let api: Arc<dyn DashboardApi> = Arc::new(client);
        Ok(SnapshotFetcher::new(api, options))
    }

    fn default_fetcher(&self) -> Result<SnapshotFetcher<dyn DashboardApi>> {
        self.fetcher(FetchOptions::from(&self.client_config))
    }
}

pub async fn execute(cli: Cli) -> Result<()> {
    let ctx = AppContext::new(&cli)?;
    debug!(
        base_url = %ctx.config.api_base_url,
        env = %ctx.config.environment,
        "Loaded configuration"
    );

    match cli.command {
        Commands::Dashboard(args) => dashboard(&ctx, &args).await,
        Commands::Analyze(args) => analyze(&ctx, &args).await,
        Commands::Compare(args) => compare(&ctx, &args).await,
        Commands::Insights(args) => insights(&ctx, &args).await,
        Commands::Aggregate(args) => aggregate(&ctx, &args).await,
        Commands::Watch(args) => watch(&ctx, &args).await,
        Commands::Tickers => tickers(&ctx).await,
    }
}

async fn dashboard(ctx: &AppContext, args: &TickerArgs) -> Result<()> {
    let snapshot = ctx.default_fetcher()?.fetch(&ctx.tickers(args)).await;
    println!("{}", render::dashboard(&snapshot, ctx.format)?);
    Ok(())
}

async fn analyze(ctx: &AppContext, args: &AnalyzeArgs) -> Result<()> {
    let ticker = validate_tickers(&[args.ticker.as_str()])?.remove(0);
    let options = FetchOptions {
        price_range_days: Some(args.range),
        ..FetchOptions::from(&ctx.client_config)
    };

    let snapshot = ctx.fetcher(options)?.fetch(&[ticker.as_str()]).await;
    println!("{}", render::analyze(&ticker, &snapshot, ctx.format)?);
    Ok(())
}

async fn compare(ctx: &AppContext, args: &CompareArgs) -> Result<()> {
    let tickers = validate_tickers(&args.tickers).context("Cannot compare")?;
    if tickers.len() > MAX_COMPARE_TICKERS {
        bail!(
            "Maximum {MAX_COMPARE_TICKERS} tickers allowed for comparison, got {}",
            tickers.len()
        );
    }

    let snapshot = ctx.default_fetcher()?.fetch(&tickers).await;
    println!(
        "{}",
        render::compare(&snapshot.portfolio(), &snapshot.ranked(), ctx.format)?
    );
    Ok(())
}

async fn insights(ctx: &AppContext, args: &InsightsArgs) -> Result<()> {
    if !(0.0..=100.0).contains(&args.threshold) {
        bail!("Threshold must be between 0 and 100, got {}", args.threshold);
    }

    let snapshot = ctx.default_fetcher()?.fetch(&ctx.tickers(&args.tickers)).await;
    let insights = snapshot.insights(args.threshold);
    println!("{}", render::insights(&insights, args.threshold, ctx.format)?);
    Ok(())
}

async fn aggregate(ctx: &AppContext, args: &AggregateArgs) -> Result<()> {
    let predictions = tokio::fs::read_to_string(&args.predictions)
        .await
        .with_context(|| format!("Failed to read {}", args.predictions.display()))?;

    let sentiments = match &args.sentiments {
        Some(path) => Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?,
        ),
        None => None,
    };

    let snapshot = Snapshot::from_json(&predictions, sentiments.as_deref())
        .context("Failed to parse snapshot files")?;
    info!(tickers = snapshot.predictions().len(), "Aggregating offline snapshot");

    println!("{}", render::metrics(&snapshot, ctx.format)?);
    Ok(())
}

async fn watch(ctx: &AppContext, args: &WatchArgs) -> Result<()> {
    let fetcher = ctx.default_fetcher()?;
    let tickers = ctx.tickers(&args.tickers);

    info!(interval_secs = args.interval, "Watching {} tickers", tickers.len());

    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Interrupted, stopping watch"),
            Err(e) => warn!(error = %e, "Cannot listen for Ctrl-C, stopping watch"),
        }
    };

    let renders = watch_until(
        &fetcher,
        &tickers,
        Duration::from_secs(args.interval),
        ctx.format,
        shutdown,
        |frame| println!("{frame}"),
    )
    .await?;
    debug!(renders, "Watch finished");
    Ok(())
}

/// Re-fetch and emit the dashboard every `period` until `shutdown` resolves
///
/// `shutdown` is polled for the whole loop, including while a fetch is in
/// flight. Returns the number of frames emitted.
async fn watch_until<A, F>(
    fetcher: &SnapshotFetcher<A>,
    tickers: &[String],
    period: Duration,
    format: OutputFormat,
    shutdown: F,
    mut emit: impl FnMut(String),
) -> Result<usize>
where
    A: DashboardApi + ?Sized,
    F: Future<Output = ()>,
{
    let mut interval = tokio::time::interval(period);
    tokio::pin!(shutdown);
    let mut renders = 0;

    loop {
        tokio::select! {
            biased;
            () = &mut shutdown => return Ok(renders),
            _ = interval.tick() => {
                let snapshot = tokio::select! {
                    biased;
                    () = &mut shutdown => return Ok(renders),
                    snapshot = fetcher.fetch(tickers) => snapshot,
                };
                emit(render::dashboard(&snapshot, format)?);
                renders += 1;
            }
        }
    }
}

async fn tickers(ctx: &AppContext) -> Result<()> {
    let fetcher = ctx.default_fetcher()?;
    let tickers = available_tickers(fetcher.api(), &ctx.config.tickers).await;

    match ctx.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tickers)?),
        OutputFormat::Table => println!("{}", tickers.join("\n")),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use clap::Parser;
    use stai_core::{PriceHistory, RawPrediction, RawSentiment};

    /// Answers every request after `delay`
    struct SlowApi {
        delay: Duration,
    }

    #[async_trait]
    impl DashboardApi for SlowApi {
        async fn fetch_prediction(&self, _ticker: &str) -> stai_client::Result<RawPrediction> {
            tokio::time::sleep(self.delay).await;
            Ok(RawPrediction::from_value(
                &serde_json::json!({"confidence": "70%", "trend": "up"}),
            ))
        }

        async fn fetch_sentiment(&self, _ticker: &str) -> stai_client::Result<RawSentiment> {
            Ok(RawSentiment::default())
        }

        async fn fetch_price_history(
            &self,
            _ticker: &str,
            _range_days: u32,
        ) -> stai_client::Result<PriceHistory> {
            Ok(PriceHistory::default())
        }

        async fn list_tickers(&self) -> stai_client::Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    fn slow_fetcher(delay: Duration) -> SnapshotFetcher<SlowApi> {
        SnapshotFetcher::new(Arc::new(SlowApi { delay }), FetchOptions::default())
    }

    fn context(cli: &Cli) -> AppContext {
        let config = Config::default();
        AppContext {
            client_config: ClientConfig::from_app_config(&config).unwrap(),
            config,
            format: cli.format,
        }
    }

    #[test]
    fn test_tickers_default_to_config() {
        let cli = Cli::try_parse_from(["stai", "dashboard"]).unwrap();
        let ctx = context(&cli);
        assert_eq!(ctx.tickers(&TickerArgs::default()), vec!["AAPL", "GOOGL", "TSLA"]);

        let args = TickerArgs {
            tickers: vec!["NVDA".to_string()],
        };
        assert_eq!(ctx.tickers(&args), vec!["NVDA"]);
    }

    #[tokio::test]
    async fn test_compare_rejects_too_many_tickers() {
        let cli = Cli::try_parse_from(["stai", "compare", "A,B,C,D,E,F,G,H,I,J,K"]).unwrap();
        let ctx = context(&cli);
        let Commands::Compare(args) = &cli.command else {
            panic!("expected compare");
        };
        let err = compare(&ctx, args).await.unwrap_err();
        assert!(err.to_string().contains("Maximum 10 tickers"));
    }

    #[tokio::test]
    async fn test_insights_rejects_bad_threshold() {
        let cli = Cli::try_parse_from(["stai", "insights", "--threshold", "150"]).unwrap();
        let ctx = context(&cli);
        let Commands::Insights(args) = &cli.command else {
            panic!("expected insights");
        };
        assert!(insights(&ctx, args).await.is_err());
    }

    #[tokio::test]
    async fn test_aggregate_missing_file() {
        let cli = Cli::try_parse_from(["stai", "aggregate", "--predictions", "/nonexistent/p.json"])
            .unwrap();
        let ctx = context(&cli);
        let Commands::Aggregate(args) = &cli.command else {
            panic!("expected aggregate");
        };
        let err = aggregate(&ctx, args).await.unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[tokio::test]
    async fn test_watch_renders_until_shutdown() {
        let fetcher = slow_fetcher(Duration::ZERO);
        let tickers = vec!["AAPL".to_string()];
        let mut frames = Vec::new();

        let renders = watch_until(
            &fetcher,
            &tickers,
            Duration::from_millis(10),
            OutputFormat::Table,
            tokio::time::sleep(Duration::from_millis(100)),
            |frame| frames.push(frame),
        )
        .await
        .unwrap();

        assert!(renders >= 2);
        assert_eq!(frames.len(), renders);
        assert!(frames[0].contains("Avg confidence: 70%"));
    }

    #[tokio::test]
    async fn test_watch_shutdown_interrupts_fetch_in_flight() {
        let fetcher = slow_fetcher(Duration::from_secs(30));
        let tickers = vec!["AAPL".to_string()];
        let mut frames = Vec::new();

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            watch_until(
                &fetcher,
                &tickers,
                Duration::from_secs(1),
                OutputFormat::Table,
                tokio::time::sleep(Duration::from_millis(50)),
                |frame| frames.push(frame),
            ),
        )
        .await
        .expect("shutdown should end the watch while the fetch is pending");

        assert_eq!(result.unwrap(), 0);
        assert!(frames.is_empty());
    }

    #[tokio::test]
    async fn test_watch_already_shut_down_renders_nothing() {
        let fetcher = slow_fetcher(Duration::ZERO);
        let tickers = vec!["AAPL".to_string()];

        let renders = watch_until(
            &fetcher,
            &tickers,
            Duration::from_millis(10),
            OutputFormat::Json,
            std::future::ready(()),
            |_| {},
        )
        .await
        .unwrap();

        assert_eq!(renders, 0);
    }
}
