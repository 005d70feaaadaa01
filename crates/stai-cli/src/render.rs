//! Terminal rendering of snapshot views

use crate::cli::OutputFormat;
use anyhow::Result;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use serde_json::json;
use stai_core::{
    AggregateMetrics, BestPrediction, Insights, PLACEHOLDER, PortfolioMetrics, RankedPrediction,
    RawPrediction, RawSentiment, Snapshot,
};
use std::fmt::Write as _;

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    table
}

fn confidence_cell(record: &RawPrediction) -> String {
    record
        .normalized_confidence()
        .map_or_else(|| PLACEHOLDER.to_string(), |c| c.to_string())
}

fn price_cell(price: Option<f64>) -> String {
    price.map_or_else(|| PLACEHOLDER.to_string(), |p| format!("{p:.2}"))
}

fn pretty(value: &serde_json::Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn metrics_lines(metrics: &AggregateMetrics, best: &BestPrediction) -> String {
    let best_line = if best.is_sentinel() {
        format!("Best prediction: {PLACEHOLDER}")
    } else {
        format!(
            "Best prediction: {} at {} ({:.0}% confidence, {})",
            best.ticker,
            best.prediction_display(),
            best.confidence,
            best.trend
        )
    };

    format!(
        "Avg confidence: {}%  Bullish: {}  Avg sentiment: {:.2}  News: {}\n{best_line}",
        metrics.avg_confidence, metrics.bullish_count, metrics.avg_sentiment, metrics.news_count
    )
}

/// Headline metrics plus one row per ticker
pub fn dashboard(snapshot: &Snapshot, format: OutputFormat) -> Result<String> {
    let metrics = snapshot.metrics();
    let best = snapshot.best_prediction();

    if format == OutputFormat::Json {
        return pretty(&json!({
            "fetchedAt": snapshot.fetched_at(),
            "metrics": metrics,
            "bestPrediction": best,
            "predictions": snapshot.predictions(),
            "sentiments": snapshot.sentiments(),
            "failures": snapshot.failures(),
        }));
    }

    let mut rows = table(&["Ticker", "Prediction", "Confidence", "Trend", "Sentiment", "News"]);
    for ticker in snapshot.tickers() {
        let prediction = snapshot.predictions().get(ticker);
        let sentiment = snapshot.sentiments().get(ticker);
        rows.add_row(vec![
            ticker.to_string(),
            price_cell(prediction.and_then(|p| p.prediction)),
            prediction.map_or_else(|| PLACEHOLDER.to_string(), confidence_cell),
            prediction
                .and_then(|p| p.trend.clone())
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            sentiment.map_or_else(
                || PLACEHOLDER.to_string(),
                |s| format!("{:.2}", s.sentiment_score),
            ),
            sentiment.map_or(0, RawSentiment::article_count).to_string(),
        ]);
    }

    let mut out = format!(
        "StAI dashboard @ {}\n{}\n{rows}",
        snapshot.fetched_at().format("%Y-%m-%d %H:%M:%S UTC"),
        metrics_lines(&metrics, &best)
    );
    for failure in snapshot.failures() {
        write!(out, "\n! {}: {}", failure.ticker, failure.reason)?;
    }
    Ok(out)
}

/// Detail view for a single ticker
pub fn analyze(ticker: &str, snapshot: &Snapshot, format: OutputFormat) -> Result<String> {
    let prediction = snapshot.predictions().get(ticker);
    let sentiment = snapshot.sentiments().get(ticker);
    let history = snapshot.price_history().get(ticker);
    let change = history.and_then(stai_core::PriceHistory::change);

    if format == OutputFormat::Json {
        return pretty(&json!({
            "ticker": ticker,
            "prediction": prediction,
            "normalizedConfidence": prediction.and_then(RawPrediction::normalized_confidence),
            "sentiment": sentiment,
            "sentimentSummary": sentiment.map(RawSentiment::effective_summary),
            "priceHistory": history,
            "priceChange": change,
            "failures": snapshot.failures(),
        }));
    }

    let mut rows = table(&["Field", "Value"]);
    rows.add_row(vec!["Ticker".to_string(), ticker.to_string()]);
    if let Some(p) = prediction {
        rows.add_row(vec!["Predicted price".to_string(), price_cell(p.prediction)]);
        rows.add_row(vec!["Current price".to_string(), price_cell(p.current_price)]);
        rows.add_row(vec!["Confidence".to_string(), confidence_cell(p)]);
        rows.add_row(vec!["Trend".to_string(), p.trend_kind().to_string()]);
    }
    if let Some(s) = sentiment {
        let summary = s.effective_summary();
        rows.add_row(vec!["Sentiment score".to_string(), format!("{:.2}", s.sentiment_score)]);
        rows.add_row(vec![
            "Articles".to_string(),
            format!(
                "{} ({} positive, {} neutral, {} negative; overall {})",
                s.article_count(),
                summary.positive,
                summary.neutral,
                summary.negative,
                summary.overall()
            ),
        ]);
    }
    if let Some(c) = change {
        rows.add_row(vec![
            "Price change".to_string(),
            format!("{:.2} -> {:.2} ({:+.2}, {:+.2}%)", c.first, c.last, c.absolute, c.percent),
        ]);
    }

    let mut out = rows.to_string();
    if let Some(s) = sentiment {
        for article in s.articles.iter().take(5) {
            let title = article.title.as_deref().unwrap_or(PLACEHOLDER);
            let source = article.source.as_deref().unwrap_or(PLACEHOLDER);
            write!(out, "\n- {title} ({source})")?;
        }
    }
    for failure in snapshot.failures() {
        write!(out, "\n! {}: {}", failure.ticker, failure.reason)?;
    }
    Ok(out)
}

/// Portfolio summary and confidence ranking
pub fn compare(
    portfolio: &PortfolioMetrics,
    ranked: &[RankedPrediction],
    format: OutputFormat,
) -> Result<String> {
    if format == OutputFormat::Json {
        return pretty(&json!({
            "metrics": portfolio,
            "ranked": ranked,
        }));
    }

    let average = portfolio
        .average_confidence
        .map_or_else(|| PLACEHOLDER.to_string(), |c| format!("{c:.1}%"));
    let summary = format!(
        "Symbols: {} ({} ok, {} failed)  Avg confidence: {average}\n\
         Trend: {} bullish, {} bearish, {} neutral  Risk: {} high, {} medium, {} low",
        portfolio.total_symbols,
        portfolio.successful_predictions,
        portfolio.failed_predictions,
        portfolio.bullish_count,
        portfolio.bearish_count,
        portfolio.neutral_count,
        portfolio.high_risk_count,
        portfolio.medium_risk_count,
        portfolio.low_risk_count,
    );

    let mut rows = table(&["#", "Ticker", "Confidence", "Prediction", "Trend", "Risk"]);
    for (rank, entry) in ranked.iter().enumerate() {
        let record = &entry.record;
        let confidence = if entry.success {
            confidence_cell(record)
        } else {
            record.error.clone().unwrap_or_else(|| "failed".to_string())
        };
        rows.add_row(vec![
            (rank + 1).to_string(),
            entry.ticker.clone(),
            confidence,
            price_cell(record.prediction),
            record.trend_kind().to_string(),
            record
                .risk_level
                .clone()
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
        ]);
    }

    Ok(format!("{summary}\n{rows}"))
}

/// Ticker lists grouped by signal
pub fn insights(insights: &Insights, threshold: f64, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return pretty(&json!({
            "threshold": threshold,
            "insights": insights,
        }));
    }

    let list = |tickers: &[String]| {
        if tickers.is_empty() {
            PLACEHOLDER.to_string()
        } else {
            tickers.join(", ")
        }
    };

    let mut rows = table(&["Signal", "Tickers"]);
    rows.add_row(vec!["Top bullish".to_string(), list(&insights.top_bullish)]);
    rows.add_row(vec![
        format!("Potential buys (>= {threshold:.0}%)"),
        list(&insights.potential_buys),
    ]);
    rows.add_row(vec!["Underperforming".to_string(), list(&insights.underperforming)]);
    Ok(rows.to_string())
}

/// Metrics only, for offline aggregation
pub fn metrics(snapshot: &Snapshot, format: OutputFormat) -> Result<String> {
    let metrics = snapshot.metrics();
    let best = snapshot.best_prediction();

    if format == OutputFormat::Json {
        return pretty(&json!({
            "metrics": metrics,
            "bestPrediction": best,
        }));
    }
    Ok(metrics_lines(&metrics, &best))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn snapshot() -> Snapshot {
        Snapshot::from_json(
            r#"{
                "AAPL": {"prediction": 201.456, "confidence": "60%", "trend": "bullish"},
                "GOOG": {"prediction": 150, "confidence": "85%", "trend": "Bullish"},
                "TSLA": {"prediction": 180, "confidence": "abc", "trend": "bearish"}
            }"#,
            Some(
                r#"{
                    "AAPL": {"sentiment_score": 0.4, "articles": [{"title": "a"}, {"title": "b"}]},
                    "GOOG": {"sentiment_score": 0.1, "articles": []},
                    "TSLA": {"sentiment_score": -0.2, "articles": [{"title": "c"}]}
                }"#,
            ),
        )
        .unwrap()
    }

    #[test]
    fn test_dashboard_table() {
        let out = dashboard(&snapshot(), OutputFormat::Table).unwrap();
        assert!(out.contains("Avg confidence: 73%"));
        assert!(out.contains("Bullish: 2"));
        assert!(out.contains("News: 3"));
        assert!(out.contains("Best prediction: GOOG at 150.00 (85% confidence, Bullish)"));
        assert!(out.contains("201.46"));
        assert!(out.contains("TSLA"));
    }

    #[test]
    fn test_dashboard_json_uses_camel_case() {
        let out = dashboard(&snapshot(), OutputFormat::Json).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["metrics"]["avgConfidence"], 73);
        assert_eq!(value["metrics"]["bullishCount"], 2);
        assert_eq!(value["bestPrediction"]["ticker"], "GOOG");
        assert!(value["failures"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_dashboard_lists_failures() {
        let snap = snapshot().with_failures(vec![stai_core::FetchFailure::new(
            "NVDA",
            "prediction: Not found: /predict/NVDA",
        )]);
        let out = dashboard(&snap, OutputFormat::Table).unwrap();
        assert!(out.ends_with("\n! NVDA: prediction: Not found: /predict/NVDA"));
    }

    #[test]
    fn test_empty_snapshot_shows_placeholder() {
        let out = metrics(&Snapshot::default(), OutputFormat::Table).unwrap();
        assert!(out.contains("Avg confidence: 0%"));
        assert!(out.contains("Best prediction: --"));
    }

    #[test]
    fn test_compare_ranks_by_confidence() {
        let snap = snapshot();
        let out = compare(&snap.portfolio(), &snap.ranked(), OutputFormat::Table).unwrap();
        let goog = out.find("GOOG").unwrap();
        let aapl = out.find("AAPL").unwrap();
        let tsla = out.find("TSLA").unwrap();
        assert!(goog < aapl && aapl < tsla);
        assert!(out.contains("Symbols: 3 (3 ok, 0 failed)"));
    }

    #[test]
    fn test_insights_json() {
        let snap = snapshot();
        let out = insights(&snap.insights(80.0), 80.0, OutputFormat::Json).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["insights"]["potential_buys"], serde_json::json!(["GOOG"]));
        assert_eq!(value["insights"]["underperforming"], serde_json::json!(["TSLA"]));
    }

    #[test]
    fn test_analyze_without_history() {
        let out = analyze("AAPL", &snapshot(), OutputFormat::Table).unwrap();
        assert!(out.contains("60%"));
        assert!(out.contains("- a (--)"));
        assert!(!out.contains("Price change"));
    }
}
