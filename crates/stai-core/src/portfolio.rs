//! Multi-ticker comparison views
//!
//! Portfolio metrics and the confidence ranking back the compare screen;
//! [`Insights`] backs the insights screen.

use crate::confidence::NormalizedConfidence;
use crate::model::RawPrediction;
use crate::ticker::TickerMap;
use crate::trend::Trend;
use serde::{Deserialize, Serialize};

/// Confidence at or above which a bullish ticker is a potential buy
pub const DEFAULT_BUY_THRESHOLD: f64 = 80.0;

/// Risk bucket reported by the prediction API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

/// Counts and averages over a set of predictions
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PortfolioMetrics {
    pub total_symbols: usize,
    pub successful_predictions: usize,
    pub failed_predictions: usize,
    /// Mean confidence of successful records, one decimal; `None` if none valid
    pub average_confidence: Option<f64>,
    pub bullish_count: usize,
    pub bearish_count: usize,
    pub neutral_count: usize,
    pub high_risk_count: usize,
    pub medium_risk_count: usize,
    pub low_risk_count: usize,
}

impl PortfolioMetrics {
    pub fn from_predictions(predictions: &TickerMap<RawPrediction>) -> Self {
        let mut metrics = Self {
            total_symbols: predictions.len(),
            ..Self::default()
        };
        let mut confidences = Vec::new();

        for record in predictions.values().filter(|p| p.is_success()) {
            metrics.successful_predictions += 1;

            if let Some(conf) = record.normalized_confidence() {
                confidences.push(conf.value());
            }

            match record.trend_kind() {
                Trend::Bullish => metrics.bullish_count += 1,
                Trend::Bearish => metrics.bearish_count += 1,
                Trend::Neutral => metrics.neutral_count += 1,
                Trend::Unknown => {}
            }

            match record.risk_level.as_deref().and_then(RiskLevel::parse) {
                Some(RiskLevel::High) => metrics.high_risk_count += 1,
                Some(RiskLevel::Medium) => metrics.medium_risk_count += 1,
                Some(RiskLevel::Low) => metrics.low_risk_count += 1,
                None => {}
            }
        }

        metrics.failed_predictions = metrics.total_symbols - metrics.successful_predictions;
        if !confidences.is_empty() {
            let mean = confidences.iter().sum::<f64>() / confidences.len() as f64;
            metrics.average_confidence = Some((mean * 10.0).round() / 10.0);
        }

        metrics
    }
}

/// One row of the comparison ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPrediction {
    pub ticker: String,
    pub confidence: Option<f64>,
    pub success: bool,
    pub record: RawPrediction,
}

/// Successful records first, then by confidence descending
///
/// Invalid confidences sort as zero. The sort is stable, so equal entries
/// keep map order.
pub fn rank_by_confidence(predictions: &TickerMap<RawPrediction>) -> Vec<RankedPrediction> {
    let mut ranked: Vec<RankedPrediction> = predictions
        .iter()
        .map(|(ticker, record)| RankedPrediction {
            ticker: ticker.to_string(),
            confidence: record.normalized_confidence().map(NormalizedConfidence::value),
            success: record.is_success(),
            record: record.clone(),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.success.cmp(&a.success).then_with(|| {
            let (ca, cb) = (a.confidence.unwrap_or(0.0), b.confidence.unwrap_or(0.0));
            cb.total_cmp(&ca)
        })
    });

    ranked
}

/// Tickers grouped for the insights screen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insights {
    pub top_bullish: Vec<String>,
    pub potential_buys: Vec<String>,
    pub underperforming: Vec<String>,
}

impl Insights {
    /// Bucket tickers by trend; bullish ones at or above `buy_threshold`
    /// confidence are also potential buys
    pub fn from_predictions(predictions: &TickerMap<RawPrediction>, buy_threshold: f64) -> Self {
        let mut insights = Self::default();

        for (ticker, record) in predictions.iter().filter(|(_, p)| p.is_success()) {
            match record.trend_kind() {
                Trend::Bullish => {
                    insights.top_bullish.push(ticker.to_string());
                    let confident = record
                        .normalized_confidence()
                        .is_some_and(|c| c.value() >= buy_threshold);
                    if confident {
                        insights.potential_buys.push(ticker.to_string());
                    }
                }
                Trend::Bearish => insights.underperforming.push(ticker.to_string()),
                Trend::Neutral | Trend::Unknown => {}
            }
        }

        insights
    }
}
