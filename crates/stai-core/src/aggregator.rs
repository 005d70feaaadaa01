//! Dashboard headline numbers
//!
//! [`aggregate`] and [`best_prediction`] are pure functions of one snapshot.
//! Neither fails: unparseable or out-of-range confidences are left out of the
//! average and can never be picked as the best prediction, and every other
//! irregularity falls back to a zero count or the `"--"` sentinel.

use crate::confidence::NormalizedConfidence;
use crate::model::{RawPrediction, RawSentiment};
use crate::ticker::TickerMap;
use serde::{Serialize, Serializer};
use tracing::debug;

/// Ticker, price and trend shown when there is nothing to show
pub const PLACEHOLDER: &str = "--";

/// Summary statistics across all tickers
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateMetrics {
    /// Mean of valid confidences, rounded to a whole percent
    pub avg_confidence: u32,
    pub bullish_count: usize,
    /// Mean sentiment score, rounded to two decimals
    pub avg_sentiment: f64,
    pub news_count: usize,
}

/// Highest-confidence prediction in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestPrediction {
    pub ticker: String,
    /// Serialized as `"--"` when absent
    #[serde(serialize_with = "price_or_placeholder")]
    pub prediction: Option<f64>,
    /// Normalized percentage; 0 for the sentinel
    pub confidence: f64,
    pub trend: String,
    /// The winning record, `None` for the sentinel
    #[serde(skip)]
    pub record: Option<RawPrediction>,
}

impl BestPrediction {
    pub fn sentinel() -> Self {
        Self {
            ticker: PLACEHOLDER.to_string(),
            prediction: None,
            confidence: 0.0,
            trend: PLACEHOLDER.to_string(),
            record: None,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.record.is_none()
    }

    fn from_record(ticker: &str, record: &RawPrediction, confidence: NormalizedConfidence) -> Self {
        Self {
            ticker: ticker.to_string(),
            prediction: record.prediction,
            confidence: confidence.value(),
            trend: record.trend.clone().unwrap_or_else(|| PLACEHOLDER.to_string()),
            record: Some(record.clone()),
        }
    }

    /// Predicted price formatted for display, `"--"` when absent
    pub fn prediction_display(&self) -> String {
        self.prediction
            .map_or_else(|| PLACEHOLDER.to_string(), |p| format!("{p:.2}"))
    }
}

#[allow(clippy::ref_option)]
fn price_or_placeholder<S>(price: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match price {
        Some(p) => serializer.serialize_f64(*p),
        None => serializer.serialize_str(PLACEHOLDER),
    }
}

impl Default for BestPrediction {
    fn default() -> Self {
        Self::sentinel()
    }
}

/// Normalized confidences of every record, skipping invalid ones
pub fn valid_confidences(predictions: &TickerMap<RawPrediction>) -> Vec<f64> {
    predictions
        .iter()
        .filter_map(|(ticker, p)| {
            let normalized = p.normalized_confidence();
            if normalized.is_none() {
                debug!(ticker, confidence = ?p.confidence, "Discarding invalid confidence");
            }
            normalized.map(NormalizedConfidence::value)
        })
        .collect()
}

/// Compute the dashboard's summary statistics
///
/// Returns all-zero metrics when either map is empty.
pub fn aggregate(
    predictions: &TickerMap<RawPrediction>,
    sentiments: &TickerMap<RawSentiment>,
) -> AggregateMetrics {
    if predictions.is_empty() || sentiments.is_empty() {
        return AggregateMetrics::default();
    }

    let confidences = valid_confidences(predictions);
    let avg_confidence = if confidences.is_empty() {
        0
    } else {
        let mean = confidences.iter().sum::<f64>() / confidences.len() as f64;
        mean.round() as u32
    };

    let bullish_count = predictions
        .values()
        .filter(|p| p.trend_kind().is_bullish())
        .count();

    let total_sentiment: f64 = sentiments.values().map(|s| s.sentiment_score).sum();
    let avg_sentiment = round_to_cents(total_sentiment / sentiments.len() as f64);

    let news_count = sentiments.values().map(RawSentiment::article_count).sum();

    AggregateMetrics {
        avg_confidence,
        bullish_count,
        avg_sentiment,
        news_count,
    }
}

/// Pick the prediction with the highest valid confidence
///
/// Folds in map order starting from the sentinel, replacing the current best
/// only on a strictly greater confidence, so the first of equal entries wins
/// and a snapshot with no valid confidence above zero yields the sentinel.
pub fn best_prediction(predictions: &TickerMap<RawPrediction>) -> BestPrediction {
    predictions
        .iter()
        .fold(BestPrediction::sentinel(), |best, (ticker, record)| {
            match record.normalized_confidence() {
                Some(conf) if conf.value() > best.confidence => {
                    BestPrediction::from_record(ticker, record, conf)
                }
                _ => best,
            }
        })
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confidence::RawConfidence;
    use crate::model::Article;

    fn prediction(confidence: impl Into<RawConfidence>, trend: &str) -> RawPrediction {
        RawPrediction {
            confidence: confidence.into(),
            trend: Some(trend.to_string()),
            ..RawPrediction::default()
        }
    }

    fn sentiment(score: f64, articles: usize) -> RawSentiment {
        RawSentiment {
            sentiment_score: score,
            articles: vec![Article::default(); articles],
            ..RawSentiment::default()
        }
    }

    #[test]
    fn test_empty_inputs_are_zero() {
        let metrics = aggregate(&TickerMap::new(), &TickerMap::new());
        assert_eq!(metrics, AggregateMetrics::default());
    }

    #[test]
    fn test_one_side_empty_is_zero() {
        let predictions: TickerMap<_> =
            [("AAPL", prediction(0.9, "bullish"))].into_iter().collect();
        let metrics = aggregate(&predictions, &TickerMap::new());
        assert_eq!(metrics, AggregateMetrics::default());
    }

    #[test]
    fn test_bullish_and_average() {
        let predictions: TickerMap<_> = [
            ("AAPL", prediction(0.9, "Bullish")),
            ("TSLA", prediction(0.5, "bearish")),
        ]
        .into_iter()
        .collect();
        let sentiments: TickerMap<_> = [("AAPL", sentiment(0.0, 0))].into_iter().collect();

        let metrics = aggregate(&predictions, &sentiments);
        assert_eq!(metrics.bullish_count, 1);
        assert_eq!(metrics.avg_confidence, 70);
    }

    #[test]
    fn test_invalid_confidences_excluded_not_zeroed() {
        let predictions: TickerMap<_> = [
            ("AAPL", prediction("80%", "up")),
            ("GOOG", prediction("abc", "UP")),
            ("TSLA", prediction(RawConfidence::Missing, "neutral")),
            ("MSFT", prediction(150.0, "bullish")),
        ]
        .into_iter()
        .collect();
        let sentiments: TickerMap<_> = [("AAPL", sentiment(0.0, 0))].into_iter().collect();

        let metrics = aggregate(&predictions, &sentiments);
        assert_eq!(metrics.avg_confidence, 80);
        assert_eq!(metrics.bullish_count, 3);
    }

    #[test]
    fn test_no_valid_confidence() {
        let predictions: TickerMap<_> =
            [("AAPL", prediction("n/a", "bullish"))].into_iter().collect();
        let sentiments: TickerMap<_> = [("AAPL", sentiment(0.3, 2))].into_iter().collect();

        let metrics = aggregate(&predictions, &sentiments);
        assert_eq!(metrics.avg_confidence, 0);
        assert_eq!(metrics.news_count, 2);
    }

    #[test]
    fn test_sentiment_average_and_news() {
        let predictions: TickerMap<_> =
            [("AAPL", prediction(0.7, "bullish"))].into_iter().collect();
        let sentiments: TickerMap<_> = [
            ("AAPL", sentiment(0.25, 3)),
            ("GOOG", sentiment(-0.5, 0)),
            ("TSLA", sentiment(0.1, 5)),
        ]
        .into_iter()
        .collect();

        let metrics = aggregate(&predictions, &sentiments);
        assert_eq!(metrics.avg_sentiment, -0.05);
        assert_eq!(metrics.news_count, 8);
    }

    #[test]
    fn test_missing_sentiment_counts_in_divisor() {
        let predictions: TickerMap<_> =
            [("AAPL", prediction(0.7, "bullish"))].into_iter().collect();
        let sentiments: TickerMap<_> = [
            ("AAPL", sentiment(0.6, 1)),
            ("TSLA", RawSentiment::fallback()),
        ]
        .into_iter()
        .collect();

        assert_eq!(aggregate(&predictions, &sentiments).avg_sentiment, 0.3);
    }

    #[test]
    fn test_average_rounds_to_nearest() {
        let predictions: TickerMap<_> = [
            ("A", prediction(70.0, "x")),
            ("B", prediction(71.0, "x")),
        ]
        .into_iter()
        .collect();
        let sentiments: TickerMap<_> = [("A", sentiment(0.0, 0))].into_iter().collect();

        assert_eq!(aggregate(&predictions, &sentiments).avg_confidence, 71);
    }

    #[test]
    fn test_best_prediction_picks_highest_valid() {
        let predictions: TickerMap<_> = [
            ("AAPL", prediction("60%", "bullish")),
            ("GOOG", prediction("85%", "bullish")),
            ("TSLA", prediction("abc", "bearish")),
        ]
        .into_iter()
        .collect();

        let best = best_prediction(&predictions);
        assert_eq!(best.ticker, "GOOG");
        assert_eq!(best.confidence, 85.0);
        assert!(!best.is_sentinel());
    }

    #[test]
    fn test_best_prediction_empty_is_sentinel() {
        let best = best_prediction(&TickerMap::new());
        assert_eq!(best.ticker, "--");
        assert_eq!(best.trend, "--");
        assert_eq!(best.confidence, 0.0);
        assert_eq!(best.prediction_display(), "--");
        assert!(best.is_sentinel());
    }

    #[test]
    fn test_sentinel_serializes_placeholders() {
        let json = serde_json::to_value(BestPrediction::sentinel()).unwrap();
        assert_eq!(json["ticker"], "--");
        assert_eq!(json["prediction"], "--");
        assert_eq!(json["confidence"], 0.0);
        assert_eq!(json["trend"], "--");
        assert!(json.get("record").is_none());

        let mut record = prediction("85%", "up");
        record.prediction = Some(150.0);
        let predictions: TickerMap<_> = [("GOOG", record)].into_iter().collect();
        let json = serde_json::to_value(best_prediction(&predictions)).unwrap();
        assert_eq!(json["prediction"], 150.0);
    }

    #[test]
    fn test_best_prediction_first_wins_ties() {
        let predictions: TickerMap<_> = [
            ("TSLA", prediction(0.8, "up")),
            ("AAPL", prediction("80%", "up")),
        ]
        .into_iter()
        .collect();

        assert_eq!(best_prediction(&predictions).ticker, "TSLA");
    }

    #[test]
    fn test_invalid_never_wins() {
        let predictions: TickerMap<_> = [
            ("AAPL", prediction("abc", "up")),
            ("TSLA", prediction(f64::NAN, "up")),
        ]
        .into_iter()
        .collect();

        assert!(best_prediction(&predictions).is_sentinel());
    }

    #[test]
    fn test_best_prediction_carries_record() {
        let mut record = prediction(0.9, "Bullish");
        record.prediction = Some(201.456);
        let predictions: TickerMap<_> = [("NVDA", record.clone())].into_iter().collect();

        let best = best_prediction(&predictions);
        assert_eq!(best.prediction_display(), "201.46");
        assert_eq!(best.trend, "Bullish");
        assert_eq!(best.record, Some(record));
    }

    #[test]
    fn test_metrics_serialize_camel_case() {
        let json = serde_json::to_value(AggregateMetrics {
            avg_confidence: 70,
            bullish_count: 1,
            avg_sentiment: 0.12,
            news_count: 4,
        })
        .unwrap();

        assert_eq!(json["avgConfidence"], 70);
        assert_eq!(json["bullishCount"], 1);
        assert_eq!(json["avgSentiment"], 0.12);
        assert_eq!(json["newsCount"], 4);
    }
}
