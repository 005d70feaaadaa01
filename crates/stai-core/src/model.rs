//! Per-ticker records returned by the analytics API
//!
//! The API's payloads are untrusted: fields go missing, change type between
//! deployments, or use camelCase on one endpoint and snake_case on another.
//! Every record here deserializes from any JSON value. A field of the wrong
//! type degrades to its documented default instead of failing the record.

use crate::confidence::{NormalizedConfidence, RawConfidence};
use crate::lenient;
use crate::trend::Trend;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Prediction record for one ticker
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawPrediction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    /// Predicted price
    pub prediction: Option<f64>,
    pub confidence: RawConfidence,
    pub trend: Option<String>,
    /// Missing scores read as zero
    #[serde(rename = "sentimentScore")]
    pub sentiment_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,
    /// `None` when the API did not say; treated as success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RawPrediction {
    /// Placeholder the dashboard shows for a ticker whose fetch failed
    pub fn fallback() -> Self {
        Self {
            prediction: Some(0.0),
            confidence: RawConfidence::Number(0.0),
            trend: Some("neutral".to_string()),
            ..Self::default()
        }
    }

    /// Read a record from any JSON value; non-objects give an empty record
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        Self {
            ticker: lenient::string(obj, &["ticker", "symbol"]),
            prediction: lenient::number(obj, &["prediction", "predicted_price", "predictedPrice"]),
            confidence: lenient::field(obj, &["confidence"])
                .map_or(RawConfidence::Missing, RawConfidence::from_value),
            trend: lenient::string(obj, &["trend"]),
            sentiment_score: lenient::number(obj, &["sentimentScore", "sentiment_score"])
                .unwrap_or(0.0),
            name: lenient::string(obj, &["name"]),
            current_price: lenient::number(obj, &["current_price", "currentPrice"]),
            risk_level: lenient::string(obj, &["risk_level", "riskLevel"]),
            success: lenient::boolean(obj, &["success"]),
            error: lenient::string(obj, &["error"]),
        }
    }

    pub fn normalized_confidence(&self) -> Option<NormalizedConfidence> {
        self.confidence.normalize()
    }

    pub fn trend_kind(&self) -> Trend {
        Trend::classify_opt(self.trend.as_deref())
    }

    /// A record failed if the API flagged it or attached an error
    pub fn is_success(&self) -> bool {
        self.success != Some(false) && self.error.is_none()
    }
}

impl<'de> Deserialize<'de> for RawPrediction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from_value(&Value::deserialize(deserializer)?))
    }
}

/// Sentiment label of a single article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "positive" => Some(Self::Positive),
            "neutral" => Some(Self::Neutral),
            "negative" => Some(Self::Negative),
            _ => None,
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        })
    }
}

/// News article attached to a sentiment record
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Article {
    pub title: Option<String>,
    pub url: Option<String>,
    pub source: Option<String>,
    pub sentiment: Option<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
}

impl Article {
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        // NewsAPI nests the source name; the dashboard API flattens it.
        let source = match lenient::field(obj, &["source"]) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Object(src)) => lenient::string(src, &["name"]),
            _ => None,
        };

        Self {
            title: lenient::string(obj, &["title"]),
            url: lenient::string(obj, &["url"]),
            source,
            sentiment: lenient::string(obj, &["sentiment"]),
            published_at: lenient::string(obj, &["publishedAt", "published_at"]),
        }
    }

    pub fn label(&self) -> Option<SentimentLabel> {
        self.sentiment.as_deref().and_then(SentimentLabel::parse)
    }
}

impl<'de> Deserialize<'de> for Article {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from_value(&Value::deserialize(deserializer)?))
    }
}

/// Article counts per sentiment label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub positive: u32,
    pub neutral: u32,
    pub negative: u32,
}

impl SentimentSummary {
    pub fn from_articles<'a>(articles: impl IntoIterator<Item = &'a Article>) -> Self {
        let mut summary = Self::default();
        for label in articles.into_iter().filter_map(Article::label) {
            match label {
                SentimentLabel::Positive => summary.positive = summary.positive.saturating_add(1),
                SentimentLabel::Neutral => summary.neutral = summary.neutral.saturating_add(1),
                SentimentLabel::Negative => summary.negative = summary.negative.saturating_add(1),
            }
        }
        summary
    }

    fn from_map(obj: &Map<String, Value>) -> Self {
        Self {
            positive: lenient::count(obj, &["positive"]),
            neutral: lenient::count(obj, &["neutral"]),
            negative: lenient::count(obj, &["negative"]),
        }
    }

    /// Sum of all labels, widened past `u32`
    pub fn total(&self) -> u64 {
        u64::from(self.positive) + u64::from(self.neutral) + u64::from(self.negative)
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Majority of positive versus negative; ties are neutral
    pub fn overall(&self) -> SentimentLabel {
        match self.positive.cmp(&self.negative) {
            std::cmp::Ordering::Greater => SentimentLabel::Positive,
            std::cmp::Ordering::Less => SentimentLabel::Negative,
            std::cmp::Ordering::Equal => SentimentLabel::Neutral,
        }
    }
}

/// Sentiment record for one ticker
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawSentiment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    /// Missing scores read as zero
    pub sentiment_score: f64,
    pub articles: Vec<Article>,
    pub summary: SentimentSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RawSentiment {
    /// Placeholder the dashboard shows for a ticker whose fetch failed
    pub fn fallback() -> Self {
        Self::default()
    }

    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let articles = match lenient::field(obj, &["articles"]) {
            Some(Value::Array(items)) => items.iter().map(Article::from_value).collect(),
            _ => Vec::new(),
        };

        let summary = match lenient::field(obj, &["summary"]) {
            Some(Value::Object(s)) => SentimentSummary::from_map(s),
            _ => SentimentSummary::default(),
        };

        Self {
            ticker: lenient::string(obj, &["ticker", "symbol"]),
            sentiment_score: lenient::number(obj, &["sentiment_score", "sentimentScore"])
                .unwrap_or(0.0),
            articles,
            summary,
            message: lenient::string(obj, &["message"]),
        }
    }

    pub fn article_count(&self) -> usize {
        self.articles.len()
    }

    /// Server-side counts when present, otherwise counted from the articles
    pub fn effective_summary(&self) -> SentimentSummary {
        if self.summary.is_empty() {
            SentimentSummary::from_articles(&self.articles)
        } else {
            self.summary
        }
    }
}

impl<'de> Deserialize<'de> for RawSentiment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from_value(&Value::deserialize(deserializer)?))
    }
}

/// One closing price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: String,
    pub close: f64,
}

/// Closing price history for one ticker
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceHistory {
    pub ticker: Option<String>,
    pub history: Vec<PricePoint>,
}

/// Change between the first and last close of a history
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceChange {
    pub first: f64,
    pub last: f64,
    pub absolute: f64,
    pub percent: f64,
}

impl PriceHistory {
    /// Accepts `{"history": [...]}` or a bare array of points
    ///
    /// Points without a numeric close are dropped.
    pub fn from_value(value: &Value) -> Self {
        let (ticker, points) = match value {
            Value::Object(obj) => (
                lenient::string(obj, &["ticker", "symbol"]),
                lenient::field(obj, &["history", "prices"]).and_then(Value::as_array),
            ),
            Value::Array(items) => (None, Some(items)),
            _ => (None, None),
        };

        let history = points
            .into_iter()
            .flatten()
            .filter_map(|item| {
                let obj = item.as_object()?;
                let close = lenient::number(obj, &["close", "Close", "price"])?;
                let date = match lenient::field(obj, &["date", "Date", "timestamp"]) {
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                    None => String::new(),
                };
                Some(PricePoint { date, close })
            })
            .collect();

        Self { ticker, history }
    }

    pub fn change(&self) -> Option<PriceChange> {
        let [first, .., last] = self.history.as_slice() else {
            return None;
        };
        if first.close == 0.0 {
            return None;
        }

        let absolute = last.close - first.close;
        Some(PriceChange {
            first: first.close,
            last: last.close,
            absolute,
            percent: absolute / first.close * 100.0,
        })
    }
}

impl<'de> Deserialize<'de> for PriceHistory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from_value(&Value::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_huge_server_summary_does_not_overflow() {
        let raw = RawSentiment::from_value(&json!({
            "summary": {"positive": 4_294_967_295_u64, "neutral": 0, "negative": 1}
        }));
        let summary = raw.effective_summary();

        assert_eq!(summary.positive, u32::MAX);
        assert_eq!(summary.total(), u64::from(u32::MAX) + 1);
        assert!(!summary.is_empty());
        assert_eq!(summary.overall(), SentimentLabel::Positive);
    }

    #[test]
    fn test_prediction_from_compare_payload() {
        let raw: RawPrediction = serde_json::from_value(json!({
            "symbol": "AAPL",
            "name": "Apple Inc.",
            "current_price": "189.50",
            "predicted_price": "195.10",
            "confidence": "87%",
            "trend": "Bullish",
            "risk_level": "Low",
            "success": true
        }))
        .unwrap();

        assert_eq!(raw.ticker.as_deref(), Some("AAPL"));
        assert_eq!(raw.prediction, Some(195.1));
        assert_eq!(raw.current_price, Some(189.5));
        assert_eq!(raw.normalized_confidence().map(NormalizedConfidence::value), Some(87.0));
        assert_eq!(raw.trend_kind(), Trend::Bullish);
        assert!(raw.is_success());
    }

    #[test]
    fn test_prediction_tolerates_garbage() {
        let raw: RawPrediction = serde_json::from_value(json!({
            "prediction": {"nested": true},
            "confidence": [1, 2],
            "trend": 42,
            "sentimentScore": "lots"
        }))
        .unwrap();

        assert_eq!(raw.prediction, None);
        assert_eq!(raw.confidence, RawConfidence::Missing);
        assert_eq!(raw.trend, None);
        assert_eq!(raw.sentiment_score, 0.0);

        let not_object: RawPrediction = serde_json::from_value(json!("oops")).unwrap();
        assert_eq!(not_object, RawPrediction::default());
    }

    #[test]
    fn test_prediction_failure_flags() {
        let failed = RawPrediction::from_value(&json!({"symbol": "XYZ", "error": "model missing"}));
        assert!(!failed.is_success());

        let flagged = RawPrediction::from_value(&json!({"success": false}));
        assert!(!flagged.is_success());

        assert!(RawPrediction::fallback().is_success());
    }

    #[test]
    fn test_sentiment_score_aliases() {
        let camel = RawSentiment::from_value(&json!({"sentimentScore": 0.25}));
        let snake = RawSentiment::from_value(&json!({"sentiment_score": -0.5}));
        assert_eq!(camel.sentiment_score, 0.25);
        assert_eq!(snake.sentiment_score, -0.5);
    }

    #[test]
    fn test_sentiment_articles() {
        let raw = RawSentiment::from_value(&json!({
            "ticker": "TSLA",
            "articles": [
                {
                    "title": "Deliveries beat",
                    "source": {"name": "Reuters"},
                    "sentiment": "positive"
                },
                {"title": "Recall", "source": "Bloomberg", "sentiment": "Negative"},
                {
                    "title": "Flat day",
                    "sentiment": "positive",
                    "publishedAt": "2024-05-01T10:00:00Z"
                }
            ]
        }));

        assert_eq!(raw.article_count(), 3);
        assert_eq!(raw.articles[0].source.as_deref(), Some("Reuters"));
        assert_eq!(raw.articles[1].source.as_deref(), Some("Bloomberg"));
        assert_eq!(raw.articles[2].published_at.as_deref(), Some("2024-05-01T10:00:00Z"));

        let summary = raw.effective_summary();
        assert_eq!(summary, SentimentSummary { positive: 2, neutral: 0, negative: 1 });
        assert_eq!(summary.overall(), SentimentLabel::Positive);
    }

    #[test]
    fn test_server_summary_preferred() {
        let raw = RawSentiment::from_value(&json!({
            "summary": {"positive": 1, "neutral": 0, "negative": 4},
            "articles": [{"sentiment": "positive"}]
        }));
        assert_eq!(raw.effective_summary().negative, 4);
        assert_eq!(raw.effective_summary().overall(), SentimentLabel::Negative);
    }

    #[test]
    fn test_articles_not_a_list() {
        let raw = RawSentiment::from_value(&json!({"articles": "none"}));
        assert_eq!(raw.article_count(), 0);
    }

    #[test]
    fn test_price_history_change() {
        let history = PriceHistory::from_value(&json!({
            "history": [
                {"date": "2024-01-01", "close": 100.0},
                {"date": "2024-01-02", "close": "n/a"},
                {"date": "2024-01-03", "close": 110.0}
            ]
        }));

        assert_eq!(history.history.len(), 2);
        let change = history.change().unwrap();
        assert_eq!(change.absolute, 10.0);
        assert_eq!(change.percent, 10.0);
    }

    #[test]
    fn test_price_history_too_short() {
        let history = PriceHistory::from_value(&json!([{"date": "2024-01-01", "close": 5.0}]));
        assert!(history.change().is_none());
        assert!(PriceHistory::default().change().is_none());
    }
}
