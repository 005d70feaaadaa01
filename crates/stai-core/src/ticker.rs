//! Ticker symbols and ticker-keyed maps

use crate::error::{Error, Result};
use regex::Regex;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use std::sync::LazyLock;

static TICKER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9.^=\-]{1,15}$").expect("ticker pattern is valid"));

/// Trim and uppercase a user-supplied symbol, then validate it
///
/// Accepts plain symbols (`AAPL`), exchange suffixes (`RELIANCE.NS`),
/// index carets (`^GSPC`) and pairs (`BTC-USD`).
pub fn normalize_ticker(raw: &str) -> Result<String> {
    let ticker = raw.trim().to_uppercase();
    if TICKER_PATTERN.is_match(&ticker) {
        Ok(ticker)
    } else {
        Err(Error::InvalidTicker(raw.to_string()))
    }
}

/// Ordered map from ticker to record
///
/// Iterates in first-insertion order. Inserting a ticker that is already
/// present replaces its value in place, so the last write wins without
/// moving the entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerMap<T> {
    entries: Vec<(String, T)>,
}

impl<T> Default for TickerMap<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> TickerMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, returning the replaced value if the ticker existed
    pub fn insert(&mut self, ticker: impl Into<String>, value: T) -> Option<T> {
        let ticker = ticker.into();
        match self.entries.iter_mut().find(|(t, _)| *t == ticker) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((ticker, value));
                None
            }
        }
    }

    pub fn get(&self, ticker: &str) -> Option<&T> {
        self.entries.iter().find(|(t, _)| t == ticker).map(|(_, v)| v)
    }

    pub fn contains_key(&self, ticker: &str) -> bool {
        self.get(ticker).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(t, v)| (t.as_str(), v))
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(t, _)| t.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl<T, K: Into<String>> FromIterator<(K, T)> for TickerMap<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<T, K: Into<String>> Extend<(K, T)> for TickerMap<T> {
    fn extend<I: IntoIterator<Item = (K, T)>>(&mut self, iter: I) {
        for (ticker, value) in iter {
            self.insert(ticker, value);
        }
    }
}

impl<T> IntoIterator for TickerMap<T> {
    type Item = (String, T);
    type IntoIter = std::vec::IntoIter<(String, T)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<T: Serialize> Serialize for TickerMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (ticker, value) in &self.entries {
            map.serialize_entry(ticker, value)?;
        }
        map.end()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for TickerMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct TickerMapVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for TickerMapVisitor<T> {
            type Value = TickerMap<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object keyed by ticker symbol")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut map = TickerMap::new();
                while let Some((ticker, value)) = access.next_entry::<String, T>()? {
                    map.insert(ticker, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(TickerMapVisitor(PhantomData))
    }
}
