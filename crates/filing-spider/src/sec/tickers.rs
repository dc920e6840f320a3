use super::common::{de_cik, Cik};
use crate::client::Fetch;
use crate::error::{Outcome, SpiderError};
use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tokio::sync::OnceCell;
use tracing::{debug, error, trace};

// resolve
// ----------------------------------------------------------------------------

/// Maps ticker symbols to CIKs using the SEC's company tickers file.
///
/// The file is fetched once, on the first lookup, and reused for the lifetime of the resolver;
/// a failed fetch is remembered too, so the SEC is only ever asked once.
#[derive(Debug)]
pub struct TickerResolver {
    url: String,
    dataset: OnceCell<Result<Vec<FilerRecord>, String>>,
}

impl TickerResolver {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            dataset: OnceCell::new(),
        }
    }

    /// First record whose ticker matches, ignoring case.
    pub async fn resolve<F>(&self, http: &F, ticker: &str) -> Outcome<FilerRecord>
    where
        F: Fetch + ?Sized,
    {
        let records = match self.dataset(http).await {
            Ok(records) => records,
            Err(cause) => {
                return Outcome::Unavailable(SpiderError::ResolutionUnavailable(cause.clone()))
            }
        };

        let wanted = ticker.trim().to_uppercase();
        let found = records
            .iter()
            .find(|record| record.ticker.trim().to_uppercase() == wanted);
        match found {
            Some(record) => {
                trace!("resolved [{ticker}] to CIK {}", record.cik);
                Outcome::Found(record.clone())
            }
            None => {
                debug!("no CIK found for [{ticker}]");
                Outcome::NotFound
            }
        }
    }

    /// Whether the tickers file has been requested yet.
    pub fn is_loaded(&self) -> bool {
        self.dataset.initialized()
    }

    async fn dataset<F>(&self, http: &F) -> &Result<Vec<FilerRecord>, String>
    where
        F: Fetch + ?Sized,
    {
        self.dataset
            .get_or_init(|| async {
                debug!("fetching SEC Company Tickers");
                match fetch_dataset(http, &self.url).await {
                    Ok(records) => {
                        debug!("{} ticker records cached", records.len());
                        Ok(records)
                    }
                    Err(err) => {
                        error!("failed to fetch SEC Company Tickers, error({err})");
                        Err(err.to_string())
                    }
                }
            })
            .await
    }
}

async fn fetch_dataset<F>(http: &F, url: &str) -> Result<Vec<FilerRecord>, SpiderError>
where
    F: Fetch + ?Sized,
{
    let body = http.get_text(url).await?;
    Ok(parse_dataset(&body)?)
}

/// Parse the tickers file in any of the shapes the SEC has served it in.
pub fn parse_dataset(body: &str) -> Result<Vec<FilerRecord>, serde_json::Error> {
    let TickerDataset(records) = serde_json::from_str(body)?;
    Ok(records)
}

// de
// ----------------------------------------------------------------------------

/// One registrant from the tickers file.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct FilerRecord {
    pub ticker: String,
    #[serde(alias = "cik_str", deserialize_with = "de_cik")]
    pub cik: Cik,
    #[serde(default, alias = "name")]
    pub title: Option<String>,
    #[serde(default)]
    pub exchange: Option<String>,
}

struct TickerDataset(Vec<FilerRecord>);

struct TickerDatasetVisitor;

impl<'de> Visitor<'de> for TickerDatasetVisitor {
    type Value = TickerDataset;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a list or map of ticker records")
    }

    // `[{ "cik": 320193, "ticker": "AAPL", ... }, ...]`
    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut records = Vec::new();
        while let Some(value) = seq.next_element::<Value>()? {
            records.extend(record_from(value));
        }
        Ok(TickerDataset(records))
    }

    // either keyed records:
    // `{ "0": { "cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc." }, "1": { ... } }`
    //
    // or the tabular layout of company_tickers_exchange.json:
    // `{ "fields": ["cik", "name", "ticker", "exchange"], "data": [[320193, "Apple Inc.", "AAPL", "Nasdaq"], ...] }`
    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        // keep document order; the first matching ticker wins
        let mut entries: Vec<(String, Value)> = Vec::new();
        while let Some(entry) = map.next_entry::<String, Value>()? {
            entries.push(entry);
        }

        let field = |name: &str| {
            entries
                .iter()
                .find(|(key, _)| key == name)
                .and_then(|(_, value)| value.as_array())
        };
        if let (Some(fields), Some(rows)) = (field("fields"), field("data")) {
            let fields: Option<Vec<&str>> = fields.iter().map(Value::as_str).collect();
            if let Some(fields) = fields {
                let records = rows
                    .iter()
                    .filter_map(|row| {
                        let cells = row.as_array()?;
                        let record: Map<String, Value> = fields
                            .iter()
                            .map(|field| field.to_string())
                            .zip(cells.iter().cloned())
                            .collect();
                        record_from(Value::Object(record))
                    })
                    .collect();
                return Ok(TickerDataset(records));
            }
        }

        Ok(TickerDataset(
            entries
                .into_iter()
                .filter_map(|(_, value)| record_from(value))
                .collect(),
        ))
    }
}

impl<'de> Deserialize<'de> for TickerDataset {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // the SEC has served this file as a list, a keyed map, and a table; accept all three
        deserializer.deserialize_any(TickerDatasetVisitor)
    }
}

// malformed records are skipped, not fatal
fn record_from(value: Value) -> Option<FilerRecord> {
    match serde_json::from_value::<FilerRecord>(value) {
        Ok(record) => Some(record),
        Err(err) => {
            trace!("skipping malformed ticker record, error({err})");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const AS_LIST: &str = r#"[
        {"cik": "0000012345", "ticker": "ABCX", "title": "Abcx Corp"},
        {"cik": 320193, "ticker": "AAPL", "title": "Apple Inc."}
    ]"#;

    const AS_MAP: &str = r#"{
        "0": {"cik_str": 12345, "ticker": "ABCX", "title": "Abcx Corp"},
        "1": {"cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc."}
    }"#;

    const AS_TABLE: &str = r#"{
        "fields": ["cik", "name", "ticker", "exchange"],
        "data": [
            [12345, "Abcx Corp", "ABCX", "Nasdaq"],
            [320193, "Apple Inc.", "AAPL", "Nasdaq"]
        ]
    }"#;

    struct OneFile {
        body: Result<&'static str, u16>,
        calls: AtomicUsize,
    }

    impl OneFile {
        fn new(body: Result<&'static str, u16>) -> Self {
            Self {
                body,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Fetch for OneFile {
        async fn get_text(&self, url: &str) -> Result<String, SpiderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.body {
                Ok(body) => Ok(body.to_string()),
                Err(status) => Err(SpiderError::Status {
                    url: url.to_string(),
                    status,
                }),
            }
        }
    }

    fn ciks(body: &str) -> Vec<(String, String)> {
        parse_dataset(body)
            .unwrap()
            .into_iter()
            .map(|r| (r.ticker, r.cik.unpadded().to_string()))
            .collect()
    }

    #[test]
    fn every_shape_parses_to_the_same_records() {
        let expected = vec![
            ("ABCX".to_string(), "12345".to_string()),
            ("AAPL".to_string(), "320193".to_string()),
        ];
        assert_eq!(ciks(AS_LIST), expected);
        assert_eq!(ciks(AS_MAP), expected);
        assert_eq!(ciks(AS_TABLE), expected);
    }

    #[test]
    fn skips_malformed_records() {
        let body = r#"[
            {"ticker": "NOCIK"},
            "not a record",
            42,
            {"cik": "abc", "ticker": "BAD"},
            {"cik": 7, "ticker": null},
            {"cik": 12345, "ticker": "ABCX"}
        ]"#;
        assert_eq!(ciks(body), vec![("ABCX".to_string(), "12345".to_string())]);

        let table = r#"{"fields": ["cik", "ticker"], "data": [[1], "row", [2, "OK"]]}"#;
        assert_eq!(ciks(table), vec![("OK".to_string(), "2".to_string())]);
    }

    #[test]
    fn keeps_title_and_exchange() {
        let records = parse_dataset(AS_TABLE).unwrap();
        assert_eq!(records[1].title.as_deref(), Some("Apple Inc."));
        assert_eq!(records[1].exchange.as_deref(), Some("Nasdaq"));
    }

    #[tokio::test]
    async fn resolves_case_insensitively_and_fetches_once() {
        let http = OneFile::new(Ok(AS_MAP));
        let resolver = TickerResolver::new("https://www.sec.gov/files/company_tickers.json");
        assert!(!resolver.is_loaded());

        let record = resolver.resolve(&http, "abcx").await.found().unwrap();
        assert_eq!(record.cik.padded(), "0000012345");

        let record = resolver.resolve(&http, " AaPl ").await.found().unwrap();
        assert_eq!(record.cik.unpadded(), "320193");

        assert!(matches!(
            resolver.resolve(&http, "ZZZZ").await,
            Outcome::NotFound
        ));
        assert!(resolver.is_loaded());
        assert_eq!(http.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn ignores_padding_around_dataset_tickers() {
        let body = r#"[{"cik": 12345, "ticker": " ABCX "}, {"cik": 2, "ticker": "abcx\t"}]"#;
        let http = OneFile::new(Ok(body));
        let resolver = TickerResolver::new("tickers");

        let record = resolver.resolve(&http, "ABCX").await.found().unwrap();
        assert_eq!(record.cik.unpadded(), "12345");
    }

    #[tokio::test]
    async fn returns_first_match() {
        let body = r#"[{"cik": 1, "ticker": "DUP"}, {"cik": 2, "ticker": "dup"}]"#;
        let http = OneFile::new(Ok(body));
        let resolver = TickerResolver::new("tickers");

        let record = resolver.resolve(&http, "DUP").await.found().unwrap();
        assert_eq!(record.cik.unpadded(), "1");
    }

    #[tokio::test]
    async fn failed_fetch_is_remembered() {
        let http = OneFile::new(Err(503));
        let resolver = TickerResolver::new("tickers");

        for ticker in ["ABCX", "AAPL", "MSFT"] {
            let outcome = resolver.resolve(&http, ticker).await;
            assert!(matches!(
                outcome,
                Outcome::Unavailable(SpiderError::ResolutionUnavailable(_))
            ));
        }
        assert_eq!(http.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unparseable_dataset_is_unavailable() {
        let http = OneFile::new(Ok("<html>rate limited</html>"));
        let resolver = TickerResolver::new("tickers");

        assert!(resolver.resolve(&http, "ABCX").await.found().is_none());
        assert_eq!(http.calls.load(Ordering::SeqCst), 1);
    }
}
