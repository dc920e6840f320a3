use crate::cli::{TickerSource, RUSSELL_2000_URL};
use anyhow::Context;
use filing_spider::Fetch;
use tracing::{debug, trace};

/// Read the ticker list from whichever source was given, in order, duplicates kept.
pub(crate) async fn load<F: Fetch>(source: TickerSource, http: &F) -> anyhow::Result<Vec<String>> {
    if let Some(tickers) = source.tickers {
        let tickers = tickers
            .iter()
            .map(|ticker| ticker.trim().to_string())
            .filter(|ticker| !ticker.is_empty())
            .collect();
        return Ok(tickers);
    }

    let body = match source.tickers_file {
        Some(path) => {
            trace!("reading tickers from {path:?}");
            tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("failed to read tickers file {path:?}"))?
        }
        None => {
            let url = source.tickers_url.as_deref().unwrap_or(RUSSELL_2000_URL);
            trace!("fetching tickers from {url}");
            http.get_text(url)
                .await
                .with_context(|| format!("failed to fetch tickers from {url}"))?
        }
    };

    let tickers = parse_csv(&body);
    debug!("{} tickers loaded", tickers.len());
    Ok(tickers)
}

/// First column of each non-blank line; a `symbol` or `ticker` header is skipped.
pub(crate) fn parse_csv(body: &str) -> Vec<String> {
    body.lines()
        .filter_map(|line| line.split(',').next())
        .map(|cell| cell.trim().trim_matches('"').trim())
        .enumerate()
        .filter(|(i, cell)| {
            !cell.is_empty()
                && !(*i == 0
                    && (cell.eq_ignore_ascii_case("symbol") || cell.eq_ignore_ascii_case("ticker")))
        })
        .map(|(_, cell)| cell.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use filing_spider::SpiderError;
    use std::sync::Mutex;

    #[test]
    fn takes_first_column_and_skips_header() {
        let csv = "Symbol,Name\nABCX,Abcx Corp\n\n  msft , Microsoft\r\n\"DEFY\",Defy\nABCX,again\n";
        assert_eq!(parse_csv(csv), vec!["ABCX", "msft", "DEFY", "ABCX"]);
    }

    #[test]
    fn header_is_only_skipped_on_the_first_line() {
        assert_eq!(parse_csv("ticker\nAAPL"), vec!["AAPL"]);
        assert_eq!(parse_csv("AAPL\nTICKER"), vec!["AAPL", "TICKER"]);
        assert!(parse_csv("").is_empty());
    }

    struct Csv {
        requested: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Fetch for Csv {
        async fn get_text(&self, url: &str) -> Result<String, SpiderError> {
            self.requested.lock().unwrap().push(url.to_string());
            Ok("symbol\nIWM\nABCX\n".to_string())
        }
    }

    fn csv() -> Csv {
        Csv {
            requested: Mutex::new(Vec::new()),
        }
    }

    #[tokio::test]
    async fn explicit_list_needs_no_requests() {
        let http = csv();
        let source = TickerSource {
            tickers: Some(vec!["ABCX".into(), " ".into(), " msft".into()]),
            tickers_file: None,
            tickers_url: None,
        };

        assert_eq!(load(source, &http).await.unwrap(), vec!["ABCX", "msft"]);
        assert!(http.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn falls_back_to_russell_2000() {
        let http = csv();
        let source = TickerSource {
            tickers: None,
            tickers_file: None,
            tickers_url: None,
        };

        assert_eq!(load(source, &http).await.unwrap(), vec!["IWM", "ABCX"]);
        assert_eq!(*http.requested.lock().unwrap(), vec![RUSSELL_2000_URL]);
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let source = TickerSource {
            tickers: None,
            tickers_file: Some("does/not/exist.csv".into()),
            tickers_url: None,
        };

        assert!(load(source, &csv()).await.is_err());
    }
}
