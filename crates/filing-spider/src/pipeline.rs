use crate::client::{EdgarClient, Fetch};
use crate::config::SpiderConfig;
use crate::error::{Outcome, SpiderError};
use crate::scan::PhraseScanner;
use crate::sec::{DocumentLocator, FilingCatalog, FilingWindow, FormType, TickerResolver};
use crate::tui::Progress;
use futures::{stream, StreamExt};
use indicatif::ProgressBar;
use serde::Serialize;
use tracing::{debug, info, trace, warn};

/// One occurrence of the phrase in one filing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub ticker: String,
    pub date: String,
    pub form: FormType,
    pub snippet: String,
}

/// Why a ticker did or did not produce matches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TickerStatus {
    /// Not in the SEC tickers file.
    Unresolved,
    /// The tickers file could not be fetched this run.
    ResolverUnavailable,
    /// No 10-Q or 10-K inside the window.
    NoFilings,
    CatalogUnavailable { cause: String },
    Scanned {
        filings: usize,
        fetched: usize,
        unavailable: usize,
        matches: usize,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TickerReport {
    pub ticker: String,
    #[serde(flatten)]
    pub status: TickerStatus,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct RunReport {
    pub matches: Vec<MatchResult>,
    pub tickers: Vec<TickerReport>,
}

/// Resolve → list filings → fetch each document → scan, one ticker at a time.
///
/// No ticker or filing can abort the run; failures only leave it out of the results.
pub struct Pipeline<F> {
    http: F,
    resolver: TickerResolver,
    catalog: FilingCatalog,
    locator: DocumentLocator,
    tui: bool,
}

impl Pipeline<EdgarClient> {
    pub fn from_config(config: &SpiderConfig) -> Result<Self, SpiderError> {
        Self::new(EdgarClient::new(config)?, config)
    }
}

impl<F: Fetch> Pipeline<F> {
    pub fn new(http: F, config: &SpiderConfig) -> Result<Self, SpiderError> {
        Ok(Self {
            http,
            resolver: TickerResolver::new(config.tickers_url.as_str()),
            catalog: FilingCatalog::new(config.data_url.as_str()),
            locator: DocumentLocator::new(&config.archives_url)?,
            tui: false,
        })
    }

    /// Draw progress bars while running.
    pub fn with_tui(mut self, tui: bool) -> Self {
        self.tui = tui;
        self
    }

    pub fn http(&self) -> &F {
        &self.http
    }

    /// Every match, in ticker order, then filing order, then position within the document.
    pub async fn run<S>(
        &self,
        tickers: &[S],
        window: &FilingWindow,
        scanner: &PhraseScanner,
    ) -> Vec<MatchResult>
    where
        S: AsRef<str>,
    {
        self.run_with_report(tickers, window, scanner).await.matches
    }

    /// [`Pipeline::run`], plus a status line per ticker.
    pub async fn run_with_report<S>(
        &self,
        tickers: &[S],
        window: &FilingWindow,
        scanner: &PhraseScanner,
    ) -> RunReport
    where
        S: AsRef<str>,
    {
        let time = std::time::Instant::now();
        let progress = Progress::new(tickers.len(), self.tui);
        let mut report = RunReport::default();

        let mut stream = stream::iter(tickers);
        while let Some(ticker) = stream.next().await {
            let ticker: &str = ticker.as_ref();
            let spinner = progress.spinner(format!("searching filings for [{ticker}]"));

            let status = self
                .search_ticker(ticker, window, scanner, &spinner, &mut report.matches)
                .await;
            trace!("[{ticker}] finished: {status:?}");

            spinner.finish_and_clear();
            match &status {
                TickerStatus::Scanned { matches, .. } if *matches > 0 => progress.matched.inc(1),
                TickerStatus::Scanned { .. } => {}
                _ => progress.skipped.inc(1),
            }
            progress.total.inc(1);

            report.tickers.push(TickerReport {
                ticker: ticker.to_string(),
                status,
            });
        }
        progress.finish();

        info!(
            "searched {} tickers, {} matches found, time elapsed: {:?}",
            tickers.len(),
            report.matches.len(),
            time.elapsed()
        );
        report
    }

    async fn search_ticker(
        &self,
        ticker: &str,
        window: &FilingWindow,
        scanner: &PhraseScanner,
        spinner: &ProgressBar,
        matches: &mut Vec<MatchResult>,
    ) -> TickerStatus {
        // resolve
        let filer = match self.resolver.resolve(&self.http, ticker).await {
            Outcome::Found(filer) => filer,
            Outcome::NotFound => return TickerStatus::Unresolved,
            Outcome::Unavailable(err) => {
                debug!("skipping [{ticker}], error({err})");
                return TickerStatus::ResolverUnavailable;
            }
        };

        // list filings
        let filings = match self
            .catalog
            .list_filings(&self.http, ticker, &filer.cik, window)
            .await
        {
            Outcome::Found(filings) if !filings.is_empty() => filings,
            Outcome::Found(_) | Outcome::NotFound => {
                debug!("no filings for [{ticker}] within the window");
                return TickerStatus::NoFilings;
            }
            Outcome::Unavailable(err) => {
                warn!("failed to list filings for [{ticker}], error({err})");
                return TickerStatus::CatalogUnavailable {
                    cause: err.to_string(),
                };
            }
        };

        // fetch & scan each filing
        let (mut fetched, mut unavailable, mut found) = (0, 0, 0);
        for filing in &filings {
            spinner.set_message(format!(
                "scanning {} filed {} for [{ticker}]",
                filing.form, filing.date
            ));

            let text = match self
                .locator
                .fetch_document(&self.http, &filer.cik, &filing.accession)
                .await
            {
                Outcome::Found(text) => text,
                Outcome::NotFound => {
                    debug!("no document for [{ticker}] {}", filing.accession);
                    continue;
                }
                Outcome::Unavailable(err) => {
                    warn!(
                        "failed to fetch [{ticker}] {} {}, error({err})",
                        filing.form, filing.accession
                    );
                    unavailable += 1;
                    continue;
                }
            };
            fetched += 1;

            for snippet in scanner.find_matches(&text) {
                matches.push(MatchResult {
                    ticker: ticker.to_string(),
                    date: filing.date.clone(),
                    form: filing.form,
                    snippet,
                });
                found += 1;
            }
        }

        debug!(
            "[{ticker}] {found} matches across {fetched}/{} filings",
            filings.len()
        );
        TickerStatus::Scanned {
            filings: filings.len(),
            fetched,
            unavailable,
            matches: found,
        }
    }
}
