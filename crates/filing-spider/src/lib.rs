pub mod client;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod scan;

/// [SEC] EDGAR endpoints: the company tickers file, per-CIK submissions, and the filing
/// archives.
///
/// [SEC]: https://www.sec.gov/search-filings/edgar-application-programming-interfaces
pub mod sec;

mod tui;

pub use client::{EdgarClient, Fetch};
pub use config::SpiderConfig;
pub use error::{Outcome, SpiderError};
pub use pipeline::{MatchResult, Pipeline, RunReport, TickerReport, TickerStatus};
pub use scan::{find_matches, PhraseScanner, CONTEXT_WIDTH};

/// Shortcut for required API elements.
pub(crate) mod http {
    pub(crate) use reqwest::Client as HttpClient;
}
