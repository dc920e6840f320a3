use chrono::NaiveDate;
use clap::{Args, Parser, ValueEnum};
use std::path::PathBuf;

pub const DEFAULT_PHRASE: &str = "accrued performance-based compensation";

/// Russell 2000 constituents, used when no tickers are given.
pub const RUSSELL_2000_URL: &str =
    "https://raw.githubusercontent.com/datasets/russell-2000/master/data/russell-2000.csv";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub tickers: TickerSource,

    /// First filing date to include (YYYY-MM-DD).
    #[arg(short, long, default_value = "2024-01-01")]
    pub start: NaiveDate,

    /// Last filing date to include (YYYY-MM-DD).
    #[arg(short, long, default_value = "2025-06-30")]
    pub end: NaiveDate,

    /// Phrase to search for, ignoring case.
    #[arg(short, long, default_value = DEFAULT_PHRASE)]
    pub phrase: String,

    /// Characters of context either side of a match.
    #[arg(short, long, default_value_t = filing_spider::CONTEXT_WIDTH)]
    pub context_width: usize,

    /// Print matches as JSON.
    #[arg(long)]
    pub json: bool,

    /// Print what happened to each ticker after the matches.
    #[arg(long)]
    pub report: bool,

    /// Retries for timeouts, 429s and 5xx responses [env: SEC_MAX_RETRIES].
    #[arg(long)]
    pub retries: Option<u32>,

    /// Requests per second; 0 disables throttling [env: SEC_RATE_LIMIT].
    #[arg(long)]
    pub rate_limit: Option<u32>,

    /// Per-request timeout in seconds [env: SEC_TIMEOUT_SECS].
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Sets the level of tracing.
    #[arg(short, long, global = true)]
    pub trace: Option<TraceLevel>,
}

/// Where the ticker list comes from; the Russell 2000 list if none is given.
#[derive(Args, Debug)]
#[group(multiple = false)]
pub struct TickerSource {
    /// Comma-separated tickers, e.g. `AAPL,MSFT`.
    #[arg(long, value_delimiter = ',')]
    pub tickers: Option<Vec<String>>,

    /// CSV file with one ticker per line (first column).
    #[arg(long)]
    pub tickers_file: Option<PathBuf>,

    /// URL of a CSV with one ticker per line (first column).
    #[arg(long)]
    pub tickers_url: Option<String>,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
#[clap(rename_all = "UPPERCASE")]
pub enum TraceLevel {
    DEBUG,
    ERROR,
    INFO,
    TRACE,
    WARN,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["filing-search"]).unwrap();

        assert_eq!(cli.start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(cli.end, NaiveDate::from_ymd_opt(2025, 6, 30).unwrap());
        assert_eq!(cli.phrase, DEFAULT_PHRASE);
        assert_eq!(cli.context_width, 60);
        assert!(cli.tickers.tickers.is_none());
        assert!(cli.tickers.tickers_file.is_none());
        assert!(cli.tickers.tickers_url.is_none());
        assert!(cli.trace.is_none());
    }

    #[test]
    fn parses_ticker_list_and_trace() {
        let cli = Cli::try_parse_from([
            "filing-search",
            "--tickers",
            "ABCX,msft,ABCX",
            "-t",
            "DEBUG",
        ])
        .unwrap();

        assert_eq!(
            cli.tickers.tickers.unwrap(),
            vec!["ABCX", "msft", "ABCX"]
        );
        assert_eq!(cli.trace, Some(TraceLevel::DEBUG));
    }

    #[test]
    fn rejects_bad_dates_and_mixed_sources() {
        assert!(Cli::try_parse_from(["filing-search", "--start", "2024-13-01"]).is_err());
        assert!(Cli::try_parse_from([
            "filing-search",
            "--tickers",
            "A",
            "--tickers-file",
            "tickers.csv"
        ])
        .is_err());
    }
}
