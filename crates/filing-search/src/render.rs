use colored::Colorize;
use filing_spider::{MatchResult, TickerReport, TickerStatus};

// matches
// ----------------------------------------------------------------------------

pub(crate) fn print_matches(matches: &[MatchResult]) {
    if matches.is_empty() {
        println!("{}", "No matches found.".yellow());
        return;
    }

    println!("{}", format!("Found {} matches:", matches.len()).bold());
    for m in matches {
        println!(
            "{} | {} | {}",
            m.ticker.bright_cyan().bold(),
            m.date,
            m.form.to_string().dimmed()
        );
        println!("> {}", collapse_whitespace(&m.snippet));
        println!("---");
    }
}

pub(crate) fn matches_json(matches: &[MatchResult]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(matches)
}

/// Runs of whitespace, newlines included, become a single space.
pub(crate) fn collapse_whitespace(snippet: &str) -> String {
    snippet.split_whitespace().collect::<Vec<_>>().join(" ")
}

// report
// ----------------------------------------------------------------------------

pub(crate) fn print_report(tickers: &[TickerReport]) {
    let bar = "=".repeat(40);
    println!("{bar}\n{:^40}\n{bar}", "Tickers");
    for report in tickers {
        let line = describe(&report.status);
        let line = match &report.status {
            TickerStatus::Scanned { matches, .. } if *matches > 0 => line.green(),
            TickerStatus::Scanned { .. } | TickerStatus::Unresolved | TickerStatus::NoFilings => {
                line.normal()
            }
            TickerStatus::ResolverUnavailable | TickerStatus::CatalogUnavailable { .. } => {
                line.red()
            }
        };
        println!("{:<8} {line}", report.ticker);
    }
}

pub(crate) fn describe(status: &TickerStatus) -> String {
    match status {
        TickerStatus::Unresolved => "no CIK for ticker".to_string(),
        TickerStatus::ResolverUnavailable => "tickers file unavailable".to_string(),
        TickerStatus::NoFilings => "no 10-Q/10-K in window".to_string(),
        TickerStatus::CatalogUnavailable { cause } => format!("filings unavailable: {cause}"),
        TickerStatus::Scanned {
            filings,
            fetched,
            unavailable,
            matches,
        } => {
            let mut line = format!("{matches} matches in {fetched}/{filings} filings");
            if *unavailable > 0 {
                line.push_str(&format!(", {unavailable} unavailable"));
            }
            line
        }
    }
}
