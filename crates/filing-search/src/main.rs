mod cli;
mod render;
mod tickers;

// remote imports
use clap::Parser;
use cli::{Cli, TraceLevel};
use filing_spider::sec::FilingWindow;
use filing_spider::{Pipeline, PhraseScanner, SpiderConfig};
use std::time::Duration;
use tracing::{debug, subscriber, trace, Level};
use tracing_subscriber::FmtSubscriber;

////////////////////////////////////////////////////////////////////////////

// preproccess the trace level, and open the .env file
fn preprocess(trace_level: Level) {
    dotenv::dotenv().ok();
    let my_subscriber = FmtSubscriber::builder()
        .with_max_level(trace_level)
        .finish();
    subscriber::set_global_default(my_subscriber).expect("Set subscriber");
}

// environment first, then any overrides given on the command line
fn config(cli: &Cli) -> anyhow::Result<SpiderConfig> {
    let mut config = SpiderConfig::from_env()?;
    if let Some(retries) = cli.retries {
        config.max_retries = retries;
    }
    if let Some(rate) = cli.rate_limit {
        config.rate_limit = rate;
    }
    if let Some(secs) = cli.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    Ok(config)
}

////////////////////////////////////////////////////////////////////////////

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // set the trace level
    if let Some(trace_level) = cli.trace {
        preprocess(match trace_level {
            TraceLevel::DEBUG => Level::DEBUG,
            TraceLevel::ERROR => Level::ERROR,
            TraceLevel::INFO => Level::INFO,
            TraceLevel::TRACE => Level::TRACE,
            TraceLevel::WARN => Level::WARN,
        });
    }
    trace!("command line input recorded: {cli:?}");

    // if no trace level provided, use tui
    let tui = cli.trace.is_none();

    let window = FilingWindow::new(cli.start, cli.end);
    if window.is_empty() {
        anyhow::bail!("--start {} is after --end {}", cli.start, cli.end);
    }
    let scanner = PhraseScanner::new(&cli.phrase, cli.context_width)?;

    let config = config(&cli)?;
    let pipeline = Pipeline::from_config(&config)?.with_tui(tui);
    debug!("edgar client built for {}", config.user_agent);

    let Cli {
        tickers: source,
        json,
        report,
        ..
    } = cli;
    let tickers = tickers::load(source, pipeline.http()).await?;

    if tui && !json {
        let bar = "=".repeat(40);
        println!(
            "{bar}\n{:^40}\n{bar}",
            format!("{} tickers, {} to {}", tickers.len(), window.start(), window.end())
        );
    }

    let results = pipeline.run_with_report(&tickers, &window, &scanner).await;

    if json {
        println!("{}", render::matches_json(&results.matches)?);
    } else {
        render::print_matches(&results.matches);
    }
    if report {
        render::print_report(&results.tickers);
    }

    Ok(())
}
