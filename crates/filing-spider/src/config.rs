use crate::error::SpiderError;
use dotenv::var;
use std::str::FromStr;
use std::time::Duration;
use tracing::trace;

pub const TICKERS_URL: &str = "https://www.sec.gov/files/company_tickers_exchange.json";
pub const DATA_URL: &str = "https://data.sec.gov";
pub const ARCHIVES_URL: &str = "https://www.sec.gov";

/// Settings shared by every SEC request; read from the environment (and `.env`).
#[derive(Clone, Debug)]
pub struct SpiderConfig {
    /// Sent as the `User-Agent` header on every request.
    pub user_agent: String,
    pub tickers_url: String,
    pub data_url: String,
    pub archives_url: String,
    pub timeout: Duration,
    /// Requests per second; the SEC allows 10, so 9 for good measure.
    pub rate_limit: u32,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl SpiderConfig {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            tickers_url: TICKERS_URL.to_string(),
            data_url: DATA_URL.to_string(),
            archives_url: ARCHIVES_URL.to_string(),
            timeout: Duration::from_secs(30),
            rate_limit: 9,
            max_retries: 0,
            retry_backoff: Duration::from_millis(500),
        }
    }

    /// Build the config from `USER_AGENT` plus the optional `SEC_*` overrides.
    pub fn from_env() -> Result<Self, SpiderError> {
        dotenv::dotenv().ok();

        let user_agent = var("USER_AGENT")
            .ok()
            .filter(|agent| !agent.trim().is_empty())
            .ok_or(SpiderError::MissingUserAgent)?;
        let mut config = Self::new(user_agent.trim());

        if let Ok(url) = var("SEC_TICKERS_URL") {
            config.tickers_url = url;
        }
        if let Ok(url) = var("SEC_DATA_URL") {
            config.data_url = url;
        }
        if let Ok(url) = var("SEC_ARCHIVES_URL") {
            config.archives_url = url;
        }
        if let Some(secs) = parse_var::<u64>("SEC_TIMEOUT_SECS")? {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(rate) = parse_var::<u32>("SEC_RATE_LIMIT")? {
            config.rate_limit = rate;
        }
        if let Some(retries) = parse_var::<u32>("SEC_MAX_RETRIES")? {
            config.max_retries = retries;
        }
        if let Some(millis) = parse_var::<u64>("SEC_RETRY_BACKOFF_MS")? {
            config.retry_backoff = Duration::from_millis(millis);
        }

        trace!("spider config loaded: {config:?}");
        Ok(config)
    }

    /// Minimum gap between two request starts; zero disables throttling.
    pub fn request_interval(&self) -> Duration {
        match self.rate_limit {
            0 => Duration::ZERO,
            rate => Duration::from_secs(1) / rate,
        }
    }
}

fn parse_var<T: FromStr>(key: &'static str) -> Result<Option<T>, SpiderError> {
    match var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| SpiderError::Config { key, value }),
        Err(_) => Ok(None),
    }
}
