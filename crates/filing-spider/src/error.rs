use thiserror::Error;

/// Errors raised while talking to the SEC.
#[derive(Debug, Error)]
pub enum SpiderError {
    #[error("request failed, error({0})")]
    Request(#[from] reqwest::Error),

    #[error("GET {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to parse JSON, error({0})")]
    Decode(#[from] serde_json::Error),

    #[error("USER_AGENT is not set; the SEC rejects anonymous requests")]
    MissingUserAgent,

    #[error("invalid value {value:?} for {key}")]
    Config { key: &'static str, value: String },

    #[error("invalid search phrase, error({0})")]
    Phrase(#[from] regex::Error),

    #[error("invalid url {0:?}")]
    InvalidUrl(String),

    #[error("ticker mapping unavailable: {0}")]
    ResolutionUnavailable(String),
}

impl SpiderError {
    /// Timeouts, dropped connections, throttling and 5xx responses; worth another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Request(err) => err.is_timeout() || err.is_connect(),
            Self::Status { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404 | 410, .. })
    }
}

/// Result of a lookup against the SEC that separates "nothing there" from "couldn't ask".
#[derive(Debug)]
pub enum Outcome<T> {
    Found(T),
    NotFound,
    Unavailable(SpiderError),
}

impl<T> Outcome<T> {
    /// Collapse to the plain found / not-found view; unavailability reads as not found.
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound | Self::Unavailable(_) => None,
        }
    }
}

impl<T> From<SpiderError> for Outcome<T> {
    fn from(err: SpiderError) -> Self {
        if err.is_not_found() {
            Outcome::NotFound
        } else {
            Outcome::Unavailable(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16) -> SpiderError {
        SpiderError::Status {
            url: "https://www.sec.gov/".to_string(),
            status,
        }
    }

    #[test]
    fn classifies_statuses() {
        assert!(status(503).is_transient());
        assert!(status(429).is_transient());
        assert!(!status(403).is_transient());
        assert!(status(404).is_not_found());
        assert!(!status(500).is_not_found());
    }

    #[test]
    fn missing_pages_become_not_found() {
        let outcome: Outcome<()> = status(404).into();
        assert!(matches!(outcome, Outcome::NotFound));

        let outcome: Outcome<()> = status(502).into();
        assert!(matches!(outcome, Outcome::Unavailable(_)));
        assert!(outcome.found().is_none());
    }
}
