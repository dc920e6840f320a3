// Per-CIK submissions feed, i.e.:
//
// 1. read submissions/CIK0000000000.json
//
// 2. zip `filings.recent` (parallel arrays of form, filingDate, accessionNumber) by index
//
// 3. if 'files' IS NOT EMPTY -> read each older page whose date range touches the window
//
// 4. keep 10-Q & 10-K filings dated within the window
use super::common::{Cik, FilingRecord, FilingWindow, FormType};
use crate::client::Fetch;
use crate::error::{Outcome, SpiderError};
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{debug, trace, warn};

/// Lists a filer's periodic reports from the SEC submissions API.
#[derive(Clone, Debug)]
pub struct FilingCatalog {
    data_url: String,
}

impl FilingCatalog {
    pub fn new(data_url: impl Into<String>) -> Self {
        Self {
            data_url: data_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn submissions_url(&self, cik: &Cik) -> String {
        format!("{}/submissions/CIK{}.json", self.data_url, cik.padded())
    }

    fn page_url(&self, name: &str) -> String {
        format!("{}/submissions/{name}", self.data_url)
    }

    /// Every 10-Q and 10-K in `window`, in feed order.
    ///
    /// A missing feed is [`Outcome::NotFound`]; a failed or unreadable one is
    /// [`Outcome::Unavailable`]. An empty `Found` means the filer has nothing in the window.
    pub async fn list_filings<F>(
        &self,
        http: &F,
        ticker: &str,
        cik: &Cik,
        window: &FilingWindow,
    ) -> Outcome<Vec<FilingRecord>>
    where
        F: Fetch + ?Sized,
    {
        let url = self.submissions_url(cik);
        let submissions: Submissions = match fetch_json(http, &url).await {
            Ok(submissions) => submissions,
            Err(err) => {
                debug!("submissions unavailable for [{ticker}] CIK {cik}, error({err})");
                return err.into();
            }
        };

        let mut seen = HashSet::new();
        let mut records = Vec::new();
        submissions
            .filings
            .recent
            .select(ticker, window, &mut seen, &mut records);

        for page in &submissions.filings.files {
            if !page.overlaps(window) {
                trace!("skipping submissions page {} for [{ticker}]", page.name);
                continue;
            }

            let url = self.page_url(&page.name);
            match fetch_json::<_, FilingColumns>(http, &url).await {
                Ok(columns) => columns.select(ticker, window, &mut seen, &mut records),
                Err(err) => warn!("failed to read submissions page {url} for [{ticker}], error({err})"),
            }
        }

        debug!(
            "{} filings found for [{ticker}] between {} and {}",
            records.len(),
            window.start(),
            window.end()
        );
        Outcome::Found(records)
    }
}

async fn fetch_json<F, T>(http: &F, url: &str) -> Result<T, SpiderError>
where
    F: Fetch + ?Sized,
    T: serde::de::DeserializeOwned,
{
    let body = http.get_text(url).await?;
    Ok(serde_json::from_str(&body)?)
}

// de
// ----------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct Submissions {
    #[serde(default)]
    filings: Filings,
}

#[derive(Debug, Default, Deserialize)]
struct Filings {
    #[serde(default)]
    recent: FilingColumns,
    #[serde(default)]
    files: Vec<FilingPage>,
}

// The SEC serves filings as parallel arrays; index `i` of each array describes the same filing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilingColumns {
    #[serde(default)]
    accession_number: Vec<String>,
    #[serde(default)]
    filing_date: Vec<String>,
    #[serde(default)]
    form: Vec<String>,
}

impl FilingColumns {
    fn select(
        &self,
        ticker: &str,
        window: &FilingWindow,
        seen: &mut HashSet<String>,
        records: &mut Vec<FilingRecord>,
    ) {
        let (forms, dates, accessions) = (
            self.form.len(),
            self.filing_date.len(),
            self.accession_number.len(),
        );
        if forms != dates || dates != accessions {
            warn!(
                "uneven submissions arrays for [{ticker}] (form: {forms}, filingDate: {dates}, \
                accessionNumber: {accessions}); trailing entries ignored"
            );
        }

        for ((form, date), accession) in self
            .form
            .iter()
            .zip(self.filing_date.iter())
            .zip(self.accession_number.iter())
        {
            let Some(form) = FormType::from_code(form) else {
                continue;
            };
            if !window.contains(date) || !seen.insert(accession.clone()) {
                continue;
            }

            records.push(FilingRecord {
                ticker: ticker.to_string(),
                form,
                date: date.clone(),
                accession: accession.clone(),
            });
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilingPage {
    name: String,
    #[serde(default)]
    filing_from: Option<String>,
    #[serde(default)]
    filing_to: Option<String>,
}

impl FilingPage {
    // pages without a date range are always read
    fn overlaps(&self, window: &FilingWindow) -> bool {
        match (&self.filing_from, &self.filing_to) {
            (Some(from), Some(to)) => window.overlaps(from, to),
            _ => true,
        }
    }
}
