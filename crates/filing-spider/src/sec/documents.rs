use super::common::{strip_accession, Cik};
use crate::client::Fetch;
use crate::error::{Outcome, SpiderError};
use regex::Regex;
use reqwest::Url;
use tracing::{debug, trace};

lazy_static::lazy_static! {
    /// The target of every `<a href=...>` on a page, quoted or not; `data-href` and the like
    /// are not `href`.
    static ref HREF: Regex =
        Regex::new(r#"(?is)<a\s(?:[^>]*?\s)?href\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
            .expect("href pattern compiles");
}

/// Finds and downloads the full-text submission of a filing from the EDGAR archives.
///
/// 1. GET `Archives/edgar/data/{cik}/{accession digits}/{accession}-index.html`
/// 2. pick the full-text `.txt` link under the accession (see [`find_document_link`])
/// 3. GET that link
#[derive(Clone, Debug)]
pub struct DocumentLocator {
    archives_url: Url,
}

impl DocumentLocator {
    /// `archives_url` may carry a path prefix (a mirror); archive paths are joined beneath it.
    pub fn new(archives_url: &str) -> Result<Self, SpiderError> {
        let mut url = Url::parse(archives_url)
            .map_err(|_| SpiderError::InvalidUrl(archives_url.to_string()))?;
        if url.cannot_be_a_base() {
            return Err(SpiderError::InvalidUrl(archives_url.to_string()));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Self { archives_url: url })
    }

    pub fn index_url(&self, cik: &Cik, accession: &str) -> Result<Url, SpiderError> {
        let path = format!(
            "Archives/edgar/data/{}/{}/{accession}-index.html",
            cik.unpadded(),
            strip_accession(accession)
        );
        self.archives_url
            .join(&path)
            .map_err(|_| SpiderError::InvalidUrl(path))
    }

    /// The raw text of the filing; never partial. A missing index page or document link is
    /// [`Outcome::NotFound`], a failed request [`Outcome::Unavailable`].
    pub async fn fetch_document<F>(&self, http: &F, cik: &Cik, accession: &str) -> Outcome<String>
    where
        F: Fetch + ?Sized,
    {
        let index_url = match self.index_url(cik, accession) {
            Ok(url) => url,
            Err(err) => return Outcome::Unavailable(err),
        };

        trace!("fetching filing index {index_url}");
        let index = match http.get_text(index_url.as_str()).await {
            Ok(body) => body,
            Err(err) => {
                debug!("filing index unavailable for {accession}, error({err})");
                return err.into();
            }
        };

        let Some(document_url) = find_document_link(&index_url, &index, accession) else {
            debug!("no full-text document linked from {index_url}");
            return Outcome::NotFound;
        };

        trace!("fetching filing document {document_url}");
        match http.get_text(document_url.as_str()).await {
            Ok(text) => Outcome::Found(text),
            Err(err) => {
                debug!("filing document unavailable for {accession}, error({err})");
                err.into()
            }
        }
    }
}

/// The full-text link on an index page, resolved against the page.
///
/// Candidates are `.txt` links whose path contains the accession digits; `{accession}.txt`
/// (the complete submission) is preferred, otherwise the first candidate wins.
pub fn find_document_link(index_url: &Url, html: &str, accession: &str) -> Option<Url> {
    let digits = strip_accession(accession);
    let full_submission = format!("{accession}.txt");

    let candidates: Vec<String> = HREF
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .map(|href| href.as_str().trim().replace("&amp;", "&"))
        .filter(|href| {
            let path = link_path(href);
            path.to_ascii_lowercase().ends_with(".txt") && path.contains(&digits)
        })
        .collect();

    candidates
        .iter()
        .find(|href| {
            let path = link_path(href);
            let file = path.rsplit('/').next().unwrap_or(path);
            file.eq_ignore_ascii_case(&full_submission)
        })
        .or_else(|| candidates.first())
        .and_then(|href| index_url.join(href).ok())
}

fn link_path(href: &str) -> &str {
    href.split(['?', '#']).next().unwrap_or_default()
}
