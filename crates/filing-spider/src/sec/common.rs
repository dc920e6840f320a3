use chrono::NaiveDate;
use serde::de::{self, Deserializer, Visitor};
use serde::Serialize;
use std::fmt;

/// The SEC's Central Index Key: a registrant's stable numeric id, kept as its digit string.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Cik(String);

impl Cik {
    /// Accepts a non-empty run of ASCII digits (surrounding whitespace ignored).
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Self(raw.to_string()))
    }

    /// Zero-padded to 10 digits, as the submissions API expects.
    pub fn padded(&self) -> String {
        format!("{:0>10}", self.0)
    }

    /// Leading zeros stripped, as used in archive paths.
    pub fn unpadded(&self) -> &str {
        match self.0.trim_start_matches('0') {
            "" => "0",
            digits => digits,
        }
    }
}

impl fmt::Display for Cik {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Deserialize a CIK from either a JSON number (`320193`) or a string (`"0000320193"`).
pub(crate) fn de_cik<'de, D>(deserializer: D) -> Result<Cik, D::Error>
where
    D: Deserializer<'de>,
{
    struct CikVisitor;

    impl Visitor<'_> for CikVisitor {
        type Value = Cik;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a CIK as a number or a digit string")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Cik(v.to_string()))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            u64::try_from(v)
                .map(|v| Cik(v.to_string()))
                .map_err(|_| E::custom(format!("negative CIK {v}")))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Cik::parse(v).ok_or_else(|| E::custom(format!("invalid CIK {v:?}")))
        }
    }

    deserializer.deserialize_any(CikVisitor)
}

/// The periodic reports worth scanning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum FormType {
    #[serde(rename = "10-Q")]
    QuarterlyReport,
    #[serde(rename = "10-K")]
    AnnualReport,
}

impl FormType {
    /// Exact form code match; amendments such as `10-K/A` are not included.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "10-Q" => Some(Self::QuarterlyReport),
            "10-K" => Some(Self::AnnualReport),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::QuarterlyReport => "10-Q",
            Self::AnnualReport => "10-K",
        }
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Inclusive range of filing dates.
///
/// Dates are held as zero-padded ISO strings, so membership is a plain string comparison.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilingWindow {
    start: String,
    end: String,
}

impl FilingWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: start.format("%Y-%m-%d").to_string(),
            end: end.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    pub fn contains(&self, date: &str) -> bool {
        self.start.as_str() <= date && date <= self.end.as_str()
    }

    /// True when `[from, to]` shares at least one day with the window.
    pub fn overlaps(&self, from: &str, to: &str) -> bool {
        from <= self.end.as_str() && self.start.as_str() <= to
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

/// A 10-Q or 10-K that falls within the filing window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FilingRecord {
    pub ticker: String,
    pub form: FormType,
    pub date: String,
    /// e.g. `0001234567-24-000123`
    pub accession: String,
}

/// The accession reference with its separators removed, as used in archive paths.
pub(crate) fn strip_accession(accession: &str) -> String {
    accession.replace('-', "")
}
