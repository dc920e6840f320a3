mod common;
mod documents;
mod submissions;
mod tickers;

pub use common::{Cik, FilingRecord, FilingWindow, FormType};
pub use documents::{find_document_link, DocumentLocator};
pub use submissions::FilingCatalog;
pub use tickers::{parse_dataset, FilerRecord, TickerResolver};
