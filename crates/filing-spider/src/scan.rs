use crate::error::SpiderError;
use regex::{Regex, RegexBuilder};
use tracing::warn;

/// Characters of context kept on either side of a match.
pub const CONTEXT_WIDTH: usize = 60;

/// Case-insensitive search for a literal phrase, returning each hit with its surrounding text.
#[derive(Clone, Debug)]
pub struct PhraseScanner {
    // `None` for an empty phrase, which matches nothing
    pattern: Option<Regex>,
    context_width: usize,
}

impl PhraseScanner {
    pub fn new(phrase: &str, context_width: usize) -> Result<Self, SpiderError> {
        let pattern = match phrase {
            "" => None,
            phrase => Some(
                RegexBuilder::new(&regex::escape(phrase))
                    .case_insensitive(true)
                    .build()?,
            ),
        };

        Ok(Self {
            pattern,
            context_width,
        })
    }

    pub fn context_width(&self) -> usize {
        self.context_width
    }

    /// One snippet per occurrence, left to right: up to `context_width` characters either side
    /// of the phrase, with the phrase in the document's own casing.
    pub fn find_matches(&self, text: &str) -> Vec<String> {
        let Some(pattern) = &self.pattern else {
            return Vec::new();
        };

        pattern
            .find_iter(text)
            .map(|hit| {
                let start = text[..hit.start()]
                    .char_indices()
                    .rev()
                    .take(self.context_width)
                    .last()
                    .map_or(hit.start(), |(i, _)| i);
                let end = text[hit.end()..]
                    .char_indices()
                    .nth(self.context_width)
                    .map_or(text.len(), |(i, _)| hit.end() + i);
                text[start..end].to_string()
            })
            .collect()
    }
}

/// Convenience wrapper over [`PhraseScanner`] for a single document.
pub fn find_matches(text: &str, phrase: &str, context_width: usize) -> Vec<String> {
    match PhraseScanner::new(phrase, context_width) {
        Ok(scanner) => scanner.find_matches(text),
        Err(err) => {
            warn!("cannot search for {phrase:?}, error({err})");
            Vec::new()
        }
    }
}
