use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress bars for a run over many tickers; every bar is hidden when `tui` is off.
pub(crate) struct Progress {
    multi: Option<MultiProgress>,
    pub total: ProgressBar,
    pub matched: ProgressBar,
    pub skipped: ProgressBar,
}

impl Progress {
    pub(crate) fn new(len: usize, tui: bool) -> Self {
        if !tui {
            return Self {
                multi: None,
                total: ProgressBar::hidden(),
                matched: ProgressBar::hidden(),
                skipped: ProgressBar::hidden(),
            };
        }

        // overall multi progress bar
        let multi = MultiProgress::new();

        // total number of tickers to search
        let total = multi.add(
            ProgressBar::new(len as u64).with_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.magenta}\n \
                        {msg:>9.white} |{bar:57.white/grey}| {pos:<2} / {human_len} \
                        ({percent_precise}%) [Time: {elapsed}, Rate: {per_sec}, ETA: {eta}]",
                    )
                    .expect("failed to set progress bar style")
                    .progress_chars("## "),
            ),
        );
        total.set_message("total");
        total.enable_steady_tick(Duration::from_millis(100));

        // tickers with at least one match
        let matched = multi.insert_after(
            &total,
            ProgressBar::new(len as u64).with_style(
                ProgressStyle::default_bar()
                    .template(" {msg:>9.green} |{bar:57.green}| {pos:<2.green}")
                    .expect("failed to set progress bar style")
                    .progress_chars("## "),
            ),
        );
        matched.set_message("matched");

        // tickers skipped: unresolved, no filings, or unavailable
        let skipped = multi.insert_after(
            &matched,
            ProgressBar::new(len as u64).with_style(
                ProgressStyle::default_bar()
                    .template(" {msg:>9.red} |{bar:57.red}| {pos:<2.red}")
                    .expect("failed to set progress bar style")
                    .progress_chars("## "),
            ),
        );
        skipped.set_message("skipped");

        Self {
            multi: Some(multi),
            total,
            matched,
            skipped,
        }
    }

    /// A spinner line for the ticker currently being searched.
    pub(crate) fn spinner(&self, msg: String) -> ProgressBar {
        match &self.multi {
            Some(m) => {
                let spinner = m.add(
                    ProgressBar::new_spinner().with_message(msg).with_style(
                        ProgressStyle::default_spinner()
                            .template("\t   > {msg}")
                            .expect("failed to set spinner style"),
                    ),
                );
                spinner.enable_steady_tick(Duration::from_millis(50));
                spinner
            }
            None => ProgressBar::hidden(),
        }
    }

    pub(crate) fn finish(&self) {
        self.total.finish_and_clear();
        self.matched.finish_and_clear();
        self.skipped.finish_and_clear();
    }
}
