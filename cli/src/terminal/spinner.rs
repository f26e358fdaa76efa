use indicatif::ProgressStyle;
use tracing::{Span, info_span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

const TICK_STRINGS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

/// Progress bar attached to the `sweep` span. Lines printed while it is
/// visible go through the indicatif writer and stay above it.
pub struct SweepProgress {
    span: Span,
}

impl SweepProgress {
    pub fn new(total: usize) -> Self {
        let span = info_span!("sweep", indicatif.pb_show = true);
        let style = ProgressStyle::with_template(
            "{spinner:.blue} {pos}/{len} probes {wide_bar:.green/bright_black} {elapsed} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .tick_strings(TICK_STRINGS)
        .progress_chars("━╸ ");

        span.pb_set_style(&style);
        span.pb_set_length(total as u64);
        span.pb_set_message("Press Ctrl-C to stop early");

        Self { span }
    }

    pub fn span(&self) -> Span {
        self.span.clone()
    }

    pub fn advance(&self) {
        self.span.pb_inc(1);
    }
}
