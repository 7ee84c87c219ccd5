use abgraft::engine::assemble::HumanizationResult;
use abgraft::engine::error::PipelineError;
use abgraft::engine::progress::{Progress, ProgressCallback};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const SPINNER_TICK_MS: u64 = 80;

/// Running totals for a batch, by chain label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchTally {
    pub heavy: usize,
    pub light: usize,
    pub failed: usize,
}

impl BatchTally {
    pub fn summary(&self) -> String {
        format!("{} VH, {} VL, {} failed", self.heavy, self.light, self.failed)
    }
}

/// One bar tick per record on stderr, labelled with the chains humanized and
/// the records that failed so far. Safe to update from rayon workers.
pub struct BatchProgress {
    bar: ProgressBar,
    heavy: AtomicUsize,
    light: AtomicUsize,
    failed: AtomicUsize,
}

impl BatchProgress {
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    #[cfg(test)]
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), target);
        Self {
            bar,
            heavy: AtomicUsize::new(0),
            light: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        }
    }

    pub fn start(&self, records: usize) {
        self.bar.set_style(bar_style());
        self.bar.set_length(records as u64);
        self.bar.set_position(0);
        self.bar.set_message(self.tally().summary());
    }

    pub fn record(&self, outcome: &Result<HumanizationResult, PipelineError>) {
        match outcome {
            Ok(result) => {
                for chain in result.chains() {
                    let counter = if chain.chain_type.is_heavy() {
                        &self.heavy
                    } else {
                        &self.light
                    };
                    counter.fetch_add(1, Ordering::Relaxed);
                }
            }
            Err(_) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.bar.set_message(self.tally().summary());
        self.bar.inc(1);
    }

    pub fn finish(&self) -> BatchTally {
        let tally = self.tally();
        self.bar.finish_with_message(tally.summary());
        tally
    }

    pub fn clear(&self) {
        self.bar.finish_and_clear();
    }

    pub fn tally(&self) -> BatchTally {
        BatchTally {
            heavy: self.heavy.load(Ordering::Relaxed),
            light: self.light.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }

    /// Shows the phases of a single paired run as a spinner. Task events are
    /// ignored; record ticks come from [`BatchProgress::record`].
    pub fn pipeline_callback(&self) -> ProgressCallback<'static> {
        let bar = self.bar.clone();
        Box::new(move |event: Progress| match event {
            Progress::PhaseStart { name } => {
                bar.set_style(spinner_style());
                bar.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                bar.set_message(name);
            }
            Progress::PhaseFinish => bar.disable_steady_tick(),
            Progress::Message(msg) => bar.println(format!("  {msg}")),
            Progress::TaskStart { .. } | Progress::TaskIncrement | Progress::TaskFinish => {}
        })
    }
}

impl Default for BatchProgress {
    fn default() -> Self {
        Self::new()
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("[{bar:40.cyan/blue}] {pos}/{len} records  {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-")
}
