//! Progress reporting for consensus rounds

use autopilot_application::ports::progress::ConsensusProgress;
use autopilot_domain::core::text::format_duration_ms;
use autopilot_domain::{ConsensusMode, ConsensusReport, Model, ModelVerdict};
use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// Reports progress during a consensus round with a progress bar
pub struct ProgressReporter {
    multi: MultiProgress,
    round_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            round_bar: Mutex::new(None),
        }
    }

    fn round_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn vote_line(model: &Model, vote: &ModelVerdict) -> String {
        match &vote.error {
            Some(error) => format!("{} {} ({})", "x".red(), model, error),
            None => format!(
                "{} {} {} in {}",
                "v".green(),
                model,
                vote.verdict.label(),
                format_duration_ms(vote.response_time_ms)
            ),
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsensusProgress for ProgressReporter {
    fn on_round_start(&self, mode: ConsensusMode, models: &[Model]) {
        let pb = self.multi.add(ProgressBar::new(models.len() as u64));
        pb.set_style(Self::round_style());
        pb.set_prefix(mode.display_name().to_string());
        pb.set_message("Waiting for votes...");

        if let Ok(mut bar) = self.round_bar.lock() {
            *bar = Some(pb);
        }
    }

    fn on_vote(&self, model: &Model, vote: &ModelVerdict) {
        if let Ok(bar) = self.round_bar.lock()
            && let Some(pb) = bar.as_ref()
        {
            pb.set_message(Self::vote_line(model, vote));
            pb.inc(1);
        }
    }

    fn on_round_complete(&self, report: &ConsensusReport) {
        if let Ok(mut bar) = self.round_bar.lock()
            && let Some(pb) = bar.take()
        {
            pb.finish_with_message(format!(
                "{} {}",
                report.verdict().label().bold(),
                report.vote_summary()
            ));
        }
    }
}

/// Simple text-based progress (no fancy UI), written to stderr
pub struct SimpleProgress;

impl ConsensusProgress for SimpleProgress {
    fn on_round_start(&self, mode: ConsensusMode, models: &[Model]) {
        eprintln!(
            "{} {} ({} models)",
            "->".cyan(),
            mode.display_name().bold(),
            models.len()
        );
    }

    fn on_vote(&self, model: &Model, vote: &ModelVerdict) {
        eprintln!("  {}", ProgressReporter::vote_line(model, vote));
    }

    fn on_round_complete(&self, report: &ConsensusReport) {
        eprintln!("  => {}\n", report.verdict().label());
    }
}
