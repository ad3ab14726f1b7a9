//! Console output formatter for consensus reports

use crate::output::formatter::OutputFormatter;
use autopilot_domain::core::text::{format_duration_ms, truncate};
use autopilot_domain::{ConsensusReport, ConsensusVerdict, ModelVerdict, Verdict};
use colored::{ColoredString, Colorize};

const SUMMARY_WIDTH: usize = 72;

/// Formats consensus reports for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete report
    pub fn format(report: &ConsensusReport) -> String {
        let mut output = String::new();

        output.push_str(&Self::header(report.mode().display_name()));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n\n",
            "Question:".cyan().bold(),
            truncate(report.question(), 400)
        ));

        output.push_str(&format!(
            "{} {}  {}\n",
            "Verdict:".cyan().bold(),
            Self::colored_verdict(report.verdict()),
            report.vote_summary()
        ));
        output.push_str(&format!("{} {}\n", "Why:".cyan().bold(), report.rationale()));

        output.push_str(&Self::section_header("Votes"));
        for vote in report.votes() {
            output.push_str(&Self::format_vote(vote));
        }

        let concerns = report.all_concerns();
        if !concerns.is_empty() {
            output.push_str(&format!("\n{}\n", "Concerns:".yellow().bold()));
            for concern in &concerns {
                output.push_str(&format!("  * {}\n", concern));
            }
        }

        let suggestions = report.all_suggestions();
        if !suggestions.is_empty() {
            output.push_str(&format!("\n{}\n", "Suggestions:".green().bold()));
            for suggestion in &suggestions {
                output.push_str(&format!("  * {}\n", suggestion));
            }
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(report: &ConsensusReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    /// The markdown report, unchanged
    pub fn format_markdown(report: &ConsensusReport) -> String {
        report.summary().to_string()
    }

    fn format_vote(vote: &ModelVerdict) -> String {
        let label = format!("{:<8}", vote.verdict.label());
        let label = match (&vote.error, vote.verdict) {
            (Some(_), _) => label.dimmed(),
            (None, Verdict::Approve) => label.green().bold(),
            (None, Verdict::SuggestChanges) => label.yellow().bold(),
            (None, Verdict::Reject) => label.red().bold(),
            (None, Verdict::Abstain) => label.dimmed(),
        };

        let detail = match &vote.error {
            Some(error) => format!("not counted: {}", error).dimmed().to_string(),
            None => truncate(&vote.summary, SUMMARY_WIDTH),
        };

        format!(
            "  {} {:<16} {:>7}  {}\n",
            label,
            vote.model,
            format_duration_ms(vote.response_time_ms),
            detail
        )
    }

    fn colored_verdict(verdict: ConsensusVerdict) -> ColoredString {
        match verdict {
            ConsensusVerdict::Approved => verdict.label().green().bold(),
            ConsensusVerdict::Rejected => verdict.label().red().bold(),
            ConsensusVerdict::Split | ConsensusVerdict::Inconclusive => {
                verdict.label().yellow().bold()
            }
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!(
            "\n{}\n{}\n{}\n",
            line.cyan(),
            format!("  {}", title).cyan().bold(),
            line.cyan()
        )
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n", format!("[{}]", title).magenta().bold())
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, report: &ConsensusReport) -> String {
        ConsoleFormatter::format(report)
    }

    fn format_json(&self, report: &ConsensusReport) -> String {
        ConsoleFormatter::format_json(report)
    }

    fn format_markdown(&self, report: &ConsensusReport) -> String {
        ConsoleFormatter::format_markdown(report)
    }
}
