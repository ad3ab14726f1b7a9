//! Output formatter trait

use autopilot_domain::ConsensusReport;

/// Trait for formatting consensus reports
pub trait OutputFormatter {
    /// Format the complete report for a terminal
    fn format(&self, report: &ConsensusReport) -> String;

    /// Format as JSON
    fn format_json(&self, report: &ConsensusReport) -> String;

    /// Format as the markdown comment published to the tracker
    fn format_markdown(&self, report: &ConsensusReport) -> String;
}
