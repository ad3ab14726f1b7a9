//! Markdown rendering of a consensus round.
//!
//! The table columns and the verdict vocabulary are grepped by downstream
//! consumers, so both stay fixed.

use super::consensus::ConsensusReport;
use crate::core::text::format_duration_ms;

/// Render the full markdown report
pub fn render_markdown(report: &ConsensusReport) -> String {
    let mut out = format!(
        "## {}: {}\n\n",
        report.mode().display_name(),
        report.verdict().label()
    );

    out.push_str("| Model | Verdict | Response Time |\n");
    out.push_str("|-------|---------|---------------|\n");
    for vote in report.votes() {
        out.push_str(&format!(
            "| {} | {} | {} |\n",
            vote.model,
            vote.verdict.label(),
            format_duration_ms(vote.response_time_ms)
        ));
    }

    out.push_str("\n### Discussion\n");
    for vote in report.votes() {
        out.push_str(&format!("\n#### {} ({})\n\n", vote.model, vote.verdict.label()));

        if let Some(error) = &vote.error {
            out.push_str(&format!("_Not counted: {}_\n", error));
            continue;
        }

        if vote.feedback.is_empty() {
            out.push_str("_No feedback._\n");
        } else {
            out.push_str(&vote.feedback);
            out.push('\n');
        }
        render_list(&mut out, "Concerns", &vote.concerns);
        render_list(&mut out, "Suggestions", &vote.suggestions);
    }

    out.push_str(&format!(
        "\n---\n\n**Consensus: {}** {}: {}\n",
        report.verdict().label(),
        report.vote_summary(),
        report.rationale()
    ));
    out
}

fn render_list(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("\n**{}:**\n", title));
    for item in items {
        out.push_str(&format!("- {}\n", item));
    }
}

#[cfg(test)]
mod tests {
    use crate::quorum::{ApprovalThreshold, ConsensusMode, ConsensusReport, ModelVerdict, Verdict};

    fn sample(mode: ConsensusMode, votes: Vec<ModelVerdict>) -> String {
        ConsensusReport::new(mode, "q", votes, ApprovalThreshold::Majority)
            .summary()
            .to_string()
    }

    #[test]
    fn test_table_header_and_rows() {
        let mut claude = ModelVerdict::new("claude", Verdict::Approve).with_response_time(12_300);
        claude.feedback = "Looks good.".to_string();
        let md = sample(
            ConsensusMode::Review,
            vec![
                claude,
                ModelVerdict::new("codex", Verdict::Reject).with_response_time(800),
            ],
        );

        assert!(md.starts_with("## Review Consensus: APPROVED"));
        assert!(md.contains("| Model | Verdict | Response Time |"));
        assert!(md.contains("| claude | APPROVE | 12.3s |"));
        assert!(md.contains("| codex | REJECT | 0.8s |"));
        assert!(md.contains("Looks good."));
        assert!(md.contains("**Consensus: APPROVED** [●○]"));
    }

    #[test]
    fn test_plan_vocabulary() {
        let md = sample(
            ConsensusMode::Plan,
            vec![
                ModelVerdict::new("claude", Verdict::SuggestChanges),
                ModelVerdict::new("gemini", Verdict::Approve),
            ],
        );
        assert!(md.contains("| claude | SUGGEST_CHANGES |"));
        assert!(md.starts_with("## Plan Consensus: APPROVED"));
    }

    #[test]
    fn test_errored_vote_is_listed_but_marked() {
        let md = sample(
            ConsensusMode::Review,
            vec![
                ModelVerdict::new("claude", Verdict::Approve),
                ModelVerdict::failed("codex", Verdict::Abstain, "timed out after 300s", 300_000),
            ],
        );
        assert!(md.contains("| codex | ABSTAIN | 300.0s |"));
        assert!(md.contains("_Not counted: timed out after 300s_"));
        assert!(md.contains("**Consensus: INCONCLUSIVE**"));
    }

    #[test]
    fn test_concerns_and_suggestions_sections() {
        let mut vote = ModelVerdict::new("claude", Verdict::Reject);
        vote.feedback = "Needs work.".to_string();
        vote.concerns = vec!["No tests".to_string()];
        vote.suggestions = vec!["Add tests".to_string()];
        let md = sample(ConsensusMode::Review, vec![vote]);
        assert!(md.contains("**Concerns:**\n- No tests"));
        assert!(md.contains("**Suggestions:**\n- Add tests"));
    }
}
