//! Prompt templates for consensus gates and agent sessions

use crate::core::text::truncate;
use crate::quorum::ConsensusReport;
use crate::task::{Session, Task};

/// Agent output beyond this is cut before it goes into a review prompt
const MAX_REVIEWED_OUTPUT: usize = 12_000;

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// Question posed to the plan gate
    pub fn plan_question(task: &Task) -> String {
        let mut q = format!("Task {}: {}", task.issue_id, task.title);
        if !task.description.trim().is_empty() {
            q.push_str("\n\n");
            q.push_str(task.description.trim());
        }
        if !task.tags.is_empty() {
            let tags: Vec<&str> = task.tags.iter().map(String::as_str).collect();
            q.push_str(&format!("\n\nLabels: {}", tags.join(", ")));
        }
        q
    }

    /// Question posed to the review gate
    pub fn review_question(task: &Task, session: &Session) -> String {
        let mut q = Self::plan_question(task);
        q.push_str(&format!(
            "\n\n--- Agent session (attempt {}, {} tool calls) ---\n",
            session.attempt, session.tool_call_count
        ));
        let tools = session.tools_used();
        if !tools.is_empty() {
            q.push_str(&format!("Tools used: {}\n", tools.join(", ")));
        }
        q.push('\n');
        q.push_str(&truncate(
            session.final_output().unwrap_or("(no final output)"),
            MAX_REVIEWED_OUTPUT,
        ));
        q
    }

    /// Full prompt sent to each model in the plan gate
    pub fn plan_prompt(question: &str) -> String {
        format!(
            r#"You are one of several independent reviewers deciding whether an autonomous coding agent should start work on the following task.

{}

Judge whether the task is clear, safe, and small enough to complete in one session.
List any problems under a "Concerns:" heading and improvements under a "Suggestions:" heading.

End your answer with exactly one line:
VERDICT: APPROVE | SUGGEST_CHANGES | REJECT"#,
            question
        )
    }

    /// Full prompt sent to each model in the review gate
    pub fn review_prompt(question: &str) -> String {
        format!(
            r#"You are one of several independent reviewers checking the work an autonomous coding agent just finished.

{}

Judge whether the work accomplishes the task without introducing regressions.
List any problems under a "Concerns:" heading and improvements under a "Suggestions:" heading.

End your answer with exactly one line:
VERDICT: APPROVE | REJECT | ABSTAIN"#,
            question
        )
    }

    /// Prompt for the agent session, carrying plan-gate feedback if any
    pub fn agent_prompt(task: &Task, plan: Option<&ConsensusReport>) -> String {
        let mut prompt = format!(
            "Complete the following task in this repository.\n\n{}",
            Self::plan_question(task)
        );

        if let Some(report) = plan {
            let concerns = report.all_concerns();
            let suggestions = report.all_suggestions();
            if !concerns.is_empty() || !suggestions.is_empty() {
                prompt.push_str("\n\nReviewers raised the following before you started:\n");
                for item in concerns.iter().chain(suggestions.iter()) {
                    prompt.push_str(&format!("- {}\n", item));
                }
            }
        }

        if task.attempt > 1 {
            prompt.push_str(&format!(
                "\n\nThis is attempt {} of {}. A previous attempt did not pass review.",
                task.attempt, task.max_attempts
            ));
        }
        prompt
    }
}
