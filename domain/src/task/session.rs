//! Session: the record of one execution attempt of a task.
//!
//! A retry never mutates a previous session; it starts a fresh one.

use super::entities::TaskId;
use serde::{Deserialize, Serialize};

/// Status of a single attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Running,
    Completed,
    Failed,
}

/// Role of a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptRole {
    /// Text produced by the agent
    Assistant,
    /// A tool invocation requested by the agent
    ToolUse,
    /// Output returned by a tool
    ToolResult,
}

/// One role-tagged transcript entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: TranscriptRole,
    pub content: String,
    /// Tool name for `ToolUse` entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
}

impl TranscriptEntry {
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TranscriptRole::Assistant,
            content: content.into(),
            tool: None,
        }
    }

    pub fn tool_use(tool: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            role: TranscriptRole::ToolUse,
            content: input.into(),
            tool: Some(tool.into()),
        }
    }

    pub fn tool_result(content: impl Into<String>) -> Self {
        Self {
            role: TranscriptRole::ToolResult,
            content: content.into(),
            tool: None,
        }
    }
}

/// Record of one execution attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub task_id: TaskId,
    /// 1-based attempt number this session belongs to
    pub attempt: u32,
    pub status: SessionStatus,
    pub transcript: Vec<TranscriptEntry>,
    pub tool_call_count: usize,
    pub error: Option<String>,
}

impl Session {
    pub fn start(task_id: TaskId, attempt: u32) -> Self {
        Self {
            task_id,
            attempt,
            status: SessionStatus::Running,
            transcript: Vec::new(),
            tool_call_count: 0,
            error: None,
        }
    }

    pub fn push(&mut self, entry: TranscriptEntry) {
        if entry.role == TranscriptRole::ToolUse {
            self.tool_call_count += 1;
        }
        self.transcript.push(entry);
    }

    pub fn complete(mut self) -> Self {
        self.status = SessionStatus::Completed;
        self
    }

    pub fn fail(mut self, error: impl Into<String>) -> Self {
        self.status = SessionStatus::Failed;
        self.error = Some(error.into());
        self
    }

    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }

    /// The last assistant message, typically the agent's own summary
    pub fn final_output(&self) -> Option<&str> {
        self.transcript
            .iter()
            .rev()
            .find(|e| e.role == TranscriptRole::Assistant && !e.content.trim().is_empty())
            .map(|e| e.content.as_str())
    }

    /// Names of the tools invoked, in order, with duplicates removed
    pub fn tools_used(&self) -> Vec<&str> {
        let mut tools: Vec<&str> = Vec::new();
        for name in self.transcript.iter().filter_map(|e| e.tool.as_deref()) {
            if !tools.contains(&name) {
                tools.push(name);
            }
        }
        tools
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_calls_are_counted() {
        let mut session = Session::start(TaskId::new("t1"), 1);
        session.push(TranscriptEntry::assistant("Looking at the code"));
        session.push(TranscriptEntry::tool_use("Bash", "cargo test"));
        session.push(TranscriptEntry::tool_result("ok"));
        session.push(TranscriptEntry::tool_use("Edit", "src/lib.rs"));
        session.push(TranscriptEntry::tool_use("Bash", "cargo fmt"));

        assert_eq!(session.tool_call_count, 3);
        assert_eq!(session.tools_used(), vec!["Bash", "Edit"]);
    }

    #[test]
    fn test_final_output_skips_blank_entries() {
        let mut session = Session::start(TaskId::new("t1"), 1);
        session.push(TranscriptEntry::assistant("first"));
        session.push(TranscriptEntry::assistant("Done: added tests"));
        session.push(TranscriptEntry::assistant("  "));
        assert_eq!(session.final_output(), Some("Done: added tests"));
    }

    #[test]
    fn test_terminal_transitions() {
        let session = Session::start(TaskId::new("t1"), 2);
        assert!(session.is_running());

        let failed = session.clone().fail("exit code 1");
        assert_eq!(failed.status, SessionStatus::Failed);
        assert_eq!(failed.error.as_deref(), Some("exit code 1"));

        let done = session.complete();
        assert_eq!(done.status, SessionStatus::Completed);
        assert_eq!(done.attempt, 2);
    }
}
