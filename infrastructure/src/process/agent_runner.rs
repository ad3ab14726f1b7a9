//! Agent session driven through an agent CLI speaking stream-JSON.

use super::{spawn_with_prompt, stderr_excerpt};
use async_trait::async_trait;
use autopilot_application::{AgentError, AgentRunner};
use autopilot_domain::{Session, Task, TranscriptEntry};
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tracing::{debug, info, warn};

/// How the agent CLI is launched
#[derive(Debug, Clone, PartialEq)]
pub struct AgentCommand {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Duration,
    pub working_dir: Option<PathBuf>,
}

pub struct CommandAgentRunner {
    command: AgentCommand,
}

impl CommandAgentRunner {
    pub fn new(command: AgentCommand) -> Self {
        Self { command }
    }
}

/// Turn one stdout line into transcript entries.
///
/// Recognized events:
///
/// ```text
/// {"type":"assistant","message":{"content":[{"type":"text","text":"..."},
///                                           {"type":"tool_use","name":"Bash","input":{...}}]}}
/// {"type":"user","message":{"content":[{"type":"tool_result","content":"..."}]}}
/// ```
///
/// Other JSON events (`system`, `result`) carry no transcript content. A line
/// that is not JSON is kept as assistant text.
pub fn parse_stream_line(line: &str) -> Vec<TranscriptEntry> {
    let line = line.trim();
    if line.is_empty() {
        return Vec::new();
    }
    let Ok(event) = serde_json::from_str::<Value>(line) else {
        return vec![TranscriptEntry::assistant(line)];
    };

    let Some(blocks) = event
        .pointer("/message/content")
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    blocks
        .iter()
        .filter_map(|block| match block.get("type").and_then(Value::as_str) {
            Some("text") => block
                .get("text")
                .and_then(Value::as_str)
                .map(TranscriptEntry::assistant),
            Some("tool_use") => {
                let name = block
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown");
                let input = block
                    .get("input")
                    .map(Value::to_string)
                    .unwrap_or_default();
                Some(TranscriptEntry::tool_use(name, input))
            }
            Some("tool_result") => Some(TranscriptEntry::tool_result(tool_result_text(
                block.get("content"),
            ))),
            _ => None,
        })
        .collect()
}

/// Tool results arrive as a string or as a list of text blocks
fn tool_result_text(content: Option<&Value>) -> String {
    match content {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(parts)) => parts
            .iter()
            .filter_map(|p| p.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n"),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

#[async_trait]
impl AgentRunner for CommandAgentRunner {
    async fn run(&self, task: &Task, prompt: &str) -> Result<Session, AgentError> {
        let mut session = Session::start(task.id.clone(), task.attempt);

        let mut child = spawn_with_prompt(
            &self.command.program,
            &self.command.args,
            self.command.working_dir.as_deref(),
            prompt,
        )
        .await
        .map_err(|e| AgentError::Spawn(format!("{}: {}", self.command.program, e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AgentError::Io("agent stdout not captured".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| AgentError::Io("agent stderr not captured".to_string()))?;

        // drain stderr concurrently so a chatty agent cannot fill the pipe
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
            buf
        });

        let mut entries = Vec::new();
        let drive = async {
            let mut lines = BufReader::new(stdout).lines();
            while let Some(line) = lines.next_line().await? {
                entries.extend(parse_stream_line(&line));
            }
            Ok::<_, std::io::Error>(child.wait().await?)
        };

        let outcome = tokio::time::timeout(self.command.timeout, drive).await;
        let status = match outcome {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => return Err(AgentError::Io(e.to_string())),
            Err(_) => {
                warn!(
                    "Agent for task {} timed out after {:?}",
                    task.id, self.command.timeout
                );
                let _ = child.start_kill();
                for entry in entries {
                    session.push(entry);
                }
                return Ok(session.fail(format!(
                    "agent timed out after {}s",
                    self.command.timeout.as_secs()
                )));
            }
        };

        for entry in entries {
            session.push(entry);
        }
        let stderr = stderr_task.await.unwrap_or_default();

        if status.success() {
            info!(
                "Agent session for task {} finished ({} tool calls)",
                task.id, session.tool_call_count
            );
            Ok(session.complete())
        } else {
            let code = status.code().unwrap_or(-1);
            debug!("Agent stderr for task {}: {}", task.id, stderr_excerpt(&stderr));
            Ok(session.fail(format!(
                "agent exited with status {}: {}",
                code,
                stderr_excerpt(&stderr)
            )))
        }
    }
}
