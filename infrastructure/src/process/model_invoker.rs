//! Model invocation through each vendor's CLI.

use super::{spawn_with_prompt, stderr_excerpt};
use async_trait::async_trait;
use autopilot_application::{InvokeError, ModelInvoker};
use autopilot_domain::{Model, ModelFamily};
use std::collections::BTreeMap;
use tracing::debug;

/// Runs one CLI process per model invocation, prompt on stdin.
///
/// | Family | Command |
/// |--------|---------|
/// | `claude*` | `claude -p` |
/// | `codex*`, `gpt*` | `codex exec` |
/// | `gemini*` | `gemini -p` |
///
/// A custom identifier in a known family also gets `--model <id>`. Any model
/// can be pointed at a different command through `consensus.commands`.
///
/// The engine's per-model timeout drops the invocation future, and with it
/// the child, which is killed on drop.
#[derive(Debug, Clone, Default)]
pub struct CliModelInvoker {
    overrides: BTreeMap<String, Vec<String>>,
}

impl CliModelInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overrides(overrides: BTreeMap<String, Vec<String>>) -> Self {
        let overrides = overrides
            .into_iter()
            .filter(|(_, cmd)| cmd.first().is_some_and(|p| !p.trim().is_empty()))
            .collect();
        Self { overrides }
    }

    /// Program and arguments used for `model`
    pub fn command_for(&self, model: &Model) -> Option<(String, Vec<String>)> {
        if let Some(cmd) = self.overrides.get(model.as_str())
            && let Some((program, args)) = cmd.split_first()
        {
            return Some((program.clone(), args.to_vec()));
        }

        let (program, mut args) = match model.family() {
            ModelFamily::Claude => ("claude", vec!["-p".to_string()]),
            ModelFamily::Codex => ("codex", vec!["exec".to_string()]),
            ModelFamily::Gemini => ("gemini", vec!["-p".to_string()]),
            ModelFamily::Unknown => return None,
        };
        if let Model::Custom(id) = model {
            args.push("--model".to_string());
            args.push(id.clone());
        }
        Some((program.to_string(), args))
    }
}

#[async_trait]
impl ModelInvoker for CliModelInvoker {
    async fn invoke(&self, model: &Model, prompt: &str) -> Result<String, InvokeError> {
        let (program, args) = self.command_for(model).ok_or_else(|| InvokeError::Spawn {
            model: model.to_string(),
            reason: "no command known for this model; set consensus.commands".to_string(),
        })?;

        let child = spawn_with_prompt(&program, &args, None, prompt)
            .await
            .map_err(|e| InvokeError::Spawn {
                model: model.to_string(),
                reason: format!("{}: {}", program, e),
            })?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| InvokeError::Io(e.to_string()))?;

        if !output.status.success() {
            return Err(InvokeError::NonZeroExit {
                model: model.to_string(),
                code: output.status.code().unwrap_or(-1),
                stderr: stderr_excerpt(&output.stderr),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            return Err(InvokeError::EmptyOutput {
                model: model.to_string(),
            });
        }
        debug!("{} responded with {} bytes", model, text.len());
        Ok(text)
    }

    fn is_available(&self, model: &Model) -> bool {
        self.command_for(model)
            .is_some_and(|(program, _)| which::which(program).is_ok())
    }
}
