//! Child-process adapters
//!
//! Model CLIs and the agent CLI are external processes. Both adapters spawn
//! through [`spawn_with_prompt`], which pipes the prompt on stdin and ties the
//! child's lifetime to ours.

mod agent_runner;
mod model_invoker;

pub use agent_runner::{AgentCommand, CommandAgentRunner};
pub use model_invoker::CliModelInvoker;

use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tracing::debug;

/// Longest stderr excerpt carried into error messages
const STDERR_EXCERPT: usize = 2_000;

/// Spawn `program args...`, write `prompt` to its stdin and close it.
///
/// The child is killed when its handle is dropped, which is how a timeout in
/// the caller terminates it.
pub(crate) async fn spawn_with_prompt(
    program: &str,
    args: &[String],
    working_dir: Option<&Path>,
    prompt: &str,
) -> std::io::Result<Child> {
    debug!("Spawning {} {:?}", program, args);

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    if let Some(dir) = working_dir {
        cmd.current_dir(dir);
    }

    // Linux: request kernel to send SIGTERM to child when parent dies.
    // This catches cases where Drop doesn't run (SIGKILL, OOM kill).
    #[cfg(target_os = "linux")]
    unsafe {
        cmd.pre_exec(|| {
            libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
            Ok(())
        });
    }

    let mut child = cmd.spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        // a child that exits without reading its input is not an error here
        if let Err(e) = stdin.write_all(prompt.as_bytes()).await
            && e.kind() != std::io::ErrorKind::BrokenPipe
        {
            return Err(e);
        }
        drop(stdin);
    }

    Ok(child)
}

/// Tail of a stderr buffer, trimmed for error messages
pub(crate) fn stderr_excerpt(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    if text.chars().count() <= STDERR_EXCERPT {
        return text.to_string();
    }
    let skip = text.chars().count() - STDERR_EXCERPT;
    format!("...{}", text.chars().skip(skip).collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stderr_excerpt_keeps_tail() {
        let long = format!("{}END", "x".repeat(5_000));
        let excerpt = stderr_excerpt(long.as_bytes());
        assert!(excerpt.starts_with("..."));
        assert!(excerpt.ends_with("END"));
        assert_eq!(excerpt.chars().count(), STDERR_EXCERPT + 3);
    }

    #[test]
    fn test_stderr_excerpt_short_is_trimmed() {
        assert_eq!(stderr_excerpt(b"  oops\n"), "oops");
    }

    #[tokio::test]
    async fn test_prompt_reaches_stdin() {
        let child = spawn_with_prompt("cat", &[], None, "hello there")
            .await
            .unwrap();
        let output = child.wait_with_output().await.unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout), "hello there");
    }
}
