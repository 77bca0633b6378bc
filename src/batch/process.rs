use async_trait::async_trait;
use std::collections::VecDeque;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::{Result, MangaBatchError};
use super::{CommandRunner, ToolCommand};

// Keep error details readable when the tool dumps a long traceback.
const STDERR_TAIL_LINES: usize = 20;

/// Spawns the external tool as a child process and waits for it
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

fn build_command(command: &ToolCommand) -> Command {
    let mut cmd = Command::new(&command.program);
    cmd.args(&command.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    // Own process group: a terminal Ctrl-C reaches only us, and the batch
    // stops between files instead of killing the tool mid-page.
    #[cfg(unix)]
    cmd.process_group(0);

    cmd
}

/// Log every line of `reader` as it arrives and return the last `keep` non-empty lines
async fn forward_lines<R: AsyncRead + Unpin>(reader: R, stream: &'static str, keep: usize) -> VecDeque<String> {
    let mut reader = BufReader::new(reader);
    let mut tail = VecDeque::with_capacity(keep);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf).trim_end().to_string();
                if line.is_empty() {
                    continue;
                }
                info!("[tool {}] {}", stream, line);
                if keep > 0 {
                    if tail.len() == keep {
                        tail.pop_front();
                    }
                    tail.push_back(line);
                }
            }
            Err(e) => {
                warn!("Failed to read tool {}: {}", stream, e);
                break;
            }
        }
    }

    tail
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &ToolCommand) -> Result<()> {
        debug!("Executing: {}", command);

        let mut child = build_command(command)
            .spawn()
            .map_err(|e| MangaBatchError::Process(format!("Failed to start {}: {}", command.program, e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| MangaBatchError::Process("Tool stdout was not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MangaBatchError::Process("Tool stderr was not captured".to_string()))?;

        let (status, _, stderr_tail) = tokio::join!(
            child.wait(),
            forward_lines(stdout, "stdout", 0),
            forward_lines(stderr, "stderr", STDERR_TAIL_LINES),
        );

        let status = status
            .map_err(|e| MangaBatchError::Process(format!("Failed to wait for {}: {}", command.program, e)))?;

        if !status.success() {
            return Err(MangaBatchError::Process(format!(
                "{} exited with {}: {}",
                command.description,
                status,
                Vec::from(stderr_tail).join("\n")
            )));
        }

        Ok(())
    }
}
