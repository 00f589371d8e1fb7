use std::process::Command;

use crate::error::{GridError, Result};

/// Runs one external toolchain command and hands back its non-empty stdout
/// lines. A non-zero exit becomes `GridError::ToolInvocation`.
pub trait ToolRunner: Send + Sync {
    fn invoke(&self, argv: &[String]) -> Result<Vec<String>>;
}

/// Runs the gfal command-line tools as child processes.
#[derive(Debug, Default, Clone)]
pub struct GfalRunner;

impl ToolRunner for GfalRunner {
    fn invoke(&self, argv: &[String]) -> Result<Vec<String>> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| GridError::usage("empty command line"))?;
        let command_line = argv.join(" ");
        tracing::debug!("Running: {}", command_line);

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| GridError::Spawn {
                command: command_line.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let code = output.status.code().unwrap_or(-1);
            tracing::error!("{} exited with {}: {}", command_line, code, stderr);
            return Err(GridError::ToolInvocation {
                command: command_line,
                code,
                stderr,
            });
        }

        Ok(split_lines(&output.stdout))
    }
}

fn split_lines(stdout: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(stdout)
        .split('\n')
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
