use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use thiserror::Error;
use tokio::process::Command as TokioCommand;
use tracing::debug;

/// Command executor errors
#[derive(Debug, Error)]
pub enum CommandExecutorError {
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Process spawn failed for '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Waiting for '{command}' failed: {source}")]
    WaitFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration for command execution
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    /// Working directory for command execution
    pub working_directory: Option<PathBuf>,

    /// Environment variables to set for the process
    pub environment_variables: HashMap<String, String>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            working_directory: None,
            environment_variables: HashMap::new(),
        }
    }
}

impl ExecutionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set working directory
    pub fn with_working_directory<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.working_directory = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Add environment variable
    pub fn with_environment_variable(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.environment_variables.insert(key.into(), value.into());
        self
    }
}

/// Result of command execution
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Exit code, `None` when the process was killed by a signal
    pub exit_code: Option<i32>,

    /// Standard output
    pub stdout: String,

    /// Standard error output
    pub stderr: String,

    /// Execution time in milliseconds
    pub execution_time_ms: u64,

    /// Whether the command exited with status 0
    pub success: bool,
}

impl ExecutionResult {
    /// stderr followed by stdout, trimmed; what a user would have seen
    pub fn combined_output(&self) -> String {
        let stderr = self.stderr.trim();
        let stdout = self.stdout.trim();
        match (stderr.is_empty(), stdout.is_empty()) {
            (true, true) => String::new(),
            (false, true) => stderr.to_string(),
            (true, false) => stdout.to_string(),
            (false, false) => format!("{stderr}\n{stdout}"),
        }
    }
}

/// Command executor for running external processes.
///
/// Each call blocks the current task until the child exits. There is no
/// timeout: a hung network operation is left to the caller to kill.
pub struct CommandExecutor;

impl CommandExecutor {
    /// Run `program` with `args` and capture its output
    pub async fn execute<I, S>(
        program: &str,
        args: I,
        config: &ExecutionConfig,
    ) -> Result<ExecutionResult, CommandExecutorError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        if program.trim().is_empty() {
            return Err(CommandExecutorError::InvalidCommand(
                "Program is empty".to_string(),
            ));
        }

        let args: Vec<S> = args.into_iter().collect();
        let command_line = Self::command_line(program, &args);
        let start_time = Instant::now();

        let mut cmd = TokioCommand::new(program);
        cmd.args(&args);

        if let Some(working_dir) = &config.working_directory {
            cmd.current_dir(working_dir);
        }

        for (key, value) in &config.environment_variables {
            cmd.env(key, value);
        }

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        debug!(command = %command_line, cwd = ?config.working_directory, "running command");

        let child = cmd
            .spawn()
            .map_err(|source| CommandExecutorError::SpawnFailed {
                command: command_line.clone(),
                source,
            })?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|source| CommandExecutorError::WaitFailed {
                command: command_line.clone(),
                source,
            })?;

        let result = ExecutionResult {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            execution_time_ms: start_time.elapsed().as_millis() as u64,
            success: output.status.success(),
        };

        debug!(
            command = %command_line,
            exit_code = ?result.exit_code,
            elapsed_ms = result.execution_time_ms,
            "command finished"
        );

        Ok(result)
    }

    /// Human-readable command line for diagnostics
    pub fn command_line<S: AsRef<OsStr>>(program: &str, args: &[S]) -> String {
        let mut line = program.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(&arg.as_ref().to_string_lossy());
        }
        line
    }
}
