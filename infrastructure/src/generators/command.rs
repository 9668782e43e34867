//! Command-backed argument generator.
//!
//! Runs an external program per call: the [`GenerationRequest`] is written
//! to its stdin as JSON and whatever it prints on stdout is the generated
//! text. Failures are classified for the reliability layer:
//!
//! | Outcome                               | Error                | Kind      |
//! |---------------------------------------|----------------------|-----------|
//! | exit 75 (`EX_TEMPFAIL`)               | `RateLimited`        | transient |
//! | call timeout                          | `Timeout`            | transient |
//! | spawn/pipe I/O error (except missing) | `Connection`         | transient |
//! | program not found                     | `InvalidRequest`     | permanent |
//! | any other non-zero exit or signal     | `InvalidOutput`      | permanent |
//! | success with blank stdout             | `InvalidOutput`      | permanent |

use async_trait::async_trait;
use debate_application::ports::argument_generator::{
    ArgumentGenerator, GenerationRequest, GeneratorError,
};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::config::{DEFAULT_GENERATOR_TIMEOUT_SECS, FileGeneratorConfig};

/// Exit status a program uses to ask for a retry (sysexits.h)
pub const EX_TEMPFAIL: i32 = 75;

/// Longest stderr excerpt carried into error messages
const MAX_STDERR_CHARS: usize = 400;

/// Argument generator backed by an external command
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    dependency: String,
    program: String,
    args: Vec<String>,
    timeout: Duration,
    working_dir: Option<PathBuf>,
}

impl CommandGenerator {
    pub fn new(program: impl Into<String>) -> Self {
        let program = program.into();
        Self {
            dependency: program.clone(),
            program,
            args: Vec::new(),
            timeout: Duration::from_secs(DEFAULT_GENERATOR_TIMEOUT_SECS),
            working_dir: None,
        }
    }

    pub fn from_config(config: &FileGeneratorConfig) -> Self {
        let mut generator = Self::new(config.command.clone())
            .with_args(config.args.clone())
            .with_timeout(Duration::from_secs(config.timeout_seconds))
            .with_dependency(config.dependency_name());
        if let Some(dir) = &config.working_dir {
            generator = generator.with_working_dir(dir);
        }
        generator
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Circuit breaker name (defaults to the program)
    pub fn with_dependency(mut self, dependency: impl Into<String>) -> Self {
        self.dependency = dependency.into();
        self
    }

    pub fn with_working_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Resolve the program on `PATH`, so a misconfigured command can be
    /// reported before a debate starts.
    pub fn locate(&self) -> Result<PathBuf, GeneratorError> {
        which::which(&self.program).map_err(|e| {
            GeneratorError::InvalidRequest(format!("{}: {}", self.program, e))
        })
    }

    async fn run(&self, input: Vec<u8>) -> Result<Output, GeneratorError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|e| self.spawn_error(e))?;
        let stdin = child.stdin.take();

        let write_request = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(&input).await?;
                stdin.shutdown().await?;
            }
            Ok::<(), io::Error>(())
        };

        let (written, output) = tokio::join!(write_request, child.wait_with_output());

        // A program may legitimately exit without reading its input.
        if let Err(e) = written
            && e.kind() != io::ErrorKind::BrokenPipe
        {
            return Err(GeneratorError::Connection(format!(
                "writing request to {}: {}",
                self.program, e
            )));
        }

        output.map_err(|e| {
            GeneratorError::Connection(format!("waiting for {}: {}", self.program, e))
        })
    }

    fn spawn_error(&self, e: io::Error) -> GeneratorError {
        if e.kind() == io::ErrorKind::NotFound {
            GeneratorError::InvalidRequest(format!("command not found: {}", self.program))
        } else {
            GeneratorError::Connection(format!("failed to start {}: {}", self.program, e))
        }
    }

    fn classify(&self, output: Output) -> Result<String, GeneratorError> {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr: String = stderr.trim().chars().take(MAX_STDERR_CHARS).collect();

        match output.status.code() {
            Some(0) => {
                let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if text.is_empty() {
                    Err(GeneratorError::InvalidOutput(format!(
                        "{} produced no output",
                        self.program
                    )))
                } else {
                    Ok(text)
                }
            }
            Some(EX_TEMPFAIL) => Err(GeneratorError::RateLimited(format!(
                "{} asked for a retry: {}",
                self.program, stderr
            ))),
            Some(code) => Err(GeneratorError::InvalidOutput(format!(
                "{} exited with code {}: {}",
                self.program, code, stderr
            ))),
            None => Err(GeneratorError::InvalidOutput(format!(
                "{} was terminated by a signal: {}",
                self.program, stderr
            ))),
        }
    }
}

#[async_trait]
impl ArgumentGenerator for CommandGenerator {
    fn dependency(&self) -> &str {
        &self.dependency
    }

    async fn invoke(&self, request: &GenerationRequest) -> Result<String, GeneratorError> {
        let input = serde_json::to_vec(request)
            .map_err(|e| GeneratorError::InvalidRequest(format!("encoding request: {}", e)))?;

        debug!(
            "Running {} for {} (round {}, {} bytes of input)",
            self.program,
            request.role,
            request.round,
            input.len()
        );

        match tokio::time::timeout(self.timeout, self.run(input)).await {
            Ok(output) => self.classify(output?),
            Err(_) => Err(GeneratorError::Timeout(self.timeout)),
        }
    }
}
