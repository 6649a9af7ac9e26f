use crate::error::{KeygenError, Result};
use async_trait::async_trait;
use std::io;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::Command;
use tracing::{debug, instrument, warn};

/// A single run of an external program.
#[derive(Clone)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub envs: Vec<(String, String)>,
    pub timeout: Duration,
    /// Mirror the program's output to our own stdout/stderr while it runs.
    pub echo: bool,
}

impl Invocation {
    pub fn new<S: Into<String>>(program: S, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
            timeout,
            echo: false,
        }
    }

    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn env<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Value following `flag` in the argument list, if any.
    pub fn arg_after(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|arg| arg == flag)
            .and_then(|index| self.args.get(index + 1))
            .map(String::as_str)
    }
}

// Arguments and environment may carry the passphrase.
impl std::fmt::Debug for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invocation")
            .field("program", &self.program)
            .field("args", &self.args.len())
            .field("envs", &self.envs.len())
            .field("timeout", &self.timeout)
            .field("echo", &self.echo)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn status_text(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        }
    }

    /// Captured stdout followed by stderr, lossily decoded.
    pub fn combined(&self) -> String {
        let mut text = String::from_utf8_lossy(&self.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&self.stderr);
        if !text.is_empty() && !stderr.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&stderr);
        text.trim_end().to_string()
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs the program to completion. A non-zero exit is returned as a
    /// normal [`CommandOutput`]; only spawn failures and timeouts are errors.
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput>;
}

/// Runs programs as tokio child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioCommandRunner;

/// Reads `reader` to the end, copying each chunk to `echo` when given.
/// Echo failures are logged and do not stop collection.
async fn drain<R, W>(mut reader: R, mut echo: Option<W>) -> io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut collected = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        if let Some(writer) = echo.as_mut() {
            if let Err(e) = write_chunk(writer, &buf[..n]).await {
                warn!("Failed to echo tool output: {}", e);
                echo = None;
            }
        }
        collected.extend_from_slice(&buf[..n]);
    }
    Ok(collected)
}

async fn write_chunk<W: AsyncWrite + Unpin>(writer: &mut W, chunk: &[u8]) -> io::Result<()> {
    writer.write_all(chunk).await?;
    writer.flush().await
}

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    #[instrument(skip(self, invocation), fields(program = %invocation.program))]
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .envs(invocation.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|source| KeygenError::Spawn {
            program: invocation.program.clone(),
            source,
        })?;
        debug!("Spawned {} (pid {:?})", invocation.program, child.id());

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("child stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("child stderr was not captured"))?;

        let stdout_task = tokio::spawn(drain(stdout, invocation.echo.then(tokio::io::stdout)));
        let stderr_task = tokio::spawn(drain(stderr, invocation.echo.then(tokio::io::stderr)));

        let waited = tokio::time::timeout(invocation.timeout, child.wait()).await;
        let status = match waited {
            Ok(status) => status?,
            Err(_) => {
                warn!(
                    "{} exceeded {}s, killing it",
                    invocation.program,
                    invocation.timeout.as_secs()
                );
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill {}: {}", invocation.program, e);
                }
                stdout_task.abort();
                stderr_task.abort();
                return Err(KeygenError::Timeout {
                    program: invocation.program.clone(),
                    timeout: invocation.timeout,
                });
            }
        };

        let stdout = stdout_task.await.map_err(io::Error::other)??;
        let stderr = stderr_task.await.map_err(io::Error::other)??;

        debug!("{} exited with {:?}", invocation.program, status.code());
        Ok(CommandOutput {
            code: status.code(),
            stdout,
            stderr,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(script: &str) -> Invocation {
        Invocation::new("sh", Duration::from_secs(10))
            .arg("-c")
            .arg(script)
    }

    #[tokio::test]
    async fn collects_stdout_and_stderr() {
        let output = TokioCommandRunner
            .run(&shell("printf out; printf err >&2"))
            .await
            .unwrap();

        assert!(output.success());
        assert_eq!(output.stdout, b"out");
        assert_eq!(output.stderr, b"err");
        assert_eq!(output.combined(), "out\nerr");
    }

    #[tokio::test]
    async fn echoed_output_is_still_collected() {
        let invocation = shell("printf 'writing RSA key'; printf 'e is 65537' >&2").echo(true);
        let output = TokioCommandRunner.run(&invocation).await.unwrap();

        assert!(output.success());
        assert_eq!(output.stdout, b"writing RSA key");
        assert_eq!(output.stderr, b"e is 65537");
    }

    #[tokio::test]
    async fn drain_copies_every_chunk_to_echo() {
        let input = vec![b'k'; 4000];
        let mut echoed = Vec::new();

        let collected = drain(input.as_slice(), Some(&mut echoed)).await.unwrap();

        assert_eq!(collected, input);
        assert_eq!(echoed, input);
    }

    #[tokio::test]
    async fn drain_without_echo_only_collects() {
        let collected = drain(&b"quiet"[..], None::<Vec<u8>>).await.unwrap();
        assert_eq!(collected, b"quiet");
    }

    #[tokio::test]
    async fn non_zero_exit_is_reported_not_raised() {
        let output = TokioCommandRunner
            .run(&shell("echo 'unable to write key' >&2; exit 3"))
            .await
            .unwrap();

        assert!(!output.success());
        assert_eq!(output.code, Some(3));
        assert_eq!(output.status_text(), "exit code 3");
        assert!(output.combined().contains("unable to write key"));
    }

    #[tokio::test]
    async fn passes_environment_to_child() {
        let invocation = shell("printf \"$KEYGEN_TEST_VALUE\"").env("KEYGEN_TEST_VALUE", "secret");
        let output = TokioCommandRunner.run(&invocation).await.unwrap();

        assert_eq!(output.stdout, b"secret");
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let invocation = Invocation::new("definitely-not-a-real-binary-7c1e", Duration::from_secs(1));
        let err = TokioCommandRunner.run(&invocation).await.unwrap_err();

        assert!(matches!(err, KeygenError::Spawn { .. }));
        assert!(err.is_tool_failure());
    }

    #[tokio::test]
    async fn slow_program_times_out() {
        let invocation = Invocation::new("sleep", Duration::from_millis(200)).arg("5");
        let err = TokioCommandRunner.run(&invocation).await.unwrap_err();

        match err {
            KeygenError::Timeout { program, timeout } => {
                assert_eq!(program, "sleep");
                assert_eq!(timeout, Duration::from_millis(200));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[test]
    fn debug_output_hides_arguments() {
        let invocation = Invocation::new("openssl", Duration::from_secs(1)).arg("pass:hunter2");
        let rendered = format!("{:?}", invocation);

        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn arg_after_finds_flag_value() {
        let invocation = Invocation::new("openssl", Duration::from_secs(1))
            .arg("-out")
            .arg("/tmp/key.pem");

        assert_eq!(invocation.arg_after("-out"), Some("/tmp/key.pem"));
        assert_eq!(invocation.arg_after("-in"), None);
    }
}
