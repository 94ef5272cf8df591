use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// External tool invocation: program, arguments and a short label for logs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
    pub description: String,
}

impl ToolCommand {
    pub fn new<S1: Into<String>, S2: Into<String>>(program: S1, description: S2) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Add output file
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Set video codec
    pub fn video_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:v").arg(codec)
    }

    /// Set audio codec
    pub fn audio_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:a").arg(codec)
    }

    /// Last argument, which is the positional target for both yt-dlp and ffmpeg
    pub fn target(&self) -> Option<&str> {
        self.args.last().map(String::as_str)
    }
}

/// Captured result of a finished tool
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, `None` when the process was terminated by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Text worth showing when the tool failed
    pub fn diagnostic(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }
}

/// Runs external tools on behalf of the downloader and the re-encoder
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Run the command to completion and capture its output.
    ///
    /// Spawn failures (missing binary, permissions) and timeouts are returned
    /// as `Err`; a non-zero exit is an `Ok` output with `success() == false`.
    async fn run(&self, command: &ToolCommand) -> io::Result<ToolOutput>;
}

/// [`ToolRunner`] backed by real child processes
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl ToolRunner for ProcessRunner {
    async fn run(&self, command: &ToolCommand) -> io::Result<ToolOutput> {
        debug!("Executing {}: {} {:?}", command.description, command.program, command.args);

        let child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // Dropping the future on timeout drops the child, which kills it
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| {
                    io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("{} timed out after {}s", command.program, limit.as_secs()),
                    )
                })??,
            None => child.wait_with_output().await?,
        };

        Ok(ToolOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Resolve a program the way the shell would.
///
/// Names containing a path separator are checked as given; bare names are
/// looked up in every `PATH` entry.
pub fn find_program(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths).find_map(|dir| {
        let full = dir.join(program);
        if full.is_file() {
            return Some(full);
        }
        if cfg!(windows) {
            let exe = full.with_extension("exe");
            if exe.is_file() {
                return Some(exe);
            }
        }
        None
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_argument_order() {
        let cmd = ToolCommand::new("ffmpeg", "Re-encode")
            .input("/tmp/in.mp4")
            .video_codec("libx264")
            .audio_codec("aac")
            .output("/tmp/out.mp4");

        assert_eq!(
            cmd.args,
            vec!["-i", "/tmp/in.mp4", "-c:v", "libx264", "-c:a", "aac", "/tmp/out.mp4"]
        );
        assert_eq!(cmd.target(), Some("/tmp/out.mp4"));
    }

    #[test]
    fn test_diagnostic_prefers_stderr() {
        let output = ToolOutput {
            code: Some(1),
            stdout: "progress".to_string(),
            stderr: "ERROR: Video unavailable\n".to_string(),
        };
        assert!(!output.success());
        assert_eq!(output.diagnostic(), "ERROR: Video unavailable");

        let quiet = ToolOutput {
            code: Some(1),
            stdout: "only stdout".to_string(),
            stderr: String::new(),
        };
        assert_eq!(quiet.diagnostic(), "only stdout");
    }

    #[test]
    fn test_find_program_with_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("fake-tool");
        std::fs::write(&tool, "").unwrap();

        assert_eq!(find_program(tool.to_str().unwrap()), Some(tool.clone()));
        assert_eq!(find_program(dir.path().join("missing").to_str().unwrap()), None);
    }

    #[test]
    fn test_find_program_unknown_name() {
        assert_eq!(find_program("definitely-not-a-real-tool-4f1c"), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_runner_captures_exit_code() {
        let runner = ProcessRunner::default();
        let cmd = ToolCommand::new("sh", "shell").args(["-c", "echo out; echo err >&2; exit 3"]);

        let output = runner.run(&cmd).await.unwrap();
        assert_eq!(output.code, Some(3));
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_runner_times_out() {
        let runner = ProcessRunner::new(Some(Duration::from_millis(100)));
        let cmd = ToolCommand::new("sleep", "sleep").arg("5");

        let err = runner.run(&cmd).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    }

    #[tokio::test]
    async fn test_process_runner_missing_binary() {
        let runner = ProcessRunner::default();
        let cmd = ToolCommand::new("definitely-not-a-real-tool-4f1c", "missing");

        let err = runner.run(&cmd).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
