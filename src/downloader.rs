use std::{
    io::{BufRead, BufReader, Read},
    process::{ExitStatus, Stdio},
};

use async_trait::async_trait;
use tokio::{process::Command, sync::mpsc::Sender};
use tracing::debug;

use crate::{config::DownloaderConfig, error::DownloadError, model::Quality};

/// Output lines buffered between the pipe reader and the consumer
pub const LINE_BUFFER: usize = 256;

/// Program plus arguments for one run of the download tool
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl DownloadCommand {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// `yt-dlp <url> --format <expr> --output <dest>/%(title)s.%(ext)s --progress-template <t> --newline`
    pub fn ytdlp(config: &DownloaderConfig, url: &str, quality: Quality) -> Self {
        let args = vec![
            url.to_owned(),
            "--format".to_owned(),
            quality.format_expression().to_owned(),
            "--output".to_owned(),
            config.output_template(),
            "--progress-template".to_owned(),
            config.progress_template.clone(),
            // progress lines end in \r otherwise
            "--newline".to_owned(),
        ];
        Self::new(config.program.clone(), args)
    }
}

/// Runs a command to completion, streaming its combined output.
///
/// stdout and stderr share one stream: every line is sent on `lines` exactly
/// once, in the order the process wrote it. Returns the exit code.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, command: &DownloadCommand, lines: Sender<String>) -> Result<i32, DownloadError>;
}

/// Spawns real child processes through tokio
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioProcessRunner;

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, command: &DownloadCommand, lines: Sender<String>) -> Result<i32, DownloadError> {
        let launch_failure = |source| DownloadError::LaunchFailure {
            program: command.program.clone(),
            source,
        };

        // One pipe for both streams, like `2>&1`.
        let (reader, writer) = std::io::pipe().map_err(launch_failure)?;
        let stderr_writer = writer.try_clone().map_err(launch_failure)?;

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(writer)
            .stderr(stderr_writer);
        let spawned = cmd.spawn();
        // Release our copies of the write end, otherwise the reader never sees EOF.
        drop(cmd);
        let mut child = spawned.map_err(launch_failure)?;

        let forwarded = tokio::task::spawn_blocking(move || forward_lines(reader, lines))
            .await
            .map_err(|err| DownloadError::Output(std::io::Error::other(err)))
            .and_then(|result| result);

        if forwarded.is_err() {
            // nobody is reading the pipe any more
            let _ = child.start_kill();
        }
        let status = child.wait().await.map_err(DownloadError::Output)?;
        forwarded?;
        Ok(exit_code(status))
    }
}

/// Blocking line reader; runs on a `spawn_blocking` thread.
fn forward_lines(pipe: impl Read, lines: Sender<String>) -> Result<(), DownloadError> {
    let mut reader = BufReader::new(pipe);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(DownloadError::Output)?;
        if read == 0 {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&buf)
            .trim_end_matches(['\r', '\n'])
            .to_owned();
        debug!(target: "yt-dlp", "{line}");
        // A closed receiver is not fatal: keep draining so the child never blocks on a full pipe.
        let _ = lines.blocking_send(line);
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}
