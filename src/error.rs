//! Error types for the downloader

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong between a start request and the end of a job
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The URL field was empty or only whitespace
    #[error("please enter a URL")]
    InvalidInput,

    /// The URL does not look like a YouTube video link
    #[error("invalid YouTube URL")]
    InvalidUrl,

    /// Quality string outside of `best` / `worst`
    #[error("unknown quality: {0}")]
    UnknownQuality(String),

    /// Another download is still running
    #[error("a download is already running")]
    Busy,

    /// The download tool could not be started at all
    #[error("could not start {program}: {source}")]
    LaunchFailure {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The download tool exited with a nonzero code
    #[error("download failed, exit code: {code}")]
    ProcessFailure { code: i32 },

    /// Reading the tool's output failed mid-run
    #[error("failed to read tool output: {0}")]
    Output(#[source] std::io::Error),
}

impl DownloadError {
    /// Display text starting with a capital letter, for the status log
    pub fn user_message(&self) -> String {
        let text = self.to_string();
        let mut chars = text.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Startup configuration problems
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot create download folder {path}: {source}")]
    Destination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level error of the binary
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("ui error: {0}")]
    Ui(#[from] eframe::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_failure_mentions_exit_code() {
        let err = DownloadError::ProcessFailure { code: 2 };
        assert_eq!(err.to_string(), "download failed, exit code: 2");
    }

    #[test]
    fn launch_failure_names_program() {
        let err = DownloadError::LaunchFailure {
            program: "yt-dlp".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.to_string().starts_with("could not start yt-dlp"));
    }

    #[test]
    fn user_message_is_capitalized() {
        assert_eq!(
            DownloadError::ProcessFailure { code: 1 }.user_message(),
            "Download failed, exit code: 1"
        );
        assert_eq!(DownloadError::Busy.user_message(), "A download is already running");
    }
}
