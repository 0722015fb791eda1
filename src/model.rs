use std::{fmt, str::FromStr};

use tokio::task::JoinHandle;

use crate::error::DownloadError;

/// Coarse quality choice offered in the UI
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Quality {
    /// Best video+audio in mp4, falling back to best overall
    #[default]
    Best,
    /// Lowest mp4 stream, falling back to lowest overall
    Worst,
}

impl Quality {
    pub const ALL: [Quality; 2] = [Quality::Best, Quality::Worst];

    /// yt-dlp `--format` expression for this quality
    pub fn format_expression(self) -> &'static str {
        match self {
            Quality::Best => "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best",
            Quality::Worst => "worst[ext=mp4]/worst",
        }
    }

    /// Label shown in the quality drop-down
    pub fn label(self) -> &'static str {
        match self {
            Quality::Best => "Best quality",
            Quality::Worst => "Low quality (faster)",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Quality::Best => "best",
            Quality::Worst => "worst",
        })
    }
}

impl FromStr for Quality {
    type Err = DownloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "best" => Ok(Quality::Best),
            "worst" => Ok(Quality::Worst),
            _ => Err(DownloadError::UnknownQuality(s.to_string())),
        }
    }
}

/// Lifecycle of the (single) download job
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum JobState {
    /// No download running, a new one may start
    #[default]
    Idle,
    /// yt-dlp is running
    Running,
    /// Exited with code 0, about to fold back to `Idle`
    Completed,
    /// Nonzero exit or launch error, about to fold back to `Idle`
    Failed,
}

/// The one in-flight download, owned by the controller
pub struct DownloadJob {
    pub url: String,
    pub quality: Quality,
    pub state: JobState,
    /// Background task running the tool; `None` only while it is being spawned
    pub handle: Option<JoinHandle<()>>,
}
