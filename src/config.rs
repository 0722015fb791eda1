use std::path::{Path, PathBuf};

use crate::{error::ConfigError, folder};

/// Executable invoked for every download
pub const DEFAULT_PROGRAM: &str = "yt-dlp";

/// Passed to `--progress-template`; output is forwarded verbatim
pub const PROGRESS_TEMPLATE: &str = "%(progress._percent_str)s %(progress._speed_str)s";

/// Sub-folder of the user's download directory that receives videos
pub const DESTINATION_DIR_NAME: &str = "YT-Videos";

/// Overrides the destination folder
pub const ENV_DOWNLOAD_DIR: &str = "YTDL_GUI_DOWNLOAD_DIR";
/// Overrides the yt-dlp executable
pub const ENV_TOOL: &str = "YTDL_GUI_TOOL";

/// Process-wide settings, fixed after startup
#[derive(Clone, Debug)]
pub struct DownloaderConfig {
    /// yt-dlp executable name or path
    pub program: String,
    /// Folder videos are written to
    pub destination: PathBuf,
    pub progress_template: String,
    /// Program that reveals the destination folder
    pub file_manager: String,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            destination: default_destination(),
            progress_template: PROGRESS_TEMPLATE.to_string(),
            file_manager: folder::default_file_manager().to_string(),
        }
    }
}

impl DownloaderConfig {
    /// Defaults with the optional environment overrides applied
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(dir) = lookup(ENV_DOWNLOAD_DIR).filter(|v| !v.trim().is_empty()) {
            config.destination = PathBuf::from(dir);
        }
        if let Some(tool) = lookup(ENV_TOOL).filter(|v| !v.trim().is_empty()) {
            config.program = tool;
        }
        config
    }

    /// Creates the destination folder (and parents) if missing
    pub fn ensure_destination(&self) -> Result<&Path, ConfigError> {
        std::fs::create_dir_all(&self.destination).map_err(|source| ConfigError::Destination {
            path: self.destination.clone(),
            source,
        })?;
        Ok(&self.destination)
    }

    /// `--output` template: `<destination>/%(title)s.%(ext)s`
    pub fn output_template(&self) -> String {
        self.destination
            .join("%(title)s.%(ext)s")
            .to_string_lossy()
            .into_owned()
    }
}

fn default_destination() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("downloads"))
        .join(DESTINATION_DIR_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_destination_ends_in_video_folder() {
        let config = DownloaderConfig::default();
        assert!(config.destination.ends_with(DESTINATION_DIR_NAME));
        assert_eq!(config.program, "yt-dlp");
    }

    #[test]
    fn lookup_overrides_apply() {
        let config = DownloaderConfig::from_lookup(|key| match key {
            ENV_DOWNLOAD_DIR => Some("/tmp/videos".to_string()),
            ENV_TOOL => Some("/opt/yt-dlp".to_string()),
            _ => None,
        });
        assert_eq!(config.destination, PathBuf::from("/tmp/videos"));
        assert_eq!(config.program, "/opt/yt-dlp");
    }

    #[test]
    fn blank_overrides_are_ignored() {
        let config = DownloaderConfig::from_lookup(|_| Some("  ".to_string()));
        assert_eq!(config.program, DEFAULT_PROGRAM);
        assert!(config.destination.ends_with(DESTINATION_DIR_NAME));
    }

    #[test]
    fn ensure_destination_creates_nested_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let config = DownloaderConfig {
            destination: tmp.path().join("a").join("b"),
            ..Default::default()
        };
        let dir = config.ensure_destination().unwrap();
        assert!(dir.is_dir());
        // second call is a no-op
        config.ensure_destination().unwrap();
    }

    #[test]
    fn output_template_lives_in_destination() {
        let config = DownloaderConfig {
            destination: PathBuf::from("videos"),
            ..Default::default()
        };
        let template = config.output_template();
        assert!(template.starts_with("videos"));
        assert!(template.ends_with("%(title)s.%(ext)s"));
    }
}
