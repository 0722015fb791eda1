//! Entry points called by the UI. Every outcome is a `CommandResponse`;
//! nothing here panics or returns an error to the caller.

use serde::Serialize;

use crate::{controller::DownloadController, model::Quality};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandStatus {
    Success,
    Error,
}

/// `{"status": "success" | "error", "message": "..."}`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommandResponse {
    pub status: CommandStatus,
    pub message: String,
}

impl CommandResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == CommandStatus::Error
    }
}

pub fn start_download(controller: &DownloadController, url: &str, quality: &str) -> CommandResponse {
    let started = quality
        .parse::<Quality>()
        .and_then(|quality| controller.start(url, quality));
    match started {
        Ok(()) => CommandResponse::success("Download started"),
        Err(err) => CommandResponse::error(err.user_message()),
    }
}

pub fn open_output_folder(controller: &DownloadController) -> CommandResponse {
    controller.open_output_folder();
    CommandResponse::success("Download folder opened")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::DownloaderConfig,
        downloader::{DownloadCommand, ProcessRunner},
        error::DownloadError,
    };
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };
    use tokio::{runtime::Handle, sync::mpsc::Sender};

    struct CountingRunner(Arc<AtomicUsize>);

    #[async_trait::async_trait]
    impl ProcessRunner for CountingRunner {
        async fn run(&self, _: &DownloadCommand, lines: Sender<String>) -> Result<i32, DownloadError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            lines.send("[download] 100%".to_string()).await.ok();
            Ok(0)
        }
    }

    fn controller() -> (DownloadController, Arc<AtomicUsize>) {
        let tmp = std::env::temp_dir().join("yt-video-downloader-tests");
        controller_with(DownloaderConfig {
            destination: tmp,
            ..Default::default()
        })
    }

    fn controller_with(config: DownloaderConfig) -> (DownloadController, Arc<AtomicUsize>) {
        let runs = Arc::new(AtomicUsize::new(0));
        let ctl = DownloadController::new(config, CountingRunner(Arc::clone(&runs)), |_: String| {}, Handle::current());
        (ctl, runs)
    }

    #[tokio::test]
    async fn invalid_url_is_an_error_response() {
        let (ctl, runs) = controller();
        let resp = start_download(&ctl, "not a url", "best");
        assert_eq!(resp, CommandResponse::error("Invalid YouTube URL"));
        tokio::task::yield_now().await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_url_and_unknown_quality() {
        let (ctl, _) = controller();
        assert_eq!(start_download(&ctl, " ", "best").message, "Please enter a URL");
        let resp = start_download(&ctl, "https://youtu.be/dQw4w9WgXcQ", "8k");
        assert!(resp.is_error());
        assert_eq!(resp.message, "Unknown quality: 8k");
    }

    #[tokio::test]
    async fn valid_request_starts_then_busy() {
        let (ctl, runs) = controller();
        let url = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
        assert_eq!(start_download(&ctl, url, "best"), CommandResponse::success("Download started"));
        assert_eq!(
            start_download(&ctl, url, "worst"),
            CommandResponse::error("A download is already running")
        );
        ctl.wait_until_idle().await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn open_folder_succeeds_without_file_manager() {
        let (ctl, runs) = controller_with(DownloaderConfig {
            destination: std::env::temp_dir(),
            file_manager: "no-such-file-manager-5c2e".to_string(),
            ..Default::default()
        });
        let resp = open_output_folder(&ctl);
        assert_eq!(resp, CommandResponse::success("Download folder opened"));
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn response_wire_shape() {
        let json = serde_json::to_value(CommandResponse::error("nope")).unwrap();
        assert_eq!(json, serde_json::json!({"status": "error", "message": "nope"}));
        let json = serde_json::to_value(CommandResponse::success("ok")).unwrap();
        assert_eq!(json["status"], "success");
    }
}
