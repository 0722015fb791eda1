//! Single-flight download job control.
//!
//! The controller accepts at most one running download. A start request is
//! validated, turned into a yt-dlp invocation and handed to a background task;
//! the task forwards every output line to the notification sink and reports
//! the final outcome before the controller goes back to `Idle`.

use std::{path::Path, sync::Arc};

use parking_lot::Mutex;
use tokio::{
    runtime::Handle,
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing::{info, warn};

use crate::{
    config::DownloaderConfig,
    downloader::{DownloadCommand, LINE_BUFFER, ProcessRunner},
    error::DownloadError,
    folder,
    model::{DownloadJob, JobState, Quality},
    validate,
};

/// Receives status text for display. Called from background tasks.
pub trait NotificationSink: Send + Sync + 'static {
    fn notify(&self, message: String);
}

impl<F> NotificationSink for F
where
    F: Fn(String) + Send + Sync + 'static,
{
    fn notify(&self, message: String) {
        self(message)
    }
}

struct Inner {
    config: Arc<DownloaderConfig>,
    runner: Arc<dyn ProcessRunner>,
    sink: Arc<dyn NotificationSink>,
    /// The only shared mutable state: `Some` while a job is running
    job: Mutex<Option<DownloadJob>>,
    state: watch::Sender<JobState>,
    runtime: Handle,
}

/// Cheap to clone; all clones share the same job slot
#[derive(Clone)]
pub struct DownloadController {
    inner: Arc<Inner>,
}

impl DownloadController {
    pub fn new(
        config: DownloaderConfig,
        runner: impl ProcessRunner + 'static,
        sink: impl NotificationSink,
        runtime: Handle,
    ) -> Self {
        let (state, _) = watch::channel(JobState::Idle);
        Self {
            inner: Arc::new(Inner {
                config: Arc::new(config),
                runner: Arc::new(runner),
                sink: Arc::new(sink),
                job: Mutex::new(None),
                state,
                runtime,
            }),
        }
    }

    pub fn config(&self) -> &DownloaderConfig {
        &self.inner.config
    }

    pub fn state(&self) -> JobState {
        *self.inner.state.borrow()
    }

    /// Resolves once no job is running
    #[cfg(test)]
    pub async fn wait_until_idle(&self) {
        let mut rx = self.inner.state.subscribe();
        let _ = rx.wait_for(|state| *state == JobState::Idle).await;
    }

    /// Starts a download in the background and returns immediately.
    ///
    /// Fails with `InvalidInput` for a blank URL, `InvalidUrl` if the URL is
    /// not a YouTube video link and `Busy` while another job runs.
    pub fn start(&self, url: &str, quality: Quality) -> Result<(), DownloadError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(DownloadError::InvalidInput);
        }
        if !validate::is_valid(url) {
            return Err(DownloadError::InvalidUrl);
        }

        let mut slot = self.inner.job.lock();
        if let Some(job) = slot.as_ref() {
            if !job.handle.as_ref().is_some_and(JoinHandle::is_finished) {
                return Err(DownloadError::Busy);
            }
            // The task died (panicking sink) before it could report; reclaim the slot.
            warn!(url = %job.url, "previous download task ended without reporting");
        }

        let command = DownloadCommand::ytdlp(&self.inner.config, url, quality);
        info!(
            url,
            %quality,
            video_id = validate::video_id(url).unwrap_or_default(),
            "starting download"
        );

        *slot = Some(DownloadJob {
            url: url.to_owned(),
            quality,
            state: JobState::Running,
            handle: None,
        });
        self.inner.state.send_replace(JobState::Running);

        let handle = self.inner.runtime.spawn(self.clone().run_job(command));
        if let Some(job) = slot.as_mut() {
            job.handle = Some(handle);
        }
        Ok(())
    }

    /// Reveals the download folder in the platform file manager.
    /// Best effort: a missing file manager is only logged.
    pub fn open_output_folder(&self) {
        let destination: &Path = &self.inner.config.destination;
        if let Err(err) = folder::reveal(&self.inner.config.file_manager, destination) {
            warn!(path = %destination.display(), error = %err, "could not open download folder");
        }
    }

    async fn run_job(self, command: DownloadCommand) {
        let (tx, mut rx) = mpsc::channel::<String>(LINE_BUFFER);
        let sink = Arc::clone(&self.inner.sink);
        let forward = async move {
            while let Some(line) = rx.recv().await {
                sink.notify(line.trim().to_owned());
            }
        };
        let (result, ()) = tokio::join!(self.inner.runner.run(&command, tx), forward);
        self.finish(result);
    }

    fn finish(&self, result: Result<i32, DownloadError>) {
        let outcome = match result {
            Ok(0) => Ok(()),
            Ok(code) => Err(DownloadError::ProcessFailure { code }),
            Err(err) => Err(err),
        };
        let (state, message) = match &outcome {
            Ok(()) => (JobState::Completed, "Download complete".to_owned()),
            Err(err @ DownloadError::ProcessFailure { .. }) => (JobState::Failed, err.user_message()),
            Err(err) => (JobState::Failed, format!("Error: {err}")),
        };

        if let Some(job) = self.inner.job.lock().as_mut() {
            job.state = state;
            match &outcome {
                Ok(()) => info!(url = %job.url, quality = %job.quality, state = ?job.state, "download complete"),
                Err(err) => warn!(url = %job.url, quality = %job.quality, state = ?job.state, error = %err, "download failed"),
            }
        }
        self.inner.state.send_replace(state);

        // Not under the job lock: the sink may call back into the controller.
        self.inner.sink.notify(message);

        // Terminal state reported; free the slot for the next job.
        *self.inner.job.lock() = None;
        self.inner.state.send_replace(JobState::Idle);
    }
}
