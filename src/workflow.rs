use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::command::{ProcessRunner, ToolRunner};
use crate::config::Config;
use crate::downloader::Downloader;
use crate::error::{GrabberError, Result};
use crate::links::extract_urls;
use crate::media::{FileResult, MediaKind};
use crate::platform::Platform;
use crate::reencode::Reencoder;

/// Destination directory that is removed when dropped unless persisted
#[derive(Debug)]
pub struct ScopedDir {
    path: PathBuf,
    keep: bool,
}

impl ScopedDir {
    pub fn new(path: PathBuf) -> Self {
        Self { path, keep: false }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Leave the directory on disk and hand its path back
    pub fn persist(mut self) -> PathBuf {
        self.keep = true;
        std::mem::take(&mut self.path)
    }
}

impl Drop for ScopedDir {
    fn drop(&mut self) {
        if self.keep || !self.path.exists() {
            return;
        }
        info!("Removing download folder {}", self.path.display());
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            warn!("Failed to remove download folder {}: {}", self.path.display(), e);
        }
    }
}

/// Files ready to be sent for one URL
#[derive(Debug)]
pub struct Delivery {
    pub url: String,
    pub platform: Platform,
    pub files: Vec<FileResult>,
    /// Non-fatal problems hit on the way, such as a failed re-encode
    pub warnings: Vec<String>,
    pub dir: ScopedDir,
}

/// Outcome for one URL found in a message
#[derive(Debug)]
pub struct UrlOutcome {
    pub url: String,
    pub result: Result<Delivery>,
}

/// Unique destination name for one request, e.g. `chat42_msg7_ts1700000000`
pub fn destination_name(scope: i64, message: i64, timestamp: i64) -> String {
    format!("chat{}_msg{}_ts{}", scope, message, timestamp)
}

/// Identify, download, filter and post-process URLs.
///
/// Owns no global state; the tool runner is passed in so tests (and other
/// front ends) can substitute it.
pub struct Workflow {
    downloader: Downloader,
    reencoder: Reencoder,
}

impl Workflow {
    pub fn new(config: Config, runner: Arc<dyn ToolRunner>) -> Self {
        let downloader = Downloader::new(config.download, config.tools.downloader_path, runner.clone());
        let reencoder = Reencoder::new(config.tools.transcoder_path, runner);

        Self { downloader, reencoder }
    }

    /// Workflow driving real yt-dlp and ffmpeg processes
    pub fn with_processes(config: Config) -> Self {
        let runner = Arc::new(ProcessRunner::new(config.tools.timeout()));
        Self::new(config, runner)
    }

    pub fn downloader(&self) -> &Downloader {
        &self.downloader
    }

    pub fn reencoder(&self) -> &Reencoder {
        &self.reencoder
    }

    /// Process one URL into `base_dir/<name>`.
    ///
    /// The directory is cleaned up when the returned [`Delivery`] is dropped,
    /// and immediately on any error.
    pub async fn process_url(&self, url: &str, name: &str) -> Result<Delivery> {
        let platform = Platform::identify(url);
        if !platform.is_supported() {
            info!("{} is from an unsupported platform", url);
            return Err(GrabberError::UnsupportedPlatform(url.to_string()));
        }
        info!("Found URL from {}: {}", platform, url);

        let dir = ScopedDir::new(self.downloader.destination_dir(name)?);
        let mut files = self.downloader.download(url, name).await?;

        files.retain(|file| platform.retains(file.kind));
        if files.is_empty() {
            return Err(GrabberError::Download(format!(
                "could not find primary downloaded media file for '{}' after filtering",
                url
            )));
        }

        let mut warnings = Vec::new();
        if platform.needs_reencode() {
            for file in files.iter().filter(|f| f.kind == MediaKind::Video) {
                match self.reencoder.reencode_for_compatibility(&file.path).await {
                    Ok(()) => info!("Re-encoded {} for iOS compatibility", file.name),
                    Err(e) => {
                        warn!("Failed to re-encode {}, sending original: {}", file.name, e);
                        warnings.push(e.to_string());
                    }
                }
            }
        }

        Ok(Delivery {
            url: url.to_string(),
            platform,
            files,
            warnings,
            dir,
        })
    }

    /// Process every URL in a message, one after another.
    ///
    /// Each URL gets its own destination `<name_prefix>_<index>`; a failing
    /// URL does not stop the rest.
    pub async fn process_text(&self, text: &str, name_prefix: &str) -> Vec<UrlOutcome> {
        let mut outcomes = Vec::new();

        for (index, url) in extract_urls(text).into_iter().enumerate() {
            let name = format!("{}_{}", name_prefix, index);
            let result = self.process_url(&url, &name).await;
            if let Err(e) = &result {
                warn!("Failed to process {}: {}", url, e);
            }
            outcomes.push(UrlOutcome { url, result });
        }

        outcomes
    }
}
