use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::command::{ToolCommand, ToolRunner};
use crate::config::DownloadOptions;
use crate::error::{GrabberError, Result};
use crate::media::{FileResult, MediaKind};

/// Suffix yt-dlp gives to files it has not finished writing
pub const PARTIAL_SUFFIX: &str = ".part";

/// Drives yt-dlp and collects what it leaves behind.
///
/// Holds no per-call state: every call writes into its own
/// `base_dir/<name>` directory, so one instance can be shared across tasks
/// as long as callers pick distinct names.
pub struct Downloader {
    options: DownloadOptions,
    binary_path: String,
    runner: Arc<dyn ToolRunner>,
}

impl Downloader {
    pub fn new<S: Into<String>>(options: DownloadOptions, binary_path: S, runner: Arc<dyn ToolRunner>) -> Self {
        Self {
            options,
            binary_path: binary_path.into(),
            runner,
        }
    }

    pub fn options(&self) -> &DownloadOptions {
        &self.options
    }

    /// Directory a download with this name writes into
    pub fn destination_dir(&self, name: &str) -> Result<PathBuf> {
        validate_destination_name(name)?;
        Ok(self.options.base_dir.join(name))
    }

    /// yt-dlp arguments for one download. Options that are off are left out.
    pub fn build_args(&self, output_dir: &Path, url: &str) -> Vec<String> {
        let options = &self.options;
        let mut args = vec![
            "-o".to_string(),
            output_dir.join(&options.output_template).to_string_lossy().into_owned(),
        ];

        if options.restrict_filenames {
            args.push("--restrict-filenames".to_string());
        }

        if options.no_playlist {
            args.push("--no-playlist".to_string());
        }

        if !options.max_filesize.is_empty() {
            args.push("--max-filesize".to_string());
            args.push(options.max_filesize.clone());
        }

        if options.write_thumbnail {
            args.push("--write-thumbnail".to_string());
        }

        if !options.format.is_empty() {
            args.push("--format".to_string());
            args.push(options.format.clone());
        }

        if !options.recode_video.is_empty() {
            args.push("--recode-video".to_string());
            args.push(options.recode_video.clone());
        }

        args.push(url.to_string());
        args
    }

    /// Download `url` into `base_dir/<name>` and classify the result.
    ///
    /// Either every usable file is returned or an error is; a successful
    /// yt-dlp run that left no media behind is still a `Download` error.
    /// Nothing is deleted here, the destination directory belongs to the
    /// caller.
    pub async fn download(&self, url: &str, name: &str) -> Result<Vec<FileResult>> {
        let output_dir = self.destination_dir(name)?;
        let args = self.build_args(&output_dir, url);

        fs::create_dir_all(&output_dir).await.map_err(|e| {
            GrabberError::Download(format!(
                "could not create download directory '{}': {}",
                output_dir.display(),
                e
            ))
        })?;

        let command = ToolCommand::new(&self.binary_path, "yt-dlp download").args(args);
        info!("Downloading {} into {}", url, output_dir.display());

        let output = self.runner.run(&command).await.map_err(|e| {
            GrabberError::Download(format!("failed to run {}: {}", self.binary_path, e))
        })?;

        if !output.success() {
            let code = output
                .code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            return Err(GrabberError::Download(format!(
                "yt-dlp failed with exit code {}: {}",
                code,
                output.diagnostic()
            )));
        }
        debug!("yt-dlp output for {}: {}", url, output.stdout.trim());

        let results = scan_directory(&output_dir)?;
        if results.is_empty() {
            return Err(GrabberError::Download(format!(
                "could not find primary downloaded media file from yt-dlp for '{}'",
                url
            )));
        }

        info!("Downloaded {} file(s) from {}", results.len(), url);
        Ok(results)
    }
}

/// Reject names that would escape `base_dir` or collapse onto it
pub fn validate_destination_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.contains(['/', '\\']) => Ok(()),
        _ => Err(GrabberError::InvalidDestination(format!(
            "'{}' must be a single plain path segment",
            name
        ))),
    }
}

/// Classify the immediate entries of a finished download directory.
///
/// Directories, partial downloads and files that are not media are skipped.
/// Results are sorted by file name.
pub fn scan_directory(dir: &Path) -> Result<Vec<FileResult>> {
    let mut results = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            GrabberError::Download(format!("could not read download directory '{}': {}", dir.display(), e))
        })?;

        let name = entry.file_name().to_string_lossy();
        if entry.file_type().is_dir() || name.ends_with(PARTIAL_SUFFIX) {
            continue;
        }

        let result = FileResult::from_path(entry.path().to_path_buf());
        if result.kind == MediaKind::None {
            info!("Skipping file '{}' with unsupported extension '{}'", result.name, result.extension);
            continue;
        }

        results.push(result);
    }

    Ok(results)
}
