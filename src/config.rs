use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use crate::error::{GrabberError, Result};

// Default values for download options
fn default_base_dir() -> PathBuf {
    PathBuf::from("media/")
}

fn default_max_filesize() -> String {
    "49M".to_string()
}

fn default_format() -> String {
    "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best".to_string()
}

fn default_true() -> bool {
    true
}

fn default_output_template() -> String {
    "media.%(ext)s".to_string()
}

fn default_downloader_path() -> String {
    "yt-dlp".to_string()
}

fn default_transcoder_path() -> String {
    "ffmpeg".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub download: DownloadOptions,
    #[serde(default)]
    pub tools: ToolsConfig,
}

/// Options handed to yt-dlp for every download.
///
/// The record is never mutated by the downloader, so one configured
/// [`crate::downloader::Downloader`] can serve any number of calls. An empty
/// string switches the corresponding flag off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadOptions {
    /// Directory under which every destination directory is created
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
    /// Maximum file size in yt-dlp syntax (e.g. "49M")
    #[serde(default = "default_max_filesize")]
    pub max_filesize: String,
    /// yt-dlp format selector
    #[serde(default = "default_format")]
    pub format: String,
    /// Pass --restrict-filenames
    #[serde(default = "default_true")]
    pub restrict_filenames: bool,
    /// Target container for --recode-video, empty to keep the source container
    #[serde(default)]
    pub recode_video: String,
    /// Pass --no-playlist
    #[serde(default = "default_true")]
    pub no_playlist: bool,
    /// Pass --write-thumbnail
    #[serde(default = "default_true")]
    pub write_thumbnail: bool,
    /// Output filename template, relative to the destination directory
    #[serde(default = "default_output_template")]
    pub output_template: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to the yt-dlp binary
    #[serde(default = "default_downloader_path")]
    pub downloader_path: String,
    /// Path to the ffmpeg binary
    #[serde(default = "default_transcoder_path")]
    pub transcoder_path: String,
    /// Kill external tools that run longer than this many seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            max_filesize: default_max_filesize(),
            format: default_format(),
            restrict_filenames: true,
            recode_video: String::new(),
            no_playlist: true,
            write_thumbnail: true,
            output_template: default_output_template(),
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            downloader_path: default_downloader_path(),
            transcoder_path: default_transcoder_path(),
            timeout_secs: None,
        }
    }
}

impl ToolsConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| GrabberError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| GrabberError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| GrabberError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| GrabberError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}
