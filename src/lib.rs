//! Grabber - social media downloads through yt-dlp
//!
//! Identifies which platform a URL belongs to, runs yt-dlp into a per-request
//! directory, classifies what comes back, and optionally re-encodes videos
//! with ffmpeg so every Telegram client can play them.

pub mod cli;
pub mod command;
pub mod config;
pub mod diagnostics;
pub mod downloader;
pub mod error;
pub mod links;
pub mod media;
pub mod platform;
pub mod reencode;
pub mod workflow;

pub use config::{Config, DownloadOptions};
pub use downloader::Downloader;
pub use error::{GrabberError, Result};
pub use media::{FileResult, MediaKind};
pub use platform::{identify, Platform};
pub use reencode::Reencoder;
pub use workflow::Workflow;
