use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory downloads are written under
    #[arg(long)]
    pub base_dir: Option<PathBuf>,

    /// Recode downloaded videos into this container (e.g. mp4)
    #[arg(long)]
    pub recode_video: Option<String>,

    /// Kill yt-dlp or ffmpeg after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download the media behind a URL and list the files
    Download {
        /// Post URL (TikTok, Instagram reel, Twitter/X or YouTube)
        url: String,

        /// Destination directory name under the base directory
        #[arg(short, long)]
        name: Option<String>,

        /// Print the results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show which platform a URL belongs to
    Identify {
        /// URL to classify
        url: String,
    },

    /// Re-encode a video in place for Telegram iOS playback
    Reencode {
        /// Video file to rewrite
        path: PathBuf,
    },

    /// Run the full chat flow on every URL in a message
    Process {
        /// Message text containing one or more URLs
        text: String,

        /// Keep the downloaded files instead of removing them afterwards
        #[arg(short, long)]
        keep: bool,

        /// Print the results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the default configuration to a file
    InitConfig {
        /// Output path
        #[arg(default_value = "grabber.toml")]
        path: PathBuf,
    },
}
