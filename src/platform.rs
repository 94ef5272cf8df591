use serde::Serialize;
use std::fmt;
use url::Url;

use crate::media::MediaKind;

/// Sites the grabber knows how to handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    TikTok,
    InstagramReels,
    Twitter,
    YouTube,
    Unknown,
}

impl Platform {
    /// Work out the platform from a URL's host and path.
    ///
    /// Never fails: anything that does not parse, or does not match one of
    /// the rules below, is [`Platform::Unknown`]. Only reels are accepted
    /// from Instagram.
    pub fn identify(raw_url: &str) -> Platform {
        let Ok(parsed) = Url::parse(raw_url) else {
            return Platform::Unknown;
        };

        let host = parsed.host_str().unwrap_or_default().to_lowercase();
        let path = parsed.path().to_lowercase();

        if host.contains("tiktok.com") {
            Platform::TikTok
        } else if host.contains("instagram.com") && path.starts_with("/reel/") {
            Platform::InstagramReels
        } else if host.contains("twitter.com") || host.contains("x.com") {
            Platform::Twitter
        } else if host.contains("youtube.com") || host.contains("youtu.be") {
            Platform::YouTube
        } else {
            Platform::Unknown
        }
    }

    pub fn is_supported(self) -> bool {
        self != Platform::Unknown
    }

    /// Whether a downloaded file of this kind is delivered for this platform.
    ///
    /// Video platforms drop their thumbnails; posts from Twitter can mix
    /// photos, videos and GIFs so everything is kept.
    pub fn retains(self, kind: MediaKind) -> bool {
        match self {
            Platform::TikTok | Platform::YouTube | Platform::InstagramReels => kind == MediaKind::Video,
            Platform::Twitter | Platform::Unknown => true,
        }
    }

    /// Instagram serves codecs that the Telegram iOS client cannot play
    pub fn needs_reencode(self) -> bool {
        match self {
            Platform::InstagramReels => true,
            Platform::TikTok | Platform::Twitter | Platform::YouTube | Platform::Unknown => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::TikTok => "tiktok",
            Platform::InstagramReels => "instagram reels",
            Platform::Twitter => "twitter",
            Platform::YouTube => "youtube",
            Platform::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shorthand for [`Platform::identify`]
pub fn identify(raw_url: &str) -> Platform {
    Platform::identify(raw_url)
}
