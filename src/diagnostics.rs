//! Turning failures into the short explanations shown to people.

use crate::error::GrabberError;

/// Broad cause of a failed download, read from yt-dlp's own error text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadFailure {
    /// Unsupported, private or removed content
    Unsupported,
    /// The video exists but cannot be watched
    Unavailable,
    Other,
}

impl DownloadFailure {
    pub fn classify(message: &str) -> DownloadFailure {
        if message.contains("Unsupported URL") || message.contains("Unable to extract") {
            DownloadFailure::Unsupported
        } else if message.contains("Video unavailable") {
            DownloadFailure::Unavailable
        } else {
            DownloadFailure::Other
        }
    }

    pub fn explanation(self) -> &'static str {
        match self {
            DownloadFailure::Unsupported => "The URL might be unsupported, private, or the content was removed",
            DownloadFailure::Unavailable => "This video is unavailable",
            DownloadFailure::Other => "I'm unable to fetch the requested media",
        }
    }
}

/// Where a request came from; group chats get no reply for unsupported links
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatKind {
    Private,
    Group,
}

/// Reply for a link from a platform the grabber does not handle
pub fn unsupported_platform_reply(chat: ChatKind) -> Option<&'static str> {
    match chat {
        ChatKind::Private => Some("Sorry, I can't download from this URL"),
        ChatKind::Group => None,
    }
}

/// Message for a request that ended in `err`
pub fn user_message(err: &GrabberError) -> String {
    match err {
        GrabberError::Download(msg) if msg.contains("could not find primary downloaded media file") => {
            "Sorry, I couldn't find the media for the provided URL".to_string()
        }
        GrabberError::Download(msg) => format!(
            "Sorry, I couldn't fetch the media from the provided URL. {}",
            DownloadFailure::classify(msg).explanation()
        ),
        GrabberError::UnsupportedPlatform(_) => "Sorry, I can't download from this URL".to_string(),
        other => format!("Sorry, something went wrong: {}", other),
    }
}

/// Message for media that was downloaded but could not be sent on
pub fn delivery_failure_message(url: &str, transport_error: &str) -> String {
    format!(
        "I downloaded the media from {} but failed to send it to you. Error: {}",
        url, transport_error
    )
}
