use thiserror::Error;

#[derive(Error, Debug)]
pub enum GrabberError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Download error: {0}")]
    Download(String),

    #[error("Re-encode error: {0}")]
    Reencode(String),

    #[error("Invalid destination name: {0}")]
    InvalidDestination(String),

    #[error("Unsupported platform for URL: {0}")]
    UnsupportedPlatform(String),
}

impl GrabberError {
    /// Failures that callers log and move past instead of aborting delivery.
    pub fn is_non_fatal(&self) -> bool {
        matches!(self, GrabberError::Reencode(_))
    }
}

pub type Result<T> = std::result::Result<T, GrabberError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_reencode_is_non_fatal() {
        assert!(GrabberError::Reencode("ffmpeg missing".to_string()).is_non_fatal());
        assert!(!GrabberError::Download("exit 1".to_string()).is_non_fatal());
        assert!(!GrabberError::UnsupportedPlatform("x".to_string()).is_non_fatal());
    }

    #[test]
    fn test_download_error_keeps_tool_output() {
        let err = GrabberError::Download("ERROR: Unsupported URL: https://a.b".to_string());
        assert!(err.to_string().contains("Unsupported URL"));
    }
}
