use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// How a downloaded file should be delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Photo,
    Video,
    Animation,
    /// Not media; callers fall back to sending a plain document
    None,
}

impl MediaKind {
    /// Map a file extension (with its leading dot) to a media kind, ignoring case
    pub fn classify(extension: &str) -> MediaKind {
        match extension.to_lowercase().as_str() {
            ".mp4" | ".mkv" | ".webm" | ".mov" => MediaKind::Video,
            ".jpg" | ".jpeg" | ".png" | ".webp" => MediaKind::Photo,
            ".gif" => MediaKind::Animation,
            _ => MediaKind::None,
        }
    }

    /// Classify by the file's extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> MediaKind {
        MediaKind::classify(&extension_of(path.as_ref()))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
            MediaKind::Animation => "animation",
            MediaKind::None => "none",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercased extension including the dot, or an empty string
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// One file left behind by a finished download
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileResult {
    pub name: String,
    pub path: PathBuf,
    pub extension: String,
    pub kind: MediaKind,
}

impl FileResult {
    pub fn from_path(path: PathBuf) -> FileResult {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = extension_of(&path);
        let kind = MediaKind::classify(&extension);

        FileResult {
            name,
            path,
            extension,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_table() {
        for ext in [".mp4", ".MP4", ".mkv", ".webm", ".mov"] {
            assert_eq!(MediaKind::classify(ext), MediaKind::Video, "{}", ext);
        }
        for ext in [".jpg", ".jpeg", ".png", ".webp", ".JPG"] {
            assert_eq!(MediaKind::classify(ext), MediaKind::Photo, "{}", ext);
        }
        assert_eq!(MediaKind::classify(".gif"), MediaKind::Animation);
        assert_eq!(MediaKind::classify(".txt"), MediaKind::None);
        assert_eq!(MediaKind::classify(".json"), MediaKind::None);
        assert_eq!(MediaKind::classify(""), MediaKind::None);
        // The dot is part of the extension
        assert_eq!(MediaKind::classify("mp4"), MediaKind::None);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(MediaKind::from_path("media/a/media.MOV"), MediaKind::Video);
        assert_eq!(MediaKind::from_path("media/a/media.info.json"), MediaKind::None);
        assert_eq!(MediaKind::from_path("media/a/README"), MediaKind::None);
    }

    #[test]
    fn test_file_result_from_path() {
        let result = FileResult::from_path(PathBuf::from("/tmp/dl/media.WEBM"));
        assert_eq!(result.name, "media.WEBM");
        assert_eq!(result.extension, ".webm");
        assert_eq!(result.kind, MediaKind::Video);
    }
}
