use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::command::{find_program, ToolCommand, ToolRunner};
use crate::error::{GrabberError, Result};

/// Rewrites videos into a profile every Telegram client can stream
/// (H.264 baseline 3.0, yuv420p, AAC, moov atom first).
pub struct Reencoder {
    binary_path: String,
    runner: Arc<dyn ToolRunner>,
}

impl Reencoder {
    pub fn new<S: Into<String>>(binary_path: S, runner: Arc<dyn ToolRunner>) -> Self {
        Self {
            binary_path: binary_path.into(),
            runner,
        }
    }

    /// ffmpeg invocation writing the compatible copy of `input` to `output`
    pub fn build_command(&self, input: &Path, output: &Path) -> ToolCommand {
        ToolCommand::new(&self.binary_path, "Compatibility re-encode")
            .input(input)
            .video_codec("libx264")
            .args(["-profile:v", "baseline", "-level", "3.0", "-pix_fmt", "yuv420p"])
            .audio_codec("aac")
            .args(["-movflags", "+faststart"])
            .output(output)
    }

    /// Re-encode `path` in place.
    ///
    /// The new copy goes to a `_temp` sibling first and is renamed over the
    /// original only when ffmpeg succeeds. The temporary file is removed on
    /// every path out of this function, and a failure leaves the original
    /// untouched.
    pub async fn reencode_for_compatibility(&self, path: &Path) -> Result<()> {
        if find_program(&self.binary_path).is_none() {
            return Err(GrabberError::Reencode(format!("{} not found in PATH", self.binary_path)));
        }

        let temp = TempSibling::new(path)?;
        let command = self.build_command(path, temp.path());
        info!("Re-encoding {} for compatibility", path.display());

        let output = self.runner.run(&command).await.map_err(|e| {
            GrabberError::Reencode(format!("failed to run {}: {}", self.binary_path, e))
        })?;

        if !output.success() {
            return Err(GrabberError::Reencode(format!(
                "ffmpeg re-encode failed: {}",
                output.diagnostic()
            )));
        }

        tokio::fs::rename(temp.path(), path)
            .await
            .map_err(|e| GrabberError::Reencode(format!("failed to replace original file: {}", e)))?;

        info!("Re-encoded {}", path.display());
        Ok(())
    }
}

/// `<stem>_temp<ext>` next to the original, deleted when dropped
struct TempSibling {
    path: PathBuf,
}

impl TempSibling {
    fn new(original: &Path) -> Result<Self> {
        let stem = original
            .file_stem()
            .ok_or_else(|| GrabberError::Reencode(format!("'{}' has no file name", original.display())))?
            .to_string_lossy();
        let name = match original.extension() {
            Some(ext) => format!("{}_temp.{}", stem, ext.to_string_lossy()),
            None => format!("{}_temp", stem),
        };

        Ok(Self {
            path: original.with_file_name(name),
        })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempSibling {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed temporary file {}", self.path.display()),
            // Renamed over the original, or never written
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove temporary file {}: {}", self.path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{MockToolRunner, ToolOutput};
    use assert_fs::prelude::*;
    use assert_fs::TempDir;

    // Something find_program always resolves, standing in for ffmpeg
    fn fake_ffmpeg(dir: &TempDir) -> String {
        let tool = dir.child("ffmpeg");
        tool.touch().unwrap();
        tool.path().to_string_lossy().into_owned()
    }

    fn write_target(cmd: &ToolCommand, contents: &str) -> io::Result<()> {
        let target = cmd.target().map(PathBuf::from).ok_or(io::ErrorKind::InvalidInput)?;
        std::fs::write(target, contents)
    }

    #[test]
    fn test_command_profile() {
        let reencoder = Reencoder::new("ffmpeg", Arc::new(MockToolRunner::new()));
        let cmd = reencoder.build_command(Path::new("in.mp4"), Path::new("in_temp.mp4"));

        assert_eq!(cmd.program, "ffmpeg");
        assert_eq!(
            cmd.args,
            vec![
                "-i", "in.mp4", "-c:v", "libx264", "-profile:v", "baseline", "-level", "3.0",
                "-pix_fmt", "yuv420p", "-c:a", "aac", "-movflags", "+faststart", "in_temp.mp4",
            ]
        );
    }

    #[test]
    fn test_temp_sibling_name() {
        let temp = TempSibling::new(Path::new("/data/req/media.mp4")).unwrap();
        assert_eq!(temp.path(), Path::new("/data/req/media_temp.mp4"));

        let bare = TempSibling::new(Path::new("/data/req/clip")).unwrap();
        assert_eq!(bare.path(), Path::new("/data/req/clip_temp"));
    }

    #[tokio::test]
    async fn test_success_replaces_original() {
        let dir = TempDir::new().unwrap();
        let video = dir.child("media.mp4");
        video.write_str("original").unwrap();

        let mut runner = MockToolRunner::new();
        runner.expect_run().times(1).returning(|cmd| {
            write_target(cmd, "reencoded")?;
            Ok(ToolOutput {
                code: Some(0),
                ..Default::default()
            })
        });

        let reencoder = Reencoder::new(fake_ffmpeg(&dir), Arc::new(runner));
        reencoder.reencode_for_compatibility(video.path()).await.unwrap();

        assert_eq!(std::fs::read_to_string(video.path()).unwrap(), "reencoded");
        assert!(!dir.child("media_temp.mp4").path().exists());
    }

    #[tokio::test]
    async fn test_failure_keeps_original_and_cleans_temp() {
        let dir = TempDir::new().unwrap();
        let video = dir.child("media.mp4");
        video.write_str("original").unwrap();

        let mut runner = MockToolRunner::new();
        runner.expect_run().returning(|cmd| {
            write_target(cmd, "half written")?;
            Ok(ToolOutput {
                code: Some(1),
                stdout: String::new(),
                stderr: "Invalid data found when processing input".to_string(),
            })
        });

        let reencoder = Reencoder::new(fake_ffmpeg(&dir), Arc::new(runner));
        let err = reencoder.reencode_for_compatibility(video.path()).await.unwrap_err();

        assert!(err.is_non_fatal());
        assert!(err.to_string().contains("Invalid data found"));
        assert_eq!(std::fs::read_to_string(video.path()).unwrap(), "original");
        assert!(!dir.child("media_temp.mp4").path().exists());
    }

    #[tokio::test]
    async fn test_missing_transcoder() {
        let dir = TempDir::new().unwrap();
        let video = dir.child("media.mp4");
        video.write_str("original").unwrap();

        let mut runner = MockToolRunner::new();
        runner.expect_run().never();

        let missing = dir.path().join("no-ffmpeg-here").to_string_lossy().into_owned();
        let reencoder = Reencoder::new(missing, Arc::new(runner));
        let err = reencoder.reencode_for_compatibility(video.path()).await.unwrap_err();

        assert!(matches!(err, GrabberError::Reencode(ref msg) if msg.contains("not found")));
        assert_eq!(std::fs::read_to_string(video.path()).unwrap(), "original");
    }

    #[tokio::test]
    async fn test_spawn_error_cleans_temp() {
        let dir = TempDir::new().unwrap();
        let video = dir.child("clip.mov");
        video.write_str("original").unwrap();

        let mut runner = MockToolRunner::new();
        runner.expect_run().returning(|cmd| {
            write_target(cmd, "partial")?;
            Err(io::Error::new(io::ErrorKind::TimedOut, "ffmpeg timed out after 5s"))
        });

        let reencoder = Reencoder::new(fake_ffmpeg(&dir), Arc::new(runner));
        let err = reencoder.reencode_for_compatibility(video.path()).await.unwrap_err();

        assert!(err.to_string().contains("timed out"));
        assert_eq!(std::fs::read_to_string(video.path()).unwrap(), "original");
        assert!(!dir.child("clip_temp.mov").path().exists());
    }
}
