use crate::config::{ScreenshotConfig, VideoConfig};
use crate::error::{Error, Result};
use crate::timeline::{pad_width, screenshot_file_name};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Screenshot extraction using the FFmpeg command line tools
#[derive(Debug, Clone)]
pub struct VideoProcessor {
    video: VideoConfig,
    screenshots: ScreenshotConfig,
}

impl VideoProcessor {
    pub fn new(video: VideoConfig, screenshots: ScreenshotConfig) -> Self {
        Self { video, screenshots }
    }

    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                self.video
                    .supported_extensions
                    .iter()
                    .any(|s| s.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    /// Duration of the container in seconds, via ffprobe
    pub async fn probe_duration(&self, video_path: &Path) -> Result<f64> {
        let output = tokio::process::Command::new(&self.video.ffprobe_path)
            .args(["-v", "quiet", "-print_format", "json", "-show_format"])
            .arg(video_path)
            .output()
            .await
            .map_err(|e| Error::Media(format!("cannot run ffprobe: {}", e)))?;

        if !output.status.success() {
            return Err(Error::Media(format!("ffprobe failed for {}", video_path.display())));
        }

        parse_probe_duration(&String::from_utf8_lossy(&output.stdout))
            .ok_or_else(|| Error::Media(format!("no duration reported for {}", video_path.display())))
    }

    /// Grab one frame every `interval_seconds` into `output_dir`.
    /// Returns the written files in timeline order.
    pub async fn extract_screenshots(
        &self,
        video_path: &Path,
        interval_seconds: u64,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>> {
        if interval_seconds == 0 {
            return Err(Error::InvalidInput("screenshot interval must be at least 1 second".to_string()));
        }

        let duration = self.probe_duration(video_path).await?;
        let times = sample_times(duration, interval_seconds);
        let width = pad_width(times.last().copied().unwrap_or(0), self.screenshots.min_pad_width);
        std::fs::create_dir_all(output_dir)?;

        info!(
            "🎞️ Extracting {} screenshots every {}s from {} ({:.1}s)",
            times.len(),
            interval_seconds,
            video_path.display(),
            duration
        );

        let mut written = Vec::with_capacity(times.len());
        for t in times {
            let target = output_dir.join(screenshot_file_name(&self.screenshots.file_prefix, t, width, "jpg"));
            self.grab_frame(video_path, t, &target).await?;
            debug!("Screenshot saved: {}", target.display());
            written.push(target);
        }

        info!("✅ Screenshots saved in directory: {}", output_dir.display());
        Ok(written)
    }

    async fn grab_frame(&self, video_path: &Path, seconds: u64, target: &Path) -> Result<()> {
        let output = tokio::process::Command::new(&self.video.ffmpeg_path)
            .args(["-v", "error", "-ss", &seconds.to_string(), "-i"])
            .arg(video_path)
            .args(["-frames:v", "1", "-q:v", &self.screenshots.jpeg_quality.to_string(), "-y"])
            .arg(target)
            .output()
            .await
            .map_err(|e| Error::Media(format!("cannot run ffmpeg: {}", e)))?;

        if !output.status.success() || !target.exists() {
            return Err(Error::Media(format!(
                "frame extraction at {}s failed: {}",
                seconds,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

/// 0, interval, 2*interval, ... strictly below `duration`
pub fn sample_times(duration_seconds: f64, interval_seconds: u64) -> Vec<u64> {
    if interval_seconds == 0 || !duration_seconds.is_finite() {
        return Vec::new();
    }
    (0..)
        .map(|i: u64| i * interval_seconds)
        .take_while(|t| (*t as f64) < duration_seconds)
        .collect()
}

fn parse_probe_duration(json: &str) -> Option<f64> {
    let data: serde_json::Value = serde_json::from_str(json).ok()?;
    data["format"]["duration"]
        .as_str()
        .and_then(|d| d.parse::<f64>().ok())
        .or_else(|| data["format"]["duration"].as_f64())
        .filter(|d| *d >= 0.0)
}
