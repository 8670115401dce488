use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the storyboard builder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Input video settings
    pub video: VideoConfig,

    /// Screenshot extraction and naming
    pub screenshots: ScreenshotConfig,

    /// Subtitle source settings
    pub subtitles: SubtitleConfig,

    /// Cast/crew metadata settings
    pub metadata: MetadataConfig,

    /// Document layout settings
    pub document: DocumentConfig,

    /// Shared HTTP client settings
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Video extensions stripped before filename parsing
    pub supported_extensions: Vec<String>,

    /// ffmpeg executable
    pub ffmpeg_path: PathBuf,

    /// ffprobe executable
    pub ffprobe_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenshotConfig {
    /// Subdirectory (next to the video) that receives the screenshots
    pub dir_name: String,

    /// Screenshot file name prefix, followed by `-<seconds>.jpg`
    pub file_prefix: String,

    /// Extensions recognized when listing the timeline
    pub image_extensions: Vec<String>,

    /// Minimum zero-padding width of the seconds field
    pub min_pad_width: usize,

    /// ffmpeg `-q:v` value (2 = high quality)
    pub jpeg_quality: u32,

    /// Reuse screenshots already on disk instead of extracting again
    pub reuse_existing: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleConfig {
    /// Subtitle site base URL
    pub base_url: String,

    /// Prefix of direct download links
    pub download_prefix: String,

    /// Language page suffix
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Film database base URL
    pub base_url: String,

    /// JSON side-file written next to the video
    pub side_file_name: String,

    /// Load the side-file instead of scraping when it already exists
    pub reuse_side_file: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    /// Output file name, written into the screenshot directory
    pub output_name: String,

    /// Cast entries per gallery page
    pub cast_per_page: usize,

    /// Thumbnail width in pixels
    pub thumbnail_width: u32,

    /// Thumbnail height in pixels
    pub thumbnail_height: u32,

    /// Fixed alignment tolerance in seconds; half the interval when unset
    pub tolerance: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Browser user agent sent to the scraped sites
    pub user_agent: String,
}

impl DocumentConfig {
    /// Tolerance window for a given sampling interval
    pub fn tolerance_for(&self, interval_seconds: u64) -> f64 {
        self.tolerance
            .unwrap_or(interval_seconds as f64 / 2.0)
    }
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        for path in Self::config_paths() {
            if let Ok(config_str) = std::fs::read_to_string(&path) {
                match toml::from_str(&config_str) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path.display());
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
                    }
                }
            }
        }

        // Try environment variables
        Self::from_env()
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)?;
        let config = toml::from_str(&config_str)?;
        tracing::info!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("subshot.toml"),
            PathBuf::from("config/subshot.toml"),
        ];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("subshot").join("config.toml"));
        }
        paths
    }

    /// Defaults overridden by environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(timeout) = std::env::var("SUBSHOT_HTTP_TIMEOUT") {
            config.http.timeout_seconds = timeout
                .parse()
                .map_err(|_| Error::Config(format!("SUBSHOT_HTTP_TIMEOUT is not a number: {}", timeout)))?;
        }

        if let Ok(tolerance) = std::env::var("SUBSHOT_TOLERANCE") {
            let value: f64 = tolerance
                .parse()
                .map_err(|_| Error::Config(format!("SUBSHOT_TOLERANCE is not a number: {}", tolerance)))?;
            config.document.tolerance = Some(value);
        }

        if let Ok(ffmpeg) = std::env::var("SUBSHOT_FFMPEG") {
            config.video.ffmpeg_path = PathBuf::from(ffmpeg);
        }

        if let Ok(ffprobe) = std::env::var("SUBSHOT_FFPROBE") {
            config.video.ffprobe_path = PathBuf::from(ffprobe);
        }

        if let Ok(user_agent) = std::env::var("SUBSHOT_USER_AGENT") {
            config.http.user_agent = user_agent;
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(e.to_string()))?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.document.cast_per_page == 0 {
            return Err(Error::Config("cast_per_page must be greater than 0".to_string()));
        }

        if self.document.thumbnail_width == 0 || self.document.thumbnail_height == 0 {
            return Err(Error::Config("thumbnail dimensions must be non-zero".to_string()));
        }

        if let Some(tolerance) = self.document.tolerance {
            if !tolerance.is_finite() || tolerance < 0.0 {
                return Err(Error::Config(format!("tolerance must be a non-negative number, got {}", tolerance)));
            }
        }

        if self.screenshots.image_extensions.is_empty() {
            return Err(Error::Config("at least one screenshot image extension is required".to_string()));
        }

        if self.screenshots.file_prefix.contains('-') {
            return Err(Error::Config("screenshot prefix must not contain '-'".to_string()));
        }

        if self.document.output_name.trim().is_empty() {
            return Err(Error::Config("output_name must not be empty".to_string()));
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Storyboard Configuration:\n\
            - Screenshot Directory: {}\n\
            - Image Extensions: {}\n\
            - Subtitle Source: {}\n\
            - Metadata Source: {}\n\
            - Cast Per Page: {}\n\
            - Tolerance: {}\n\
            - Output: {}",
            self.screenshots.dir_name,
            self.screenshots.image_extensions.join(", "),
            self.subtitles.base_url,
            self.metadata.base_url,
            self.document.cast_per_page,
            self.document
                .tolerance
                .map(|t| format!("{:.1}s", t))
                .unwrap_or_else(|| "interval / 2".to_string()),
            self.document.output_name,
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            video: VideoConfig {
                supported_extensions: vec![
                    "mp4".to_string(),
                    "mkv".to_string(),
                    "avi".to_string(),
                    "mov".to_string(),
                    "webm".to_string(),
                    "m4v".to_string(),
                ],
                ffmpeg_path: PathBuf::from("ffmpeg"),
                ffprobe_path: PathBuf::from("ffprobe"),
            },
            screenshots: ScreenshotConfig {
                dir_name: "Screenshots".to_string(),
                file_prefix: "screenshot".to_string(),
                image_extensions: vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()],
                min_pad_width: 3,
                jpeg_quality: 2,
                reuse_existing: false,
            },
            subtitles: SubtitleConfig {
                base_url: "https://subdl.com".to_string(),
                download_prefix: "https://dl.subdl.com/subtitle/".to_string(),
                language: "english".to_string(),
            },
            metadata: MetadataConfig {
                base_url: "https://www.imdb.com".to_string(),
                side_file_name: "full_cast_crew.json".to_string(),
                reuse_side_file: true,
            },
            document: DocumentConfig {
                output_name: "Final.pdf".to_string(),
                cast_per_page: 16,
                thumbnail_width: 350,
                thumbnail_height: 400,
                tolerance: None,
            },
            http: HttpConfig {
                timeout_seconds: 30,
                user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/81.0.4044.138 Safari/537.36".to_string(),
            },
        }
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.config.document.tolerance = Some(tolerance);
        self
    }

    pub fn with_cast_per_page(mut self, per_page: usize) -> Self {
        self.config.document.cast_per_page = per_page;
        self
    }

    pub fn with_thumbnail_size(mut self, width: u32, height: u32) -> Self {
        self.config.document.thumbnail_width = width;
        self.config.document.thumbnail_height = height;
        self
    }

    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.config.document.output_name = name.into();
        self
    }

    pub fn reuse_screenshots(mut self, reuse: bool) -> Self {
        self.config.screenshots.reuse_existing = reuse;
        self
    }

    pub fn reuse_side_file(mut self, reuse: bool) -> Self {
        self.config.metadata.reuse_side_file = reuse;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
