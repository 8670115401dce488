//! End-to-end storyboard run from a video file to the finished PDF
use crate::cast::{build_pages, CastTable, HttpThumbnailFetcher, ImdbScraper, ThumbnailFetcher};
use crate::config::Config;
use crate::document::{assemble, render_document, Document, PdfRenderer, RenderStats, Renderer};
use crate::error::{Error, Result};
use crate::filename::MovieInfo;
use crate::subtitles::{SubdlClient, SubtitleIndex};
use crate::timeline::FrameTimeline;
use crate::video::VideoProcessor;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// One run of the pipeline
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub video_path: PathBuf,
    /// Seconds between screenshots, at least 1
    pub interval_seconds: u64,
    /// Local subtitle file; skips the download when set
    pub subtitle_path: Option<PathBuf>,
}

impl PipelineRequest {
    pub fn new(video_path: impl Into<PathBuf>, interval_seconds: u64) -> Self {
        Self {
            video_path: video_path.into(),
            interval_seconds,
            subtitle_path: None,
        }
    }

    pub fn with_subtitle(mut self, path: impl Into<PathBuf>) -> Self {
        self.subtitle_path = Some(path.into());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub movie: MovieInfo,
    pub screenshot_dir: PathBuf,
    pub subtitle_path: PathBuf,
    pub side_file: PathBuf,
    pub output: PathBuf,
    pub frames: usize,
    pub cast_entries: usize,
    pub pages: usize,
    pub thumbnails_embedded: usize,
    pub thumbnails_skipped: usize,
    pub elapsed: Duration,
    pub finished_at: DateTime<Utc>,
}

/// Screenshots, subtitles and cast combined into one PDF.
/// Stages run strictly one after another; any fatal failure aborts the run
/// before the output file is written.
pub struct Pipeline {
    config: Config,
    video: VideoProcessor,
    subtitles: SubdlClient,
    imdb: ImdbScraper,
    thumbnails: HttpThumbnailFetcher,
}

impl Pipeline {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        info!("🔧 Initializing pipeline");

        Ok(Self {
            video: VideoProcessor::new(config.video.clone(), config.screenshots.clone()),
            subtitles: SubdlClient::new(config.subtitles.clone(), &config.http)?,
            imdb: ImdbScraper::new(config.metadata.clone(), &config.http)?,
            thumbnails: HttpThumbnailFetcher::new(&config.http)?,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn run(&self, request: &PipelineRequest) -> Result<PipelineOutcome> {
        let started = Instant::now();
        match self.run_stages(request, started).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!("❌ Pipeline failed for {}: {}", request.video_path.display(), e);
                Err(e)
            }
        }
    }

    async fn run_stages(&self, request: &PipelineRequest, started: Instant) -> Result<PipelineOutcome> {
        self.validate_request(request)?;
        let movie = MovieInfo::from_path(&request.video_path, &self.config.video.supported_extensions)?;
        info!("🚀 Processing {} ({}) {} {}", movie.name, movie.year, movie.quality, movie.kind);

        let movie_dir = movie_dir(&request.video_path);
        let screenshot_dir = movie_dir.join(&self.config.screenshots.dir_name);

        self.prepare_screenshots(request, &screenshot_dir).await?;

        let subtitle_path = match &request.subtitle_path {
            Some(path) => path.clone(),
            None => self
                .subtitles
                .fetch_subtitle(&movie, &movie_dir)
                .await
                .map_err(|e| {
                    warn!("Subtitle lookup failed: {}", e);
                    e.into_not_found()
                })?,
        };

        let side_file = movie_dir.join(&self.config.metadata.side_file_name);
        let cast = self.load_cast(&movie, &side_file).await?;

        let tolerance = self.config.document.tolerance_for(request.interval_seconds);
        let document = build_document(&self.config, &movie.name, &screenshot_dir, &subtitle_path, &cast, tolerance)?;

        let output = screenshot_dir.join(&self.config.document.output_name);
        let mut renderer = PdfRenderer::new(&document.title)?;
        let stats = self.render(&document, &mut renderer, &self.thumbnails, &output).await?;

        let outcome = PipelineOutcome {
            frames: document.aligned_frames().count(),
            cast_entries: cast.len(),
            pages: document.pages.len(),
            thumbnails_embedded: stats.thumbnails_embedded,
            thumbnails_skipped: stats.thumbnails_skipped,
            movie,
            screenshot_dir,
            subtitle_path,
            side_file,
            output,
            elapsed: started.elapsed(),
            finished_at: Utc::now(),
        };
        info!("🎉 PDF created at {} in {:.1}s", outcome.output.display(), outcome.elapsed.as_secs_f64());
        Ok(outcome)
    }

    fn validate_request(&self, request: &PipelineRequest) -> Result<()> {
        if request.interval_seconds == 0 {
            return Err(Error::InvalidInput("interval must be a positive number of seconds".to_string()));
        }
        if !request.video_path.is_file() {
            return Err(Error::InvalidInput(format!(
                "video file not found: {}",
                request.video_path.display()
            )));
        }
        if !self.video.is_supported(&request.video_path) {
            warn!("Unrecognized video extension: {}", request.video_path.display());
        }
        Ok(())
    }

    async fn prepare_screenshots(&self, request: &PipelineRequest, screenshot_dir: &Path) -> Result<()> {
        if self.config.screenshots.reuse_existing {
            let timeline = FrameTimeline::new(self.config.screenshots.image_extensions.clone());
            if screenshot_dir.is_dir() && !timeline.list(screenshot_dir)?.is_empty() {
                info!("📁 Reusing screenshots in {}", screenshot_dir.display());
                return Ok(());
            }
        }

        self.video
            .extract_screenshots(&request.video_path, request.interval_seconds, screenshot_dir)
            .await?;
        Ok(())
    }

    /// Side-file when allowed and present, IMDb otherwise
    async fn load_cast(&self, movie: &MovieInfo, side_file: &Path) -> Result<CastTable> {
        if self.config.metadata.reuse_side_file && side_file.is_file() {
            match CastTable::load(side_file) {
                Ok(table) if !table.is_empty() => return Ok(table),
                Ok(_) => warn!("Cast file {} is empty, scraping again", side_file.display()),
                Err(e) => warn!("{}, scraping again", e),
            }
        }

        let table = self.imdb.fetch_cast(&movie.name).await.map_err(|e| {
            warn!("Cast lookup failed: {}", e);
            e.into_not_found()
        })?;
        table.save(side_file)?;
        Ok(table)
    }

    async fn render(
        &self,
        document: &Document,
        renderer: &mut dyn Renderer,
        fetcher: &dyn ThumbnailFetcher,
        output: &Path,
    ) -> Result<RenderStats> {
        let size = (
            self.config.document.thumbnail_width,
            self.config.document.thumbnail_height,
        );
        render_document(document, renderer, fetcher, size, output).await
    }
}

/// Offline half of the pipeline: index the subtitle, list the screenshots,
/// paginate the cast and assemble the document.
pub fn build_document(
    config: &Config,
    title: &str,
    screenshot_dir: &Path,
    subtitle_path: &Path,
    cast: &CastTable,
    tolerance: f64,
) -> Result<Document> {
    let index = SubtitleIndex::from_srt_file(subtitle_path)?;
    info!("📝 Indexed {} subtitle intervals", index.len());

    let frames = FrameTimeline::new(config.screenshots.image_extensions.clone()).list(screenshot_dir)?;
    info!("🖼️ Found {} screenshots", frames.len());

    let gallery = build_pages(cast.entries(), config.document.cast_per_page)?;
    let document = assemble(title, gallery, &frames, &index, tolerance);
    info!("📚 Document has {} pages (tolerance {:.2}s)", document.pages.len(), tolerance);
    Ok(document)
}

fn movie_dir(video_path: &Path) -> PathBuf {
    match video_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
