//! Movie information encoded in release-style file names
//!
//! Expected layout is `name.year.qualityP.type[.subtype]`, for example
//! `Inception.2010.1080P.Bluray.x264.mkv`.
use crate::error::{Error, Result};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieInfo {
    /// Title with dots replaced by spaces
    pub name: String,
    /// Four digit release year
    pub year: String,
    /// Quality tag such as `1080P`
    pub quality: String,
    /// Release type such as `Bluray` or `WEBRip`
    pub kind: String,
    /// Everything after the type, if present
    pub subtype: Option<String>,
}

fn release_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        RegexBuilder::new(
            r"^(?P<name>.+?)\.(?P<year>\d{4})\.(?P<quality>\d{3,4}P)\.(?P<type>[A-Za-z0-9]+)(?:\.(?P<subtype>.+))?$",
        )
        .case_insensitive(true)
        .build()
        .expect("release pattern is valid")
    })
}

impl MovieInfo {
    /// Parse a bare file name (no directory). A trailing extension listed in
    /// `video_extensions` is removed first.
    pub fn parse(filename: &str, video_extensions: &[String]) -> Result<Self> {
        let stem = strip_video_extension(filename, video_extensions);
        debug!("Parsing release name: {}", stem);

        let captures = release_pattern().captures(stem).ok_or_else(|| {
            Error::InvalidInput(format!(
                "'{}' does not follow the name.year.qualityP.type[.subtype] convention",
                filename
            ))
        })?;

        let group = |name: &str| captures.name(name).map(|m| m.as_str().to_string());

        Ok(Self {
            name: group("name").unwrap_or_default().replace('.', " "),
            year: group("year").unwrap_or_default(),
            quality: group("quality").unwrap_or_default(),
            kind: group("type").unwrap_or_default(),
            subtype: group("subtype"),
        })
    }

    /// Parse the file name component of a path
    pub fn from_path(path: &Path, video_extensions: &[String]) -> Result<Self> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::InvalidInput(format!("no file name in {}", path.display())))?;
        Self::parse(filename, video_extensions)
    }

    /// Search slug used by the subtitle site
    pub fn search_slug(&self) -> String {
        self.name.replace(' ', "-")
    }
}

fn strip_video_extension<'a>(filename: &'a str, video_extensions: &[String]) -> &'a str {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if video_extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) => stem,
        _ => filename,
    }
}
