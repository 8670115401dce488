use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// SRT (SubRip Subtitle) cue as it appears in the file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleCue {
    /// Sequential number, 0 when the block had none
    pub index: u32,
    /// Start timestamp
    pub start: Duration,
    /// End timestamp
    pub end: Duration,
    /// Raw cue text, markup included
    pub text: String,
}

impl SubtitleCue {
    pub fn new(index: u32, start: Duration, end: Duration, text: impl Into<String>) -> Self {
        Self {
            index,
            start,
            end,
            text: text.into(),
        }
    }
}

/// Seconds since midnight: `h*3600 + m*60 + s + micros/1_000_000`
pub fn clock_seconds(duration: Duration) -> f64 {
    duration.as_secs() as f64 + duration.subsec_micros() as f64 / 1_000_000.0
}

/// Read and parse an SRT file. Invalid UTF-8 is replaced rather than rejected.
pub fn parse_srt_file(path: &Path) -> Result<Vec<SubtitleCue>> {
    let bytes = std::fs::read(path)?;
    let content = String::from_utf8_lossy(&bytes);
    parse_srt(&content)
}

/// Parse SRT content into cues, in file order
pub fn parse_srt(content: &str) -> Result<Vec<SubtitleCue>> {
    let content = content.trim_start_matches('\u{feff}');
    let mut cues = Vec::new();
    let mut lines = content.lines().map(|l| l.trim_end_matches('\r')).enumerate().peekable();

    loop {
        // Skip blank lines between blocks
        while matches!(lines.peek(), Some((_, line)) if line.trim().is_empty()) {
            lines.next();
        }

        let Some((line_no, first)) = lines.next() else {
            break;
        };

        let (index, timing_no, timing) = if first.contains("-->") {
            (0, line_no, first)
        } else {
            let index = first.trim().parse::<u32>().map_err(|_| Error::Parse {
                line: line_no + 1,
                message: format!("expected cue number, found '{}'", first.trim()),
            })?;
            let (timing_no, timing) = lines.next().ok_or_else(|| Error::Parse {
                line: line_no + 1,
                message: "cue number without timing line".to_string(),
            })?;
            (index, timing_no, timing)
        };

        let (start, end) = parse_timing_line(timing).map_err(|message| Error::Parse {
            line: timing_no + 1,
            message,
        })?;

        if end < start {
            return Err(Error::Parse {
                line: timing_no + 1,
                message: "cue ends before it starts".to_string(),
            });
        }

        let mut text_lines = Vec::new();
        while let Some((_, line)) = lines.peek() {
            if line.trim().is_empty() {
                break;
            }
            text_lines.push(*line);
            lines.next();
        }

        cues.push(SubtitleCue::new(index, start, end, text_lines.join("\n")));
    }

    Ok(cues)
}

/// Parse `HH:MM:SS,mmm --> HH:MM:SS,mmm`, ignoring trailing position hints
fn parse_timing_line(line: &str) -> std::result::Result<(Duration, Duration), String> {
    let (start, end) = line
        .split_once("-->")
        .ok_or_else(|| format!("expected timing line, found '{}'", line.trim()))?;

    let end = end.split_whitespace().next().unwrap_or("");
    Ok((parse_timestamp(start.trim())?, parse_timestamp(end)?))
}

/// Parse a single timestamp (HH:MM:SS,mmm). A dot is accepted in place of the comma.
pub fn parse_timestamp(timestamp: &str) -> std::result::Result<Duration, String> {
    let invalid = || format!("invalid timestamp '{}'", timestamp);

    let (clock, fraction) = timestamp
        .split_once([',', '.'])
        .unwrap_or((timestamp, "0"));

    let hms_parts: Vec<&str> = clock.split(':').collect();
    if hms_parts.len() != 3 {
        return Err(invalid());
    }

    let hours: u64 = hms_parts[0].trim().parse().map_err(|_| invalid())?;
    let minutes: u64 = hms_parts[1].parse().map_err(|_| invalid())?;
    let seconds: u64 = hms_parts[2].parse().map_err(|_| invalid())?;
    if minutes >= 60 || seconds >= 60 {
        return Err(invalid());
    }

    if fraction.is_empty() || fraction.len() > 3 || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    // ",5" means 500 ms
    let milliseconds: u64 = format!("{:0<3}", fraction).parse().map_err(|_| invalid())?;

    let total_millis = hours
        .checked_mul(3600)
        .and_then(|s| s.checked_add(minutes * 60 + seconds))
        .and_then(|s| s.checked_mul(1000))
        .and_then(|ms| ms.checked_add(milliseconds))
        .ok_or_else(invalid)?;
    Ok(Duration::from_millis(total_millis))
}
