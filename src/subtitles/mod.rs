//! Subtitle parsing, indexing and retrieval
pub mod index;
pub mod source;
pub mod srt;

pub use index::{clean_cue_text, IntervalKey, SubtitleIndex, SubtitleInterval};
pub use source::SubdlClient;
pub use srt::{parse_srt, parse_srt_file, SubtitleCue};
