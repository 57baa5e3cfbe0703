use crate::types::{Segment, TranscriptLine};

pub const LOADING: &str = "Loading...";
pub const NO_TRANSCRIPT: &str = "No transcript found for this video.";
pub const NO_SEGMENTS: &str = "No segments found.";
pub const NO_KEYWORDS_YET: &str = "(No keywords yet)";
pub const INVALID_INPUT: &str = "Could not extract a valid YouTube video ID from your input.";
pub const PLAYER_ERROR: &str = "YouTube player error.";
pub const GENERATING: &str = "Generating segment images...";
pub const GENERATION_GAVE_UP: &str = "Segment images are still not ready. Try again later.";

/// Format seconds as MM:SS timestamp
pub fn format_timestamp(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let mins = (seconds / 60.0) as u32;
    let secs = (seconds % 60.0) as u32;
    format!("{:02}:{:02}", mins, secs)
}

/// Format transcript lines with timestamps
pub fn format_transcript(lines: &[TranscriptLine]) -> String {
    lines
        .iter()
        .map(|line| format!("[{}] {}", format_timestamp(line.start), line.text.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Transcript text joined for keyword extraction
pub fn join_transcript_text(lines: &[TranscriptLine]) -> String {
    lines
        .iter()
        .map(|line| line.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn segment_label(segment: &Segment) -> String {
    format!("[{}] {}", format_timestamp(segment.start), segment.keyword)
}

pub fn format_keyword_list(segments: &[Segment]) -> String {
    if segments.is_empty() {
        return NO_SEGMENTS.to_string();
    }

    segments
        .iter()
        .map(segment_label)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_player_time(seconds: f64) -> String {
    format!("Current Time: {:.2}s", seconds)
}
