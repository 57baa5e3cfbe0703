use serde::{Deserialize, Serialize};

/// One time-stamped annotation of the loaded video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Seconds from the start of the video.
    pub start: f64,
    pub keyword: String,
    /// Image file name, present once the backend has generated it.
    pub image: Option<String>,
    pub text: Option<String>,
}

impl Segment {
    pub fn has_image(&self) -> bool {
        self.image.as_deref().is_some_and(|image| !image.is_empty())
    }
}

/// `start` as the backend sends it: either seconds or a `MM:SS` clock string.
/// Any other JSON shape lands in `Other` so one bad record does not reject the
/// whole list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StartValue {
    Seconds(f64),
    Clock(String),
    Other(serde_json::Value),
}

impl StartValue {
    /// Seconds for this value, or `None` when it cannot be read as a valid
    /// non-negative offset.
    pub fn to_seconds(&self) -> Option<f64> {
        let seconds = match self {
            StartValue::Seconds(seconds) => *seconds,
            StartValue::Clock(clock) => parse_clock(clock)?,
            StartValue::Other(_) => return None,
        };

        (seconds.is_finite() && seconds >= 0.0).then_some(seconds)
    }
}

/// Parse `MM:SS`, `HH:MM:SS` or a plain number of seconds.
fn parse_clock(clock: &str) -> Option<f64> {
    let parts: Vec<&str> = clock.trim().split(':').collect();
    if parts.len() > 3 {
        return None;
    }

    parts.iter().try_fold(0.0, |acc, part| {
        let value: f64 = part.trim().parse().ok()?;
        (value.is_finite() && value >= 0.0).then_some(acc * 60.0 + value)
    })
}

/// Segment record as received from the backend, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSegment {
    #[serde(default)]
    pub start: Option<StartValue>,
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl RawSegment {
    /// Normalize into a [`Segment`], or `None` when `start` is missing or
    /// malformed.
    pub fn normalize(self) -> Option<Segment> {
        let start = self.start.as_ref()?.to_seconds()?;

        Some(Segment {
            start,
            keyword: self.keyword.unwrap_or_default(),
            image: self.image.filter(|image| !image.is_empty()),
            text: self.text,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptLine {
    pub start: f64,
    pub text: String,
    #[serde(default)]
    pub duration: f64,
}

/// The transcript endpoint answers either a bare array or `{"transcript": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TranscriptPayload {
    Lines(Vec<TranscriptLine>),
    Wrapped {
        #[serde(default)]
        transcript: Option<Vec<TranscriptLine>>,
    },
}

impl TranscriptPayload {
    pub fn into_lines(self) -> Vec<TranscriptLine> {
        match self {
            TranscriptPayload::Lines(lines) => lines,
            TranscriptPayload::Wrapped { transcript } => transcript.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct KeywordsPayload {
    #[serde(default)]
    pub segments: Option<Vec<RawSegment>>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordsRequest<'a> {
    pub video_id: &'a str,
    pub transcript: &'a str,
}
