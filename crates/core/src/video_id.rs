use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

const ID_LEN: usize = 11;

/// Known URL shapes, in the order they are tried.
static PATTERNS: LazyLock<[Regex; 5]> = LazyLock::new(|| {
    [
        r"v=([A-Za-z0-9_-]{11})",
        r"youtu\.be/([A-Za-z0-9_-]{11})",
        r"embed/([A-Za-z0-9_-]{11})",
        r"shorts/([A-Za-z0-9_-]{11})",
        r"^([A-Za-z0-9_-]{11})$",
    ]
    .map(|pattern| Regex::new(pattern).expect("video id pattern is valid"))
});

/// An 11 character YouTube video identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VideoId(String);

impl VideoId {
    /// Accept a bare identifier only.
    pub fn parse(token: &str) -> Option<Self> {
        let valid = token.len() == ID_LEN
            && token
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');

        valid.then(|| Self(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for VideoId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        VideoId::parse(&value).ok_or_else(|| format!("invalid video id: {value:?}"))
    }
}

impl From<VideoId> for String {
    fn from(id: VideoId) -> Self {
        id.0
    }
}

/// Extract a video id from a watch/short/embed/shorts URL or a bare id.
pub fn extract_video_id(input: &str) -> Option<VideoId> {
    let input = input.trim();

    PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(input)
            .and_then(|caps| caps.get(1))
            .and_then(|m| VideoId::parse(m.as_str()))
    })
}
