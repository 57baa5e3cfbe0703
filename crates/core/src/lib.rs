//! Reelnotes Core Library
//!
//! Video id extraction, transcript and segment retrieval, and the two
//! pollers that keep a "current segment" panel in step with a video player.

pub mod backend;
pub mod config;
pub mod error;
pub mod format;
pub mod player;
pub mod segment_index;
pub mod session;
pub mod types;
pub mod video_id;
pub mod view;

mod readiness;
mod sync;
mod timer;

#[cfg(test)]
mod testing;

// Re-export commonly used items at crate root
pub use backend::{Backend, HttpBackend};
pub use config::Config;
pub use error::{Error, Result};
pub use format::{format_keyword_list, format_timestamp, format_transcript, segment_label};
pub use player::{PlayerEvent, PlayerState, VideoWidget};
pub use segment_index::SegmentIndex;
pub use session::{Session, SubmitOutcome};
pub use types::{RawSegment, Segment, StartValue, TranscriptLine};
pub use video_id::{VideoId, extract_video_id};
pub use view::{GalleryImage, SegmentPanel, View};
