use std::sync::Arc;

use log::debug;

use crate::types::{RawSegment, Segment};

/// Immutable, ordered snapshot of the segments of the loaded video.
///
/// Ordering by non-decreasing `start` is the producer's responsibility; the
/// index never re-sorts. Cloning shares the snapshot.
#[derive(Debug, Clone, Default)]
pub struct SegmentIndex {
    segments: Arc<[Segment]>,
}

impl SegmentIndex {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self {
            segments: segments.into(),
        }
    }

    /// Normalize backend records. Records with a missing or malformed
    /// `start` are dropped.
    pub fn from_raw(raw: Vec<RawSegment>) -> Self {
        let total = raw.len();
        let segments: Vec<Segment> = raw
            .into_iter()
            .filter_map(|record| {
                let start = record.start.clone();
                let normalized = record.normalize();
                if normalized.is_none() {
                    debug!("dropping segment with unusable start {:?}", start);
                }
                normalized
            })
            .collect();

        if segments.len() != total {
            debug!("kept {} of {} segments", segments.len(), total);
        }

        Self::new(segments)
    }

    /// The segment most recently started at or before `time`.
    ///
    /// Stops at the first segment starting after `time`. When several
    /// segments share a start, the last of them wins.
    pub fn active_at(&self, time: f64) -> Option<&Segment> {
        let mut last = None;
        for segment in self.segments.iter() {
            if !segment.start.is_finite() {
                continue;
            }
            if segment.start > time {
                break;
            }
            last = Some(segment);
        }
        last
    }

    /// Every segment has a generated image, and there is at least one.
    pub fn is_ready(&self) -> bool {
        !self.segments.is_empty() && self.segments.iter().all(Segment::has_image)
    }

    pub fn images(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|segment| segment.has_image())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    pub fn as_slice(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
