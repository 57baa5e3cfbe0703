//! In-memory collaborators for unit tests.

use std::{
    collections::VecDeque,
    sync::Mutex,
    sync::atomic::{AtomicUsize, Ordering},
};

use crate::{
    backend::Backend,
    error::{Error, Result},
    player::VideoWidget,
    types::{RawSegment, StartValue, TranscriptLine},
    video_id::VideoId,
    view::{GalleryImage, SegmentPanel, View},
};

pub fn raw(start: &str, keyword: &str, image: Option<&str>) -> RawSegment {
    RawSegment {
        start: Some(StartValue::Clock(start.to_string())),
        keyword: Some(keyword.to_string()),
        image: image.map(str::to_string),
        text: None,
    }
}

pub fn line(start: f64, text: &str) -> TranscriptLine {
    TranscriptLine {
        start,
        text: text.to_string(),
        duration: 0.0,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetCommand {
    Load(String),
    Seek(f64),
    Play,
}

#[derive(Default)]
pub struct FakeWidget {
    commands: Mutex<Vec<WidgetCommand>>,
    time: Mutex<f64>,
}

impl FakeWidget {
    pub fn commands(&self) -> Vec<WidgetCommand> {
        self.commands.lock().unwrap().clone()
    }

    pub fn set_time(&self, seconds: f64) {
        *self.time.lock().unwrap() = seconds;
    }
}

impl VideoWidget for FakeWidget {
    fn load_video_by_id(&self, video_id: &VideoId) {
        self.commands
            .lock()
            .unwrap()
            .push(WidgetCommand::Load(video_id.to_string()));
    }

    fn seek_to(&self, seconds: f64) {
        self.commands.lock().unwrap().push(WidgetCommand::Seek(seconds));
    }

    fn play_video(&self) {
        self.commands.lock().unwrap().push(WidgetCommand::Play);
    }

    fn current_time(&self) -> f64 {
        *self.time.lock().unwrap()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewUpdate {
    InputError(String),
    Transcript(String),
    Keywords(String),
    Gallery(Vec<GalleryImage>),
    Panel(SegmentPanel),
    PlayerTime(String),
    PlayerStatus(String),
    Overlay(bool),
    PlayerVisible(bool),
}

#[derive(Default)]
pub struct RecordingView {
    updates: Mutex<Vec<ViewUpdate>>,
}

impl RecordingView {
    pub fn updates(&self) -> Vec<ViewUpdate> {
        self.updates.lock().unwrap().clone()
    }

    fn push(&self, update: ViewUpdate) {
        self.updates.lock().unwrap().push(update);
    }

    fn last<T>(&self, pick: impl Fn(&ViewUpdate) -> Option<T>) -> Option<T> {
        self.updates.lock().unwrap().iter().rev().find_map(pick)
    }

    pub fn last_transcript(&self) -> Option<String> {
        self.last(|u| match u {
            ViewUpdate::Transcript(text) => Some(text.clone()),
            _ => None,
        })
    }

    pub fn last_keywords(&self) -> Option<String> {
        self.last(|u| match u {
            ViewUpdate::Keywords(text) => Some(text.clone()),
            _ => None,
        })
    }

    pub fn last_panel(&self) -> Option<SegmentPanel> {
        self.last(|u| match u {
            ViewUpdate::Panel(panel) => Some(panel.clone()),
            _ => None,
        })
    }

    pub fn last_gallery(&self) -> Option<Vec<GalleryImage>> {
        self.last(|u| match u {
            ViewUpdate::Gallery(images) => Some(images.clone()),
            _ => None,
        })
    }

    pub fn last_player_status(&self) -> Option<String> {
        self.last(|u| match u {
            ViewUpdate::PlayerStatus(text) => Some(text.clone()),
            _ => None,
        })
    }

    pub fn overlay(&self) -> Option<bool> {
        self.last(|u| match u {
            ViewUpdate::Overlay(visible) => Some(*visible),
            _ => None,
        })
    }

    pub fn player_visible(&self) -> Option<bool> {
        self.last(|u| match u {
            ViewUpdate::PlayerVisible(visible) => Some(*visible),
            _ => None,
        })
    }

    pub fn player_time_updates(&self) -> usize {
        self.updates
            .lock()
            .unwrap()
            .iter()
            .filter(|u| matches!(u, ViewUpdate::PlayerTime(_)))
            .count()
    }
}

impl View for RecordingView {
    fn show_input_error(&self, message: &str) {
        self.push(ViewUpdate::InputError(message.to_string()));
    }

    fn show_transcript(&self, text: &str) {
        self.push(ViewUpdate::Transcript(text.to_string()));
    }

    fn show_keywords(&self, text: &str) {
        self.push(ViewUpdate::Keywords(text.to_string()));
    }

    fn show_gallery(&self, images: &[GalleryImage]) {
        self.push(ViewUpdate::Gallery(images.to_vec()));
    }

    fn show_current_segment(&self, panel: &SegmentPanel) {
        self.push(ViewUpdate::Panel(panel.clone()));
    }

    fn show_player_time(&self, text: &str) {
        self.push(ViewUpdate::PlayerTime(text.to_string()));
    }

    fn show_player_status(&self, text: &str) {
        self.push(ViewUpdate::PlayerStatus(text.to_string()));
    }

    fn set_generation_overlay(&self, visible: bool) {
        self.push(ViewUpdate::Overlay(visible));
    }

    fn set_player_visible(&self, visible: bool) {
        self.push(ViewUpdate::PlayerVisible(visible));
    }
}

/// Scripted backend. Segment responses are consumed in order; the last one
/// keeps being returned.
#[derive(Default)]
pub struct FakeBackend {
    transcript: Mutex<Vec<TranscriptLine>>,
    segments: Mutex<VecDeque<Option<Vec<RawSegment>>>>,
    keywords: Mutex<Vec<RawSegment>>,
    keyword_error: Mutex<Option<String>>,
    segment_error: Mutex<Option<String>>,
    segment_fetches: AtomicUsize,
    keyword_requests: AtomicUsize,
}

impl FakeBackend {
    pub fn with_transcript(self, lines: Vec<TranscriptLine>) -> Self {
        *self.transcript.lock().unwrap() = lines;
        self
    }

    pub fn with_segments(self, response: Option<Vec<RawSegment>>) -> Self {
        self.segments.lock().unwrap().push_back(response);
        self
    }

    pub fn with_keywords(self, keywords: Vec<RawSegment>) -> Self {
        *self.keywords.lock().unwrap() = keywords;
        self
    }

    pub fn with_keyword_error(self, message: &str) -> Self {
        *self.keyword_error.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn with_segment_error(self, message: &str) -> Self {
        *self.segment_error.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn segment_fetches(&self) -> usize {
        self.segment_fetches.load(Ordering::SeqCst)
    }

    pub fn keyword_requests(&self) -> usize {
        self.keyword_requests.load(Ordering::SeqCst)
    }
}

impl Backend for FakeBackend {
    async fn fetch_transcript(&self, _video_id: &VideoId) -> Result<Vec<TranscriptLine>> {
        Ok(self.transcript.lock().unwrap().clone())
    }

    async fn fetch_segments(&self, _video_id: &VideoId) -> Result<Option<Vec<RawSegment>>> {
        self.segment_fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.segment_error.lock().unwrap().clone() {
            return Err(Error::Backend { message });
        }
        let mut segments = self.segments.lock().unwrap();
        let response = if segments.len() > 1 {
            segments.pop_front().flatten()
        } else {
            segments.front().cloned().flatten()
        };
        Ok(response)
    }

    async fn request_keywords(&self, _video_id: &VideoId, _transcript: &str) -> Result<Vec<RawSegment>> {
        self.keyword_requests.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.keyword_error.lock().unwrap().clone() {
            return Err(Error::Backend { message });
        }
        Ok(self.keywords.lock().unwrap().clone())
    }

    fn image_url(&self, image: &str) -> String {
        format!("/images/{}", image)
    }
}
