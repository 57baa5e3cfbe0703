use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU64, Ordering},
};

use log::{debug, info, warn};
use tokio::time::Instant;
use uuid::Uuid;

use crate::{
    backend::Backend,
    config::Config,
    error::{Error, Result},
    format::{
        INVALID_INPUT, LOADING, NO_TRANSCRIPT, PLAYER_ERROR, format_keyword_list,
        format_transcript, join_transcript_text, segment_label,
    },
    player::{Player, PlayerEvent, PlayerState, VideoWidget},
    readiness::ReadinessPoller,
    segment_index::SegmentIndex,
    sync::PlaybackSync,
    video_id::{VideoId, extract_video_id},
    view::{GalleryImage, SegmentPanel, View},
};

/// How a submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Complete segments were cached; the player was loaded right away.
    Cached,
    /// Images are being generated; the readiness poller is waiting.
    Generating,
    NoTranscript,
    /// Keyword extraction found nothing, so no images will be generated.
    NoSegments,
    /// A newer submission started before this one finished.
    Superseded,
}

#[derive(Default)]
struct Loaded {
    video_id: Option<VideoId>,
    segments: SegmentIndex,
    last_refresh: Option<Instant>,
}

/// State shared between the session and its polling tasks.
pub(crate) struct SessionCore<B, W, V> {
    pub(crate) config: Config,
    pub(crate) backend: B,
    pub(crate) player: Player<W>,
    pub(crate) view: V,
    session_id: Uuid,
    generation: AtomicU64,
    loaded: Mutex<Loaded>,
}

impl<B: Backend, W: VideoWidget, V: View> SessionCore<B, W, V> {
    /// Start a new generation for `video_id`, dropping the old segments.
    pub(crate) fn begin(&self, video_id: &VideoId) -> u64 {
        let mut loaded = self.loaded.lock().expect("Loaded poisoned");
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *loaded = Loaded {
            video_id: Some(video_id.clone()),
            ..Loaded::default()
        };
        generation
    }

    pub(crate) fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.current_generation() == generation
    }

    pub(crate) fn video_id(&self) -> Option<VideoId> {
        self.loaded.lock().expect("Loaded poisoned").video_id.clone()
    }

    pub(crate) fn segments(&self) -> SegmentIndex {
        self.loaded.lock().expect("Loaded poisoned").segments.clone()
    }

    /// Replace the segments if `generation` is still current.
    pub(crate) fn install(&self, generation: u64, segments: SegmentIndex) -> bool {
        let mut loaded = self.loaded.lock().expect("Loaded poisoned");
        if !self.is_current(generation) {
            debug!(
                "discarding {} segments from stale generation {}",
                segments.len(),
                generation
            );
            return false;
        }
        loaded.segments = segments;
        true
    }

    /// Claim the refresh slot if the throttle allows it.
    pub(crate) fn claim_refresh(&self, now: Instant) -> bool {
        let mut loaded = self.loaded.lock().expect("Loaded poisoned");
        let due = loaded
            .last_refresh
            .is_none_or(|last| now.duration_since(last) >= self.config.refresh_throttle);
        if due {
            loaded.last_refresh = Some(now);
        }
        due
    }

    /// Render the side panel for `time`. Returns whether the active segment
    /// still waits for its image.
    pub(crate) fn render_at(&self, time: f64) -> bool {
        let segments = self.segments();
        match segments.active_at(time) {
            Some(segment) => {
                self.view.show_current_segment(&SegmentPanel::Active {
                    label: segment_label(segment),
                    image_url: segment
                        .image
                        .as_deref()
                        .map(|image| self.backend.image_url(image)),
                });
                !segment.has_image()
            }
            None => {
                self.view.show_current_segment(&SegmentPanel::Placeholder);
                false
            }
        }
    }

    pub(crate) fn render_segments(&self, segments: &SegmentIndex) {
        self.view
            .show_keywords(&format_keyword_list(segments.as_slice()));

        let gallery: Vec<GalleryImage> = segments
            .images()
            .filter_map(|segment| {
                let image = segment.image.as_deref()?;
                Some(GalleryImage {
                    url: self.backend.image_url(image),
                    alt: segment.keyword.clone(),
                    title: segment_label(segment),
                })
            })
            .collect();
        self.view.show_gallery(&gallery);
    }

    /// Install complete segments and reveal the player, unless a newer
    /// generation has begun. Holds the segment lock until the load is issued
    /// so `begin` cannot slip in between.
    pub(crate) fn reveal(
        &self,
        generation: u64,
        video_id: &VideoId,
        segments: SegmentIndex,
    ) -> bool {
        {
            let mut loaded = self.loaded.lock().expect("Loaded poisoned");
            if !self.is_current(generation) {
                debug!("not revealing {} for stale generation {}", video_id, generation);
                return false;
            }
            loaded.segments = segments.clone();

            self.render_segments(&segments);
            self.view.set_generation_overlay(false);
            self.view.set_player_visible(true);
            self.player.load(video_id);
        }

        self.render_at(0.0);
        true
    }

    /// Re-fetch the segments of the current video in the background.
    pub(crate) async fn refresh_segments(&self, generation: u64, video_id: VideoId) {
        match self.backend.fetch_segments(&video_id).await {
            Ok(Some(raw)) => {
                let segments = SegmentIndex::from_raw(raw);
                if self.install(generation, segments) {
                    debug!("refreshed segments for {}", video_id);
                }
            }
            Ok(None) => debug!("no segments yet for {}", video_id),
            Err(e) => warn!("segment refresh for {} failed: {}", video_id, e),
        }
    }
}

/// One viewer session: the loaded video, its segments and both pollers.
pub struct Session<B: Backend, W: VideoWidget, V: View> {
    pub(crate) core: Arc<SessionCore<B, W, V>>,
    sync: PlaybackSync<B, W, V>,
    readiness: ReadinessPoller<B, W, V>,
}

impl<B: Backend, W: VideoWidget, V: View> Session<B, W, V> {
    pub fn new(config: Config, backend: B, widget: W, view: V) -> Self {
        let core = Arc::new(SessionCore {
            config,
            backend,
            player: Player::new(widget),
            view,
            session_id: Uuid::new_v4(),
            generation: AtomicU64::new(0),
            loaded: Mutex::new(Loaded::default()),
        });
        info!("session {} created", core.session_id);

        Self {
            sync: PlaybackSync::new(Arc::clone(&core)),
            readiness: ReadinessPoller::new(Arc::clone(&core)),
            core,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.core.session_id
    }

    pub fn backend(&self) -> &B {
        &self.core.backend
    }

    pub fn widget(&self) -> &W {
        self.core.player.widget()
    }

    pub fn view(&self) -> &V {
        &self.core.view
    }

    pub fn video_id(&self) -> Option<VideoId> {
        self.core.video_id()
    }

    pub fn segments(&self) -> SegmentIndex {
        self.core.segments()
    }

    pub fn is_polling(&self) -> bool {
        self.sync.is_polling()
    }

    pub fn is_awaiting_readiness(&self) -> bool {
        self.readiness.is_waiting()
    }

    /// Load the video named by `input`: transcript, then cached or freshly
    /// generated segments.
    pub async fn submit(&self, input: &str, regenerate: bool) -> Result<SubmitOutcome> {
        let core = &self.core;

        let Some(video_id) = extract_video_id(input) else {
            core.view.show_input_error(INVALID_INPUT);
            core.view.show_transcript(&format!("Error: {}", INVALID_INPUT));
            return Err(Error::InvalidVideoId {
                input: input.to_string(),
            });
        };

        self.sync.stop();
        self.readiness.cancel();
        let generation = core.begin(&video_id);
        info!("submitting {} (generation {})", video_id, generation);

        core.view.show_transcript(LOADING);
        core.view.show_keywords("");
        core.view
            .show_current_segment(&SegmentPanel::Placeholder);

        let transcript = match core.backend.fetch_transcript(&video_id).await {
            Ok(lines) => lines,
            Err(e) => {
                warn!("transcript fetch for {} failed: {}", video_id, e);
                if core.is_current(generation) {
                    core.view.show_transcript(&format!("Error: {}", e));
                }
                return Err(e);
            }
        };
        if !core.is_current(generation) {
            return Ok(SubmitOutcome::Superseded);
        }

        if transcript.is_empty() {
            core.view.show_transcript(NO_TRANSCRIPT);
            return Ok(SubmitOutcome::NoTranscript);
        }
        core.view.show_transcript(&format_transcript(&transcript));

        if !regenerate {
            let cached = core.backend.fetch_segments(&video_id).await;
            if !core.is_current(generation) {
                return Ok(SubmitOutcome::Superseded);
            }

            let cached = match cached {
                Ok(cached) => cached,
                Err(e) => {
                    // Asking for keywords now would throw away whatever the
                    // backend has stored.
                    warn!("cached segment lookup for {} failed: {}", video_id, e);
                    core.view.show_keywords(&format!("Error: {}", e));
                    return Err(e);
                }
            };

            if let Some(raw) = cached {
                let segments = SegmentIndex::from_raw(raw);
                if segments.is_ready() {
                    if !core.reveal(generation, &video_id, segments) {
                        return Ok(SubmitOutcome::Superseded);
                    }
                    info!("{} loaded from cache", video_id);
                    return Ok(SubmitOutcome::Cached);
                }

                if !segments.is_empty() {
                    // Generation is already underway on the backend.
                    core.install(generation, segments.clone());
                    core.view
                        .show_keywords(&format_keyword_list(segments.as_slice()));
                    self.wait_for_images(generation, &video_id);
                    return Ok(SubmitOutcome::Generating);
                }
            }
        }

        core.view.show_keywords(LOADING);
        let keywords = core
            .backend
            .request_keywords(&video_id, &join_transcript_text(&transcript))
            .await;
        if !core.is_current(generation) {
            return Ok(SubmitOutcome::Superseded);
        }

        match keywords {
            Ok(raw) => {
                let keywords = SegmentIndex::from_raw(raw);
                core.view
                    .show_keywords(&format_keyword_list(keywords.as_slice()));
                if keywords.is_empty() {
                    info!("no keywords for {}, nothing to generate", video_id);
                    return Ok(SubmitOutcome::NoSegments);
                }
            }
            Err(e) => {
                warn!("keyword extraction for {} failed: {}", video_id, e);
                core.view.show_keywords(&format!("Error: {}", e));
                return Err(e);
            }
        }

        self.wait_for_images(generation, &video_id);
        Ok(SubmitOutcome::Generating)
    }

    fn wait_for_images(&self, generation: u64, video_id: &VideoId) {
        self.core.view.set_player_visible(false);
        self.core.view.set_generation_overlay(true);
        self.readiness.start(generation, video_id.clone());
    }

    /// React to a callback from the video widget.
    pub fn handle_player_event(&self, event: PlayerEvent) {
        match event {
            PlayerEvent::Ready => self.core.player.mark_ready(),
            PlayerEvent::Error { code } => {
                warn!("player error {}", code);
                self.core
                    .view
                    .show_player_status(&format!("{} (code {})", PLAYER_ERROR, code));
            }
            PlayerEvent::StateChange(PlayerState::Playing) => {
                debug!("video playing, start polling");
                self.sync.start();
            }
            PlayerEvent::StateChange(state) => {
                debug!("video {:?}, stop polling", state);
                self.sync.stop();
            }
        }
    }

    /// Render the side panel as if the playhead were at `time`.
    pub fn render_at(&self, time: f64) {
        self.core.render_at(time);
    }

    pub fn shutdown(&self) {
        self.sync.stop();
        self.readiness.cancel();
    }
}

impl<B: Backend, W: VideoWidget, V: View> Drop for Session<B, W, V> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
