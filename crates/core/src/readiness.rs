use std::sync::Arc;

use log::{debug, info, warn};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

use crate::{
    backend::Backend,
    format::GENERATION_GAVE_UP,
    player::VideoWidget,
    segment_index::SegmentIndex,
    session::SessionCore,
    timer::TimerSlot,
    video_id::VideoId,
    view::View,
};

/// Polls the backend until every segment has an image, then reveals the
/// player.
pub(crate) struct ReadinessPoller<B, W, V> {
    core: Arc<SessionCore<B, W, V>>,
    timer: TimerSlot,
}

impl<B: Backend, W: VideoWidget, V: View> ReadinessPoller<B, W, V> {
    pub(crate) fn new(core: Arc<SessionCore<B, W, V>>) -> Self {
        Self {
            core,
            timer: TimerSlot::default(),
        }
    }

    pub(crate) fn start(&self, generation: u64, video_id: VideoId) {
        let core = Arc::clone(&self.core);
        self.timer.restart(|cancel| {
            tokio::spawn(wait_for_images(core, generation, video_id, cancel))
        });
    }

    pub(crate) fn cancel(&self) {
        if self.timer.stop() {
            info!("readiness polling cancelled");
        }
    }

    pub(crate) fn is_waiting(&self) -> bool {
        self.timer.is_active()
    }
}

async fn wait_for_images<B: Backend, W: VideoWidget, V: View>(
    core: Arc<SessionCore<B, W, V>>,
    generation: u64,
    video_id: VideoId,
    cancel: CancellationToken,
) {
    let period = core.config.readiness_interval;
    let max_attempts = core.config.readiness_max_attempts;
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("waiting for segment images of {}", video_id);
    let mut attempts: u32 = 0;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            _ = ticker.tick() => {}
        }
        attempts += 1;

        match core.backend.fetch_segments(&video_id).await {
            Ok(Some(raw)) => {
                let segments = SegmentIndex::from_raw(raw);
                if segments.is_ready() {
                    if !cancel.is_cancelled() && core.reveal(generation, &video_id, segments) {
                        info!(
                            "segment images of {} ready after {} polls",
                            video_id, attempts
                        );
                    }
                    return;
                }
                debug!(
                    "{} of {} segment images ready for {}",
                    segments.images().count(),
                    segments.len(),
                    video_id
                );
            }
            Ok(None) => debug!("segments of {} not stored yet", video_id),
            Err(e) => warn!("readiness poll for {} failed: {}", video_id, e),
        }

        if cancel.is_cancelled() || !core.is_current(generation) {
            return;
        }

        if max_attempts != 0 && attempts >= max_attempts {
            warn!(
                "giving up on segment images of {} after {} polls",
                video_id, attempts
            );
            core.view.set_generation_overlay(false);
            core.view.show_player_status(GENERATION_GAVE_UP);
            return;
        }
    }
}
