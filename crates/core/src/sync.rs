use std::sync::Arc;

use log::{debug, info};
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use crate::{
    backend::Backend,
    format::format_player_time,
    player::VideoWidget,
    session::SessionCore,
    timer::TimerSlot,
    view::View,
};

/// Keeps the side panel on the segment under the playhead while the video
/// plays.
pub(crate) struct PlaybackSync<B, W, V> {
    core: Arc<SessionCore<B, W, V>>,
    timer: TimerSlot,
}

impl<B: Backend, W: VideoWidget, V: View> PlaybackSync<B, W, V> {
    pub(crate) fn new(core: Arc<SessionCore<B, W, V>>) -> Self {
        Self {
            core,
            timer: TimerSlot::default(),
        }
    }

    /// Start polling the playhead. A running poll is replaced, never doubled.
    pub(crate) fn start(&self) {
        self.stop();
        if !self.core.player.is_ready() {
            debug!("player not ready, not polling");
            return;
        }

        let core = Arc::clone(&self.core);
        self.timer.restart(|cancel| {
            tokio::spawn(async move {
                let period = core.config.playback_interval;
                let mut ticker = interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

                loop {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        _ = ticker.tick() => tick(&core),
                    }
                }
            })
        });
        info!("playback polling started");
    }

    pub(crate) fn stop(&self) {
        if self.timer.stop() {
            info!("playback polling stopped");
        }
    }

    pub(crate) fn is_polling(&self) -> bool {
        self.timer.is_active()
    }
}

fn tick<B: Backend, W: VideoWidget, V: View>(core: &Arc<SessionCore<B, W, V>>) {
    let Some(time) = core.player.current_time() else {
        return;
    };

    core.view.show_player_time(&format_player_time(time));
    let waiting_for_image = core.render_at(time);
    if !waiting_for_image || !core.claim_refresh(Instant::now()) {
        return;
    }

    let Some(video_id) = core.video_id() else {
        return;
    };
    let generation = core.current_generation();
    let core = Arc::clone(core);
    tokio::spawn(async move {
        core.refresh_segments(generation, video_id).await;
    });
}
