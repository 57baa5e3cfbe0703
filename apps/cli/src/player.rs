use std::sync::Mutex;

use reelnotes_core::{PlayerEvent, PlayerState, VideoId, VideoWidget};
use tokio::{sync::mpsc, time::Instant};

#[derive(Default)]
struct Clock {
    loaded: Option<VideoId>,
    offset: f64,
    started_at: Option<Instant>,
}

impl Clock {
    fn position(&self, speed: f64) -> f64 {
        let elapsed = self
            .started_at
            .map(|started| started.elapsed().as_secs_f64() * speed)
            .unwrap_or(0.0);
        self.offset + elapsed
    }
}

/// Stand-in for an embedded player: a clock that runs while "playing" and
/// reports its callbacks over a channel.
pub struct ClockPlayer {
    events: mpsc::UnboundedSender<PlayerEvent>,
    speed: f64,
    clock: Mutex<Clock>,
}

impl ClockPlayer {
    pub fn new(events: mpsc::UnboundedSender<PlayerEvent>, speed: f64) -> Self {
        Self {
            events,
            speed,
            clock: Mutex::new(Clock::default()),
        }
    }

    pub fn announce_ready(&self) {
        self.emit(PlayerEvent::Ready);
    }

    pub fn is_loaded(&self) -> bool {
        self.clock.lock().expect("Clock poisoned").loaded.is_some()
    }

    pub fn is_playing(&self) -> bool {
        self.clock.lock().expect("Clock poisoned").started_at.is_some()
    }

    /// Playhead position in seconds.
    pub fn position(&self) -> f64 {
        self.clock.lock().expect("Clock poisoned").position(self.speed)
    }

    /// Stop the clock and report the video as ended.
    pub fn finish(&self) {
        {
            let mut clock = self.clock.lock().expect("Clock poisoned");
            clock.offset = clock.position(self.speed);
            clock.started_at = None;
        }
        self.emit(PlayerEvent::StateChange(PlayerState::Ended));
    }

    fn emit(&self, event: PlayerEvent) {
        // The receiver is gone only while the binary shuts down.
        let _ = self.events.send(event);
    }
}

impl VideoWidget for ClockPlayer {
    fn load_video_by_id(&self, video_id: &VideoId) {
        *self.clock.lock().expect("Clock poisoned") = Clock {
            loaded: Some(video_id.clone()),
            ..Clock::default()
        };
        self.emit(PlayerEvent::StateChange(PlayerState::Cued));
    }

    fn seek_to(&self, seconds: f64) {
        let mut clock = self.clock.lock().expect("Clock poisoned");
        clock.offset = seconds.max(0.0);
        if clock.started_at.is_some() {
            clock.started_at = Some(Instant::now());
        }
    }

    fn play_video(&self) {
        {
            let mut clock = self.clock.lock().expect("Clock poisoned");
            if clock.loaded.is_none() || clock.started_at.is_some() {
                return;
            }
            clock.started_at = Some(Instant::now());
        }
        self.emit(PlayerEvent::StateChange(PlayerState::Playing));
    }

    fn current_time(&self) -> f64 {
        self.position()
    }
}
