use std::sync::Mutex;

use log::{debug, info};

use crate::video_id::VideoId;

/// Commands understood by the embedded video player.
pub trait VideoWidget: Send + Sync + 'static {
    fn load_video_by_id(&self, video_id: &VideoId);
    fn seek_to(&self, seconds: f64);
    fn play_video(&self);
    /// Playhead position in seconds.
    fn current_time(&self) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
}

impl PlayerState {
    /// Map the widget's numeric state codes.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(PlayerState::Unstarted),
            0 => Some(PlayerState::Ended),
            1 => Some(PlayerState::Playing),
            2 => Some(PlayerState::Paused),
            3 => Some(PlayerState::Buffering),
            5 => Some(PlayerState::Cued),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    Ready,
    Error { code: i32 },
    StateChange(PlayerState),
}

#[derive(Default)]
struct PlayerSlot {
    ready: bool,
    pending: Option<VideoId>,
}

/// Wraps the widget with its ready flag and a single queued load.
///
/// Loads requested before the widget is ready are parked in the slot; a
/// newer request replaces an older one. The slot is flushed once, on ready.
pub struct Player<W> {
    widget: W,
    slot: Mutex<PlayerSlot>,
}

impl<W: VideoWidget> Player<W> {
    pub fn new(widget: W) -> Self {
        Self {
            widget,
            slot: Mutex::new(PlayerSlot::default()),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.slot.lock().expect("PlayerSlot poisoned").ready
    }

    pub fn load(&self, video_id: &VideoId) {
        {
            let mut slot = self.slot.lock().expect("PlayerSlot poisoned");
            if !slot.ready {
                debug!("player not ready, queueing {}", video_id);
                slot.pending = Some(video_id.clone());
                return;
            }
        }

        self.start(video_id);
    }

    /// Mark the widget ready and flush the queued load, if any.
    pub fn mark_ready(&self) {
        let pending = {
            let mut slot = self.slot.lock().expect("PlayerSlot poisoned");
            if slot.ready {
                return;
            }
            slot.ready = true;
            slot.pending.take()
        };

        info!("player ready");
        if let Some(video_id) = pending {
            self.start(&video_id);
        }
    }

    pub fn pending(&self) -> Option<VideoId> {
        self.slot.lock().expect("PlayerSlot poisoned").pending.clone()
    }

    /// Playhead position, `None` until the widget is ready.
    pub fn current_time(&self) -> Option<f64> {
        self.is_ready().then(|| self.widget.current_time())
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    fn start(&self, video_id: &VideoId) {
        self.widget.load_video_by_id(video_id);
        self.widget.seek_to(0.0);
        self.widget.play_video();
        info!("player loaded {}", video_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeWidget, WidgetCommand};

    fn id(s: &str) -> VideoId {
        VideoId::parse(s).unwrap()
    }

    #[test]
    fn load_before_ready_is_queued_and_flushed_once() {
        let player = Player::new(FakeWidget::default());

        player.load(&id("AAAAAAAAAAA"));
        player.load(&id("BBBBBBBBBBB"));
        assert!(player.widget().commands().is_empty());
        assert_eq!(player.pending(), Some(id("BBBBBBBBBBB")));

        player.mark_ready();
        player.mark_ready();

        assert_eq!(
            player.widget().commands(),
            vec![
                WidgetCommand::Load("BBBBBBBBBBB".into()),
                WidgetCommand::Seek(0.0),
                WidgetCommand::Play,
            ]
        );
        assert_eq!(player.pending(), None);
    }

    #[test]
    fn load_after_ready_starts_immediately() {
        let player = Player::new(FakeWidget::default());
        player.mark_ready();
        assert!(player.widget().commands().is_empty());

        player.load(&id("AAAAAAAAAAA"));
        assert_eq!(player.widget().commands().len(), 3);
    }

    #[test]
    fn current_time_requires_ready() {
        let player = Player::new(FakeWidget::default());
        player.widget().set_time(12.0);
        assert_eq!(player.current_time(), None);

        player.mark_ready();
        assert_eq!(player.current_time(), Some(12.0));
    }

    #[test]
    fn state_codes_map_to_states() {
        assert_eq!(PlayerState::from_code(1), Some(PlayerState::Playing));
        assert_eq!(PlayerState::from_code(-1), Some(PlayerState::Unstarted));
        assert_eq!(PlayerState::from_code(4), None);
    }
}
