use std::sync::Mutex;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

struct RunningTimer {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Holds at most one repeating task.
#[derive(Default)]
pub(crate) struct TimerSlot {
    running: Mutex<Option<RunningTimer>>,
}

impl TimerSlot {
    /// Stop whatever runs in the slot, then start a new task with a fresh
    /// cancellation token.
    pub(crate) fn restart(&self, spawn: impl FnOnce(CancellationToken) -> JoinHandle<()>) {
        let mut running = self.running.lock().expect("TimerSlot poisoned");
        if let Some(previous) = running.take() {
            previous.cancel.cancel();
        }

        let cancel = CancellationToken::new();
        let handle = spawn(cancel.clone());
        *running = Some(RunningTimer { cancel, handle });
    }

    /// Cancel the running task. Returns whether one was active.
    pub(crate) fn stop(&self) -> bool {
        let previous = self.running.lock().expect("TimerSlot poisoned").take();
        match previous {
            Some(timer) => {
                timer.cancel.cancel();
                !timer.handle.is_finished()
            }
            None => false,
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.running
            .lock()
            .expect("TimerSlot poisoned")
            .as_ref()
            .is_some_and(|timer| !timer.cancel.is_cancelled() && !timer.handle.is_finished())
    }
}
