use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::state::StageName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Started,
    Succeeded,
    Failed,
}

/// Emitted when a stage starts and when it finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageEvent {
    pub run_id: Uuid,
    pub stage: StageName,
    pub status: StageStatus,
    pub error: Option<String>,
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: StageEvent);
}

pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: StageEvent) {}
}

/// Fans stage events out to any number of subscribers. Events sent while
/// nobody is subscribed are dropped.
#[derive(Clone)]
pub struct BroadcastProgress {
    sender: broadcast::Sender<StageEvent>,
}

impl BroadcastProgress {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StageEvent> {
        self.sender.subscribe()
    }
}

impl ProgressReporter for BroadcastProgress {
    fn report(&self, event: StageEvent) {
        let _ = self.sender.send(event);
    }
}
