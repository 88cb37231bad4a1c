//! Demo components registered with the core.
//!
//! `Logbook` turns lifecycle announcements into log lines; `Heartbeat`
//! counts local ticks and periodically posts an outbound status message,
//! exercising the components-only delivery path.

use tracing::{debug, info};

use stagehand_core::{Component, Outbox};
use stagehand_types::{MachineId, Message, MessageKind, MessagePayload};

/// Logs every actor-lifecycle and pause announcement it sees.
#[derive(Debug, Default)]
pub struct Logbook;

impl Component for Logbook {
    fn name(&self) -> &str {
        "logbook"
    }

    fn on_message(&mut self, message: &Message, _outbox: &mut Outbox) {
        match &message.kind {
            MessageKind::ActorCreated
            | MessageKind::ActorPublished
            | MessageKind::ActorDeleted => {
                if let Some(id) = message.about_actor {
                    info!(kind = %message.kind, actor = %id, "Lifecycle");
                }
            }
            MessageKind::Paused | MessageKind::Resumed | MessageKind::MapChanged => {
                info!(kind = %message.kind, "Lifecycle");
            }
            _ => {}
        }
    }
}

/// Posts an outbound heartbeat every N local ticks.
#[derive(Debug)]
pub struct Heartbeat {
    machine_id: MachineId,
    interval_frames: u64,
    frames: u64,
    beats: u64,
}

impl Heartbeat {
    /// Create a heartbeat that fires every `interval_frames` local ticks.
    /// An interval of zero is treated as one.
    pub const fn new(machine_id: MachineId, interval_frames: u64) -> Self {
        Self {
            machine_id,
            interval_frames: if interval_frames == 0 { 1 } else { interval_frames },
            frames: 0,
            beats: 0,
        }
    }

    /// Heartbeats posted so far.
    pub const fn beats(&self) -> u64 {
        self.beats
    }
}

impl Component for Heartbeat {
    fn name(&self) -> &str {
        "heartbeat"
    }

    fn on_message(&mut self, message: &Message, outbox: &mut Outbox) {
        if message.kind != MessageKind::TickLocal {
            return;
        }
        self.frames = self.frames.saturating_add(1);
        if self.frames.checked_rem(self.interval_frames) == Some(0) {
            self.beats = self.beats.saturating_add(1);
            let status = Message::new(MessageKind::custom("Heartbeat"), self.machine_id)
                .with_payload(MessagePayload::Custom(serde_json::json!({
                    "frames": self.frames,
                    "beats": self.beats,
                })));
            outbox.send_message(status);
            debug!(frames = self.frames, beats = self.beats, "Heartbeat posted");
        }
    }
}
