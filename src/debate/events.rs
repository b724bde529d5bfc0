//! Progress events emitted while a debate runs.

use tokio::sync::mpsc::UnboundedSender;

use super::Opinion;

/// Informational progress of a running debate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebateEvent {
    /// Validation passed, the first round is about to start
    Started {
        question: String,
        rounds: u32,
        model: String,
    },

    /// A round began
    RoundStarted { round: u32, total: u32 },

    /// One persona answered
    OpinionReady { round: u32, opinion: Opinion },

    /// Every persona in the round answered
    RoundCompleted { round: u32 },

    /// Merlin was asked for the synthesis
    SynthesisStarted,

    /// Merlin answered
    SynthesisReady { text: String },
}

/// Optional event channel; a missing or closed receiver is ignored
#[derive(Debug, Clone, Default)]
pub struct EventSink(Option<UnboundedSender<DebateEvent>>);

impl EventSink {
    pub fn new(tx: UnboundedSender<DebateEvent>) -> Self {
        Self(Some(tx))
    }

    pub fn none() -> Self {
        Self(None)
    }

    pub fn emit(&self, event: DebateEvent) {
        if let Some(tx) = &self.0 {
            let _ = tx.send(event);
        }
    }
}

impl From<UnboundedSender<DebateEvent>> for EventSink {
    fn from(tx: UnboundedSender<DebateEvent>) -> Self {
        Self::new(tx)
    }
}

impl From<Option<UnboundedSender<DebateEvent>>> for EventSink {
    fn from(tx: Option<UnboundedSender<DebateEvent>>) -> Self {
        Self(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_closed_receiver_is_ignored() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        EventSink::new(tx).emit(DebateEvent::SynthesisStarted);
        EventSink::none().emit(DebateEvent::SynthesisStarted);
    }

    #[test]
    fn test_events_delivered_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = EventSink::new(tx);
        sink.emit(DebateEvent::RoundStarted { round: 1, total: 2 });
        sink.emit(DebateEvent::RoundCompleted { round: 1 });

        assert_eq!(rx.try_recv().unwrap(), DebateEvent::RoundStarted { round: 1, total: 2 });
        assert_eq!(rx.try_recv().unwrap(), DebateEvent::RoundCompleted { round: 1 });
    }
}
