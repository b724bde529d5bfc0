//! Debate engine
//!
//! Rounds run strictly one after another. Within a round every persona is
//! asked the same question, and the round's answers become the context for
//! the next round only. Merlin reads every round at the end.

mod context;
mod events;
mod orchestrator;
mod round;
mod transcript;

pub use context::{aggregate, AggregatedContext};
pub use events::{DebateEvent, EventSink};
pub use orchestrator::DebateOrchestrator;
pub use round::{Dispatch, RoundRunner};
pub use transcript::{DebateRequest, Opinion, RoundResult, Transcript};
