//! Persona system: the fixed seven-seat council and its synthesizer.
//!
//! Every debate round asks each seat in order; Merlin closes the debate.

pub mod registry;
pub mod types;

pub use registry::PersonaRegistry;
pub use types::{Persona, PersonaVoice};
