//! Runs a single debate round against every persona.

use std::time::Instant;

use futures_util::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info};

use crate::backend::{ChatRequest, SharedInvoker};
use crate::config::DispatchMode;
use crate::error::Result;
use crate::persona::{Persona, PersonaRegistry};

use super::{AggregatedContext, DebateEvent, EventSink, Opinion, RoundResult};

/// How the personas of a round are asked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// One persona at a time in panel order; the first failure stops the round
    Sequential,
    /// Up to `max_in_flight` personas at once; results still come back in panel order
    Concurrent { max_in_flight: usize },
}

impl Dispatch {
    pub fn from_settings(mode: DispatchMode, max_in_flight: usize) -> Self {
        match mode {
            DispatchMode::Sequential => Dispatch::Sequential,
            DispatchMode::Concurrent => Dispatch::Concurrent {
                max_in_flight: max_in_flight.max(1),
            },
        }
    }
}

impl Default for Dispatch {
    fn default() -> Self {
        Dispatch::Concurrent { max_in_flight: 7 }
    }
}

/// Asks every council member the question for one round
#[derive(Clone)]
pub struct RoundRunner {
    invoker: SharedInvoker,
    registry: PersonaRegistry,
    dispatch: Dispatch,
}

impl RoundRunner {
    pub fn new(invoker: SharedInvoker, registry: PersonaRegistry, dispatch: Dispatch) -> Self {
        Self {
            invoker,
            registry,
            dispatch,
        }
    }

    pub fn dispatch(&self) -> Dispatch {
        self.dispatch
    }

    /// Build the request a persona receives
    pub fn request_for(
        persona: &Persona,
        question: &str,
        context: Option<&AggregatedContext>,
    ) -> ChatRequest {
        let mut request = ChatRequest::new(question).with_system(persona.instruction);
        if let Some(context) = context.filter(|c| !c.is_empty()) {
            request = request.with_system(format!(
                "Previous discussion context:\n{}",
                context.as_str()
            ));
        }
        request
    }

    /// Run round `number`
    pub async fn run_round(
        &self,
        number: u32,
        question: &str,
        context: Option<&AggregatedContext>,
        events: &EventSink,
    ) -> Result<RoundResult> {
        let panel = self.registry.list_personas();
        let start = Instant::now();

        let opinions = match self.dispatch {
            Dispatch::Sequential => {
                let mut opinions = Vec::with_capacity(panel.len());
                for persona in panel {
                    let opinion = self.ask(number, persona, question, context).await?;
                    emit_opinion(events, number, &opinion);
                    opinions.push(opinion);
                }
                opinions
            }
            Dispatch::Concurrent { max_in_flight } => {
                stream::iter(panel.iter().map(|p| self.ask(number, p, question, context)))
                    .buffered(max_in_flight)
                    .inspect_ok(|opinion| emit_opinion(events, number, opinion))
                    .try_collect::<Vec<_>>()
                    .await?
            }
        };

        info!(
            round = number,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Round complete"
        );

        RoundResult::new(number, panel, opinions)
    }

    async fn ask(
        &self,
        number: u32,
        persona: &Persona,
        question: &str,
        context: Option<&AggregatedContext>,
    ) -> Result<Opinion> {
        let request = Self::request_for(persona, question, context);
        debug!(
            round = number,
            speaker = persona.name,
            prompt_chars = request.prompt_chars(),
            "Asking persona"
        );

        let start = Instant::now();
        let text = self
            .invoker
            .invoke(request)
            .await
            .map_err(|e| e.attributed_to(persona.name, Some(number)))?;

        debug!(
            round = number,
            speaker = persona.name,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Persona answered"
        );

        Ok(Opinion::new(persona.name, text))
    }
}

fn emit_opinion(events: &EventSink, round: u32, opinion: &Opinion) {
    events.emit(DebateEvent::OpinionReady {
        round,
        opinion: opinion.clone(),
    });
}
