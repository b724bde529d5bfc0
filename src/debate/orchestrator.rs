//! Drives a full debate: N rounds followed by Merlin's synthesis.

use std::fmt::Write as _;
use std::time::Instant;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::backend::{ChatRequest, SharedInvoker};
use crate::config::{MAX_ROUNDS, MIN_ROUNDS};
use crate::error::{Error, Result};
use crate::persona::PersonaRegistry;

use super::{
    aggregate, AggregatedContext, DebateEvent, DebateRequest, Dispatch, EventSink, RoundResult,
    RoundRunner, Transcript,
};

/// Where a debate currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebateStage {
    /// Not started
    #[default]
    Pending,
    /// Running the given round (1-based)
    Round(u32),
    /// Waiting for Merlin
    Synthesizing,
    /// Transcript produced
    Done,
    /// Aborted by an error
    Failed,
}

/// Owns one debate from validation to transcript
pub struct DebateOrchestrator {
    invoker: SharedInvoker,
    registry: PersonaRegistry,
    runner: RoundRunner,
    events: EventSink,
    stage: RwLock<DebateStage>,
}

impl DebateOrchestrator {
    pub fn new(invoker: SharedInvoker, registry: PersonaRegistry, dispatch: Dispatch) -> Self {
        Self {
            runner: RoundRunner::new(invoker.clone(), registry, dispatch),
            invoker,
            registry,
            events: EventSink::none(),
            stage: RwLock::new(DebateStage::Pending),
        }
    }

    /// Send progress events to `events`
    pub fn with_events(mut self, events: impl Into<EventSink>) -> Self {
        self.events = events.into();
        self
    }

    pub fn stage(&self) -> DebateStage {
        *self.stage.read()
    }

    fn set_stage(&self, stage: DebateStage) {
        debug!(?stage, "Debate stage");
        *self.stage.write() = stage;
    }

    /// Question and round checks; these need no model
    pub fn validate_question(question: &str, rounds: u32) -> Result<()> {
        if question.trim().is_empty() {
            return Err(Error::EmptyQuestion);
        }
        if !(MIN_ROUNDS..=MAX_ROUNDS).contains(&rounds) {
            return Err(Error::InvalidRoundCount {
                requested: rounds,
                min: MIN_ROUNDS,
                max: MAX_ROUNDS,
            });
        }
        Ok(())
    }

    /// Reject a request before any model is asked
    pub fn validate(request: &DebateRequest) -> Result<()> {
        Self::validate_question(&request.question, request.rounds)?;
        if request.model.trim().is_empty() {
            return Err(Error::ModelNotSelected);
        }
        Ok(())
    }

    /// Run the debate to completion
    pub async fn run(&self, request: DebateRequest) -> Result<Transcript> {
        let result = self.run_inner(request).await;
        self.set_stage(if result.is_ok() {
            DebateStage::Done
        } else {
            DebateStage::Failed
        });
        result
    }

    async fn run_inner(&self, request: DebateRequest) -> Result<Transcript> {
        Self::validate(&request)?;

        if request.model != self.invoker.model() {
            warn!(
                requested = %request.model,
                bound = %self.invoker.model(),
                "Debate model differs from the invoker's model"
            );
        }

        info!(
            rounds = request.rounds,
            model = %request.model,
            voice = %self.registry.voice(),
            dispatch = ?self.runner.dispatch(),
            "Council convened"
        );
        self.events.emit(DebateEvent::Started {
            question: request.question.clone(),
            rounds: request.rounds,
            model: request.model.clone(),
        });

        let start = Instant::now();
        let mut rounds: Vec<RoundResult> = Vec::with_capacity(request.rounds as usize);
        let mut context: Option<AggregatedContext> = None;

        for number in 1..=request.rounds {
            self.set_stage(DebateStage::Round(number));
            self.events.emit(DebateEvent::RoundStarted {
                round: number,
                total: request.rounds,
            });

            let round = self
                .runner
                .run_round(number, &request.question, context.as_ref(), &self.events)
                .await?;

            self.events.emit(DebateEvent::RoundCompleted { round: number });
            context = Some(aggregate(&round));
            rounds.push(round);
        }

        self.set_stage(DebateStage::Synthesizing);
        self.events.emit(DebateEvent::SynthesisStarted);

        let synthesizer = self.registry.synthesizer();
        let synthesis_request = ChatRequest::new(synthesis_prompt(&request.question, &rounds))
            .with_system(synthesizer.instruction);
        debug!(
            speaker = synthesizer.name,
            prompt_chars = synthesis_request.prompt_chars(),
            "Asking synthesizer"
        );

        let synthesis = self
            .invoker
            .invoke(synthesis_request)
            .await
            .map_err(|e| e.attributed_to(synthesizer.name, None))?;

        self.events.emit(DebateEvent::SynthesisReady {
            text: synthesis.clone(),
        });
        info!(elapsed_ms = start.elapsed().as_millis() as u64, "Debate complete");

        Ok(Transcript::new(
            request.question,
            request.model,
            self.registry.voice(),
            rounds,
            synthesis,
        ))
    }
}

/// The user message Merlin receives: the question plus every round in order
pub fn synthesis_prompt(question: &str, rounds: &[RoundResult]) -> String {
    let mut prompt = format!("Original question: {}\n\n=== COMPLETE COUNCIL DEBATE ===\n\n", question);
    for round in rounds {
        let _ = writeln!(prompt, "--- Round {} ---", round.number());
        for opinion in round {
            let _ = write!(prompt, "\n{}:\n{}\n", opinion.speaker, opinion.text);
        }
        prompt.push('\n');
    }
    prompt.push_str("\n\nNow, Merlin, synthesize the council's wisdom:");
    prompt
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::backend::{MockBackend, MockConfig};
    use crate::debate::Opinion;
    use crate::persona::PersonaVoice;

    const ELDERS: [&str; 7] = ["R1", "R2", "R3", "R4", "R5", "R6", "R7"];

    fn orchestrator(mock: &Arc<MockBackend>, dispatch: Dispatch) -> DebateOrchestrator {
        DebateOrchestrator::new(mock.clone(), PersonaRegistry::default(), dispatch)
    }

    fn request(rounds: u32) -> DebateRequest {
        DebateRequest::new("Should we use microservices?", rounds, "mock")
    }

    #[tokio::test]
    async fn test_single_round_end_to_end() {
        let mock = Arc::new(MockBackend::scripted(ELDERS.iter().copied().chain(["SYN"])));
        let transcript = orchestrator(&mock, Dispatch::Sequential)
            .run(request(1))
            .await
            .unwrap();

        assert_eq!(transcript.rounds.len(), 1);
        let texts: Vec<_> = transcript.rounds[0].iter().map(|o| o.text.as_str()).collect();
        assert_eq!(texts, ELDERS);
        assert_eq!(transcript.synthesis, "SYN");
        assert_eq!(mock.call_count(), 8);

        let merlin = mock.requests().pop().unwrap();
        assert_eq!(
            merlin.system,
            vec![PersonaRegistry::default().synthesizer().instruction.to_string()]
        );
        for text in ELDERS {
            assert!(merlin.user.contains(text));
        }
    }

    #[tokio::test]
    async fn test_call_count_is_seven_n_plus_one() {
        for rounds in [1, 2, 3] {
            let mock = Arc::new(MockBackend::new());
            let transcript = orchestrator(&mock, Dispatch::default())
                .run(request(rounds))
                .await
                .unwrap();
            assert_eq!(mock.call_count(), 7 * rounds as usize + 1);
            assert_eq!(transcript.rounds.len(), rounds as usize);
            for (i, round) in transcript.rounds.iter().enumerate() {
                assert_eq!(round.number(), i as u32 + 1);
                assert_eq!(round.len(), 7);
            }
        }
    }

    #[tokio::test]
    async fn test_empty_question_makes_no_calls() {
        let mock = Arc::new(MockBackend::new());
        let err = orchestrator(&mock, Dispatch::default())
            .run(DebateRequest::new("   \n", 2, "mock"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmptyQuestion));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_round_bounds() {
        for rounds in [0, 101] {
            let mock = Arc::new(MockBackend::new());
            let err = orchestrator(&mock, Dispatch::default())
                .run(request(rounds))
                .await
                .unwrap_err();
            assert!(matches!(err, Error::InvalidRoundCount { requested, .. } if requested == rounds));
            assert_eq!(mock.call_count(), 0);
        }
    }

    #[tokio::test]
    async fn test_empty_model_rejected() {
        let mock = Arc::new(MockBackend::new());
        let err = orchestrator(&mock, Dispatch::default())
            .run(DebateRequest::new("Q?", 1, ""))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ModelNotSelected));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failure_in_round_one_aborts() {
        let mock = Arc::new(MockBackend::with_config(MockConfig {
            fail_on_call: Some(4),
            ..MockConfig::default()
        }));
        let debate = orchestrator(&mock, Dispatch::Sequential);
        let err = debate.run(request(2)).await.unwrap_err();

        assert!(matches!(
            err,
            Error::ModelInvocationFailed { ref speaker, round: Some(1), .. } if speaker == "Elder Data"
        ));
        assert_eq!(mock.call_count(), 4);
        assert_eq!(debate.stage(), DebateStage::Failed);
    }

    #[tokio::test]
    async fn test_synthesis_failure_is_attributed_to_merlin() {
        let mock = Arc::new(MockBackend::with_config(MockConfig {
            fail_on_call: Some(8),
            ..MockConfig::default()
        }));
        let err = orchestrator(&mock, Dispatch::Sequential)
            .run(request(1))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::ModelInvocationFailed { ref speaker, round: None, .. } if speaker == "Merlin"
        ));
    }

    #[tokio::test]
    async fn test_context_comes_from_previous_round_only() {
        let responses: Vec<String> = (1..=3)
            .flat_map(|r| (1..=7).map(move |p| format!("round{}-elder{}", r, p)))
            .collect();
        let mock = Arc::new(MockBackend::scripted(responses));
        orchestrator(&mock, Dispatch::Sequential)
            .run(request(3))
            .await
            .unwrap();

        let requests = mock.requests();
        for request in &requests[..7] {
            assert_eq!(request.system.len(), 1);
        }
        for request in &requests[7..14] {
            assert!(request.system[1].contains("round1-elder7"));
        }
        for request in &requests[14..21] {
            assert!(request.system[1].contains("round2-elder1"));
            assert!(!request.system[1].contains("round1-"));
        }
    }

    #[tokio::test]
    async fn test_synthesis_sees_every_round() {
        let responses: Vec<String> = (1..=2)
            .flat_map(|r| (1..=7).map(move |p| format!("r{}p{}", r, p)))
            .collect();
        let mock = Arc::new(MockBackend::scripted(responses.clone()));
        orchestrator(&mock, Dispatch::default())
            .run(request(2))
            .await
            .unwrap();

        let merlin = mock.requests().pop().unwrap();
        for text in &responses {
            assert!(merlin.user.contains(text.as_str()));
        }
        assert!(merlin.user.find("--- Round 1 ---").unwrap() < merlin.user.find("--- Round 2 ---").unwrap());
    }

    #[tokio::test]
    async fn test_events_in_order() {
        let mock = Arc::new(MockBackend::new());
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        orchestrator(&mock, Dispatch::default())
            .with_events(tx)
            .run(request(1))
            .await
            .unwrap();

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert!(matches!(events[0], DebateEvent::Started { rounds: 1, .. }));
        assert!(matches!(events[1], DebateEvent::RoundStarted { round: 1, total: 1 }));
        assert_eq!(
            events.iter().filter(|e| matches!(e, DebateEvent::OpinionReady { .. })).count(),
            7
        );
        assert!(matches!(events[9], DebateEvent::RoundCompleted { round: 1 }));
        assert!(matches!(events[10], DebateEvent::SynthesisStarted));
        assert!(matches!(events[11], DebateEvent::SynthesisReady { .. }));
    }

    #[tokio::test]
    async fn test_transcript_metadata() {
        let mock = Arc::new(MockBackend::new());
        let debate = DebateOrchestrator::new(
            mock.clone(),
            PersonaRegistry::new(PersonaVoice::Technical),
            Dispatch::default(),
        );
        let transcript = debate.run(request(1)).await.unwrap();

        assert_eq!(transcript.model, "mock");
        assert_eq!(transcript.voice, PersonaVoice::Technical);
        assert_eq!(transcript.question, "Should we use microservices?");
        assert_eq!(debate.stage(), DebateStage::Done);
    }

    #[test]
    fn test_synthesis_prompt_format() {
        let panel = PersonaRegistry::default().list_personas();
        let opinions = panel.iter().map(|p| Opinion::new(p.name, "ok")).collect();
        let round = RoundResult::new(1, panel, opinions).unwrap();

        let prompt = synthesis_prompt("Why?", &[round]);
        assert!(prompt.starts_with(
            "Original question: Why?\n\n=== COMPLETE COUNCIL DEBATE ===\n\n--- Round 1 ---\n\nElder AI/ML:\nok\n"
        ));
        assert!(prompt.ends_with("Elder Quantum:\nok\n\n\n\nNow, Merlin, synthesize the council's wisdom:"));
    }

    #[test]
    fn test_validate_is_pure() {
        let req = request(2);
        assert!(DebateOrchestrator::validate(&req).is_ok());
        assert!(DebateOrchestrator::validate(&req).is_ok());
    }

    #[test]
    fn test_validate_question_needs_no_model() {
        assert!(DebateOrchestrator::validate_question("Why?", 1).is_ok());
        assert!(matches!(
            DebateOrchestrator::validate_question("  \n", 2),
            Err(Error::EmptyQuestion)
        ));
        assert!(matches!(
            DebateOrchestrator::validate_question("Why?", 0),
            Err(Error::InvalidRoundCount { requested: 0, .. })
        ));
        assert!(matches!(
            DebateOrchestrator::validate_question("Why?", 101),
            Err(Error::InvalidRoundCount { requested: 101, .. })
        ));
    }
}
