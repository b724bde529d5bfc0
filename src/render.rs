//! Terminal rendering of debate progress.

use std::fmt::Write as _;

use crate::debate::DebateEvent;
use crate::persona::PersonaRegistry;

const BOLD: &str = "\x1b[1m";
const GREEN: &str = "\x1b[1;32m";
const BLUE: &str = "\x1b[1;34m";
const MAGENTA: &str = "\x1b[1;35m";
const RESET: &str = "\x1b[0m";

/// Formats progress events for stdout
#[derive(Debug, Clone, Copy)]
pub struct TerminalView {
    color: bool,
    registry: PersonaRegistry,
}

impl TerminalView {
    pub fn new(color: bool, registry: PersonaRegistry) -> Self {
        Self { color, registry }
    }

    /// "Name - Expertise" for council members, the bare name otherwise
    fn speaker_label(&self, speaker: &str) -> String {
        match self.registry.get(speaker) {
            Some(persona) => format!("{} - {}", persona.name, persona.expertise),
            None => speaker.to_string(),
        }
    }

    fn paint(&self, style: &str, text: &str) -> String {
        if self.color {
            format!("{}{}{}", style, text, RESET)
        } else {
            text.to_string()
        }
    }

    /// Text to print for an event, if any
    pub fn format_event(&self, event: &DebateEvent) -> Option<String> {
        match event {
            DebateEvent::Started {
                question,
                rounds,
                model,
            } => Some(format!(
                "{}\nQuestion: {}\nModel: {} | Rounds: {}\n",
                self.paint(BOLD, "Council of Elders"),
                question,
                model,
                rounds
            )),
            DebateEvent::RoundStarted { round, total } => Some(format!(
                "\n{}",
                self.paint(GREEN, &format!("=== Round {} of {} ===", round, total))
            )),
            DebateEvent::OpinionReady { opinion, .. } => Some(format!(
                "\n{}\n{}",
                self.paint(BLUE, &self.speaker_label(&opinion.speaker)),
                opinion.text.trim_end()
            )),
            DebateEvent::RoundCompleted { .. } => None,
            DebateEvent::SynthesisStarted => Some(format!(
                "\n{}",
                self.paint(MAGENTA, "Merlin is weaving the council's wisdom...")
            )),
            DebateEvent::SynthesisReady { text } => Some(format!(
                "\n{}\n{}\n",
                self.paint(MAGENTA, "=== Merlin's Synthesis ==="),
                text.trim_end()
            )),
        }
    }

    /// Listing for `council personas`
    pub fn format_personas(&self) -> String {
        let mut out = format!(
            "{} ({} voice)\n",
            self.paint(BOLD, "Council of Elders"),
            self.registry.voice()
        );
        for (i, persona) in self.registry.list_personas().iter().enumerate() {
            let _ = write!(
                out,
                "\n{}. {} - {}\n   {}\n",
                i + 1,
                self.paint(BLUE, persona.name),
                persona.expertise,
                persona.instruction
            );
        }
        let merlin = self.registry.synthesizer();
        let _ = writeln!(
            out,
            "\n{} - {}",
            self.paint(MAGENTA, merlin.name),
            merlin.expertise
        );
        for line in merlin.instruction.lines() {
            let _ = writeln!(out, "   {}", line.trim_end());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debate::Opinion;
    use crate::persona::PersonaVoice;

    fn view(color: bool) -> TerminalView {
        TerminalView::new(color, PersonaRegistry::default())
    }

    #[test]
    fn test_plain_round_header() {
        let text = view(false)
            .format_event(&DebateEvent::RoundStarted { round: 2, total: 3 })
            .unwrap();
        assert_eq!(text, "\n=== Round 2 of 3 ===");
    }

    #[test]
    fn test_opinion_shows_speaker_and_text() {
        let event = DebateEvent::OpinionReady {
            round: 1,
            opinion: Opinion::new("Elder Cloud", "Decentralize.\n"),
        };
        assert_eq!(
            view(false).format_event(&event).unwrap(),
            "\nElder Cloud - Cloud & Infrastructure Architect\nDecentralize."
        );
    }

    #[test]
    fn test_unknown_speaker_keeps_bare_name() {
        let event = DebateEvent::OpinionReady {
            round: 1,
            opinion: Opinion::new("Visitor", "Hello."),
        };
        assert_eq!(view(false).format_event(&event).unwrap(), "\nVisitor\nHello.");
    }

    #[test]
    fn test_round_completed_is_silent() {
        assert!(view(true)
            .format_event(&DebateEvent::RoundCompleted { round: 1 })
            .is_none());
    }

    #[test]
    fn test_color_codes() {
        let colored = view(true)
            .format_event(&DebateEvent::SynthesisReady { text: "Done".into() })
            .unwrap();
        assert!(colored.contains("\x1b[1;35m"));

        let plain = view(false)
            .format_event(&DebateEvent::SynthesisReady { text: "Done".into() })
            .unwrap();
        assert!(!plain.contains('\x1b'));
        assert!(plain.ends_with("Done\n"));
    }

    #[test]
    fn test_persona_listing() {
        let listing = TerminalView::new(false, PersonaRegistry::new(PersonaVoice::Technical))
            .format_personas();
        assert!(listing.contains("technical voice"));
        assert!(listing.contains("1. Elder AI/ML - AI/Machine Learning Expert"));
        assert!(listing.contains("7. Elder Quantum"));
        assert!(listing.contains("Merlin - Synthesizer of Wisdom"));
        assert!(listing.contains("\n   Speak with wisdom and gravitas"));
    }
}
