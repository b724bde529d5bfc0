//! Core types for the persona system.
//!
//! The council has seven fixed seats. Each seat is filled by one persona whose
//! wording depends on the selected [`PersonaVoice`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────
// Seat
// ─────────────────────────────────────────────────────────────────

/// The seven seats of the council, in speaking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Seat {
    AiMl,
    Security,
    Cloud,
    Data,
    DevOps,
    Software,
    Quantum,
}

impl Seat {
    /// All seats in speaking order.
    pub const fn all() -> &'static [Seat] {
        &[
            Seat::AiMl,
            Seat::Security,
            Seat::Cloud,
            Seat::Data,
            Seat::DevOps,
            Seat::Software,
            Seat::Quantum,
        ]
    }

    /// Display name of the persona occupying this seat.
    pub const fn name(self) -> &'static str {
        match self {
            Seat::AiMl => "Elder AI/ML",
            Seat::Security => "Elder Security",
            Seat::Cloud => "Elder Cloud",
            Seat::Data => "Elder Data",
            Seat::DevOps => "Elder DevOps",
            Seat::Software => "Elder Software",
            Seat::Quantum => "Elder Quantum",
        }
    }

    /// Human-readable expertise label.
    pub const fn expertise(self) -> &'static str {
        match self {
            Seat::AiMl => "AI/Machine Learning Expert",
            Seat::Security => "Cybersecurity Specialist",
            Seat::Cloud => "Cloud & Infrastructure Architect",
            Seat::Data => "Data Engineer",
            Seat::DevOps => "DevOps/SRE Engineer",
            Seat::Software => "Software Architecture Expert",
            Seat::Quantum => "Quantum Physics PhD",
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Voice
// ─────────────────────────────────────────────────────────────────

/// How the personas are framed in their instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PersonaVoice {
    /// Each elder argues from a distinct cultural and spiritual worldview.
    #[default]
    Worldview,
    /// Plain domain-expert framing.
    Technical,
}

impl PersonaVoice {
    pub fn slug(&self) -> &'static str {
        match self {
            PersonaVoice::Worldview => "worldview",
            PersonaVoice::Technical => "technical",
        }
    }
}

impl fmt::Display for PersonaVoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for PersonaVoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "worldview" | "diverse" => Ok(PersonaVoice::Worldview),
            "technical" | "standard" => Ok(PersonaVoice::Technical),
            other => Err(format!(
                "Unknown persona voice '{}'. Valid: worldview, technical",
                other
            )),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Persona
// ─────────────────────────────────────────────────────────────────

/// A single council member, or the synthesizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    /// Unique name; also the key in every round result.
    pub name: &'static str,
    /// Human-readable expertise label.
    pub expertise: &'static str,
    /// System-level directive sent before every question.
    pub instruction: &'static str,
}

impl Persona {
    pub(crate) const fn new(
        name: &'static str,
        expertise: &'static str,
        instruction: &'static str,
    ) -> Self {
        Self {
            name,
            expertise,
            instruction,
        }
    }

    /// Council member for `seat`; name and expertise come from the seat.
    pub(crate) const fn seated(seat: Seat, instruction: &'static str) -> Self {
        Self::new(seat.name(), seat.expertise(), instruction)
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
