//! Debate data model: opinions, rounds and the final transcript.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::persona::{Persona, PersonaVoice};

// ─────────────────────────────────────────────────────────────────
// Request
// ─────────────────────────────────────────────────────────────────

/// A question put to the council
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebateRequest {
    pub question: String,
    pub rounds: u32,
    pub model: String,
}

impl DebateRequest {
    pub fn new(question: impl Into<String>, rounds: u32, model: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            rounds,
            model: model.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Round Result
// ─────────────────────────────────────────────────────────────────

/// One persona's answer within a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opinion {
    pub speaker: String,
    pub text: String,
}

impl Opinion {
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
        }
    }
}

/// Every persona's answer for one round, in panel order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    number: u32,
    opinions: Vec<Opinion>,
}

impl RoundResult {
    /// Build a round, checking that `opinions` covers `panel` exactly and in order
    pub fn new(number: u32, panel: &[Persona], opinions: Vec<Opinion>) -> Result<Self> {
        if opinions.len() != panel.len() {
            return Err(Error::Internal(format!(
                "round {} has {} opinions for {} personas",
                number,
                opinions.len(),
                panel.len()
            )));
        }

        if let Some((persona, opinion)) = panel
            .iter()
            .zip(&opinions)
            .find(|(persona, opinion)| persona.name != opinion.speaker)
        {
            return Err(Error::Internal(format!(
                "round {}: expected {} but found {}",
                number, persona.name, opinion.speaker
            )));
        }

        Ok(Self { number, opinions })
    }

    /// 1-based round number
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Answer given by `speaker`, if they sat in this round
    pub fn get(&self, speaker: &str) -> Option<&str> {
        self.opinions
            .iter()
            .find(|o| o.speaker == speaker)
            .map(|o| o.text.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Opinion> {
        self.opinions.iter()
    }

    pub fn opinions(&self) -> &[Opinion] {
        &self.opinions
    }

    pub fn len(&self) -> usize {
        self.opinions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.opinions.is_empty()
    }
}

impl<'a> IntoIterator for &'a RoundResult {
    type Item = &'a Opinion;
    type IntoIter = std::slice::Iter<'a, Opinion>;

    fn into_iter(self) -> Self::IntoIter {
        self.opinions.iter()
    }
}

// ─────────────────────────────────────────────────────────────────
// Transcript
// ─────────────────────────────────────────────────────────────────

/// Complete record of a finished debate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub id: Uuid,
    pub question: String,
    pub model: String,
    pub voice: PersonaVoice,
    pub rounds: Vec<RoundResult>,
    pub synthesis: String,
    pub generated_at: DateTime<Utc>,
}

impl Transcript {
    pub fn new(
        question: impl Into<String>,
        model: impl Into<String>,
        voice: PersonaVoice,
        rounds: Vec<RoundResult>,
        synthesis: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            question: question.into(),
            model: model.into(),
            voice,
            rounds,
            synthesis: synthesis.into(),
            generated_at: Utc::now(),
        }
    }

    pub fn round(&self, number: u32) -> Option<&RoundResult> {
        self.rounds.iter().find(|r| r.number() == number)
    }
}
